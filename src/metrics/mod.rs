//! Metrics collection for observability

use prometheus::{
    register_counter_vec_with_registry, register_counter_with_registry,
    register_histogram_with_registry, Counter, CounterVec, Encoder, Histogram, HistogramOpts,
    Opts, Registry, TextEncoder,
};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

pub struct Metrics {
    registry: Registry,

    // Pipeline
    pub analyses: CounterVec,
    pub analysis_duration: Histogram,
    pub risk_score: Histogram,
    pub clauses_analyzed: Counter,

    // Labeler
    pub labeler_requests: CounterVec,
    pub labeler_cache_hits: Counter,
    pub labeler_cache_misses: Counter,

    // Transport collaborators
    pub reports_rendered: CounterVec,
    pub auth_requests: CounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let analyses = register_counter_vec_with_registry!(
            Opts::new("analyses_total", "Total contract analyses"),
            &["outcome"],
            registry
        )?;

        let analysis_duration = register_histogram_with_registry!(
            HistogramOpts::new(
                "analysis_duration_seconds",
                "End-to-end analysis duration in seconds"
            ),
            registry
        )?;

        let risk_score = register_histogram_with_registry!(
            HistogramOpts::new("risk_score", "Distribution of assessed risk scores")
                .buckets(vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0]),
            registry
        )?;

        let clauses_analyzed = register_counter_with_registry!(
            Opts::new("clauses_analyzed_total", "Total clauses segmented and labeled"),
            registry
        )?;

        let labeler_requests = register_counter_vec_with_registry!(
            Opts::new("labeler_requests_total", "Total remote labeler requests"),
            &["outcome"],
            registry
        )?;

        let labeler_cache_hits = register_counter_with_registry!(
            Opts::new("labeler_cache_hits_total", "Labeler predictions served from cache"),
            registry
        )?;

        let labeler_cache_misses = register_counter_with_registry!(
            Opts::new("labeler_cache_misses_total", "Labeler cache misses"),
            registry
        )?;

        let reports_rendered = register_counter_vec_with_registry!(
            Opts::new("reports_rendered_total", "Total rendered reports"),
            &["outcome"],
            registry
        )?;

        let auth_requests = register_counter_vec_with_registry!(
            Opts::new("auth_requests_total", "Total authentication requests"),
            &["endpoint", "outcome"],
            registry
        )?;

        Ok(Self {
            registry,
            analyses,
            analysis_duration,
            risk_score,
            clauses_analyzed,
            labeler_requests,
            labeler_cache_hits,
            labeler_cache_misses,
            reports_rendered,
            auth_requests,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a finished analysis; `score` is only present on success
    pub fn record_analysis(&self, outcome: &str, seconds: f64, clauses: usize, score: Option<u8>) {
        self.analyses.with_label_values(&[outcome]).inc();
        self.analysis_duration.observe(seconds);
        self.clauses_analyzed.inc_by(clauses as f64);
        if let Some(score) = score {
            self.risk_score.observe(f64::from(score));
        }
    }

    pub fn record_labeler_request(&self, outcome: &str) {
        self.labeler_requests.with_label_values(&[outcome]).inc();
    }

    pub fn record_report(&self, success: bool) {
        let outcome = if success { "success" } else { "error" };
        self.reports_rendered.with_label_values(&[outcome]).inc();
    }

    pub fn record_auth(&self, endpoint: &str, success: bool) {
        let outcome = if success { "success" } else { "error" };
        self.auth_requests.with_label_values(&[endpoint, outcome]).inc();
    }

    /// Encode this registry in the Prometheus text format
    pub fn gather_text(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .unwrap_or_default();
        String::from_utf8(buffer).unwrap_or_default()
    }
}
