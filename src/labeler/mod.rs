//! Clause labeling collaborators
//!
//! A labeler assigns one of the fixed candidate labels to a clause. The
//! pipeline only consumes the top prediction and expects labelers to be
//! idempotent for the same input, which is what makes [`CachedLabeler`] valid.

pub mod cached;
pub mod circuit_breaker;
pub mod http;
pub mod keyword;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::analysis::models::ClauseCategory;
use crate::config::{LabelerConfig, LabelerProvider};

pub use cached::CachedLabeler;
pub use circuit_breaker::{BreakerState, CircuitBreaker, CircuitBreakerConfig};
pub use http::HttpZeroShotLabeler;
pub use keyword::KeywordLabeler;

/// Candidate labels in their fixed order
pub const CANDIDATE_LABELS: [&str; 7] = [
    "Financial Liability",
    "Termination and Cancellation",
    "Payment Terms",
    "Intellectual Property Ownership",
    "Confidentiality",
    "Indemnification",
    "Safe Clause",
];

#[derive(Debug, Error)]
pub enum LabelerError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unknown label: {0}")]
    UnknownLabel(String),

    #[error("Circuit breaker is open: {0}")]
    CircuitOpen(String),
}

/// Top-ranked label for one clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPrediction {
    pub label: String,
    pub score: f64,
}

impl LabelPrediction {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }

    /// Map the label back to a category; labels outside the candidate set are errors
    pub fn category(&self) -> Result<ClauseCategory, LabelerError> {
        ClauseCategory::from_label(&self.label)
            .ok_or_else(|| LabelerError::UnknownLabel(self.label.clone()))
    }
}

#[async_trait]
pub trait ClauseLabeler: Send + Sync {
    /// Short identifier used in logs and metrics
    fn name(&self) -> &'static str;

    async fn label(
        &self,
        clause: &str,
        candidate_labels: &[&str],
    ) -> Result<LabelPrediction, LabelerError>;
}

/// Build the configured labeler, wrapped in a prediction cache unless disabled
pub fn build_labeler(config: &LabelerConfig) -> Result<Arc<dyn ClauseLabeler>, LabelerError> {
    let cache_enabled = config.cache_max_entries > 0;
    info!(
        "Initializing {:?} clause labeler (cache={})",
        config.provider, cache_enabled
    );

    let labeler: Arc<dyn ClauseLabeler> = match (config.provider, cache_enabled) {
        (LabelerProvider::Keyword, false) => Arc::new(KeywordLabeler::new()),
        (LabelerProvider::Keyword, true) => Arc::new(CachedLabeler::new(
            KeywordLabeler::new(),
            config.cache_ttl(),
            config.cache_max_entries,
        )),
        (LabelerProvider::Http, false) => Arc::new(HttpZeroShotLabeler::new(config.clone())?),
        (LabelerProvider::Http, true) => Arc::new(CachedLabeler::new(
            HttpZeroShotLabeler::new(config.clone())?,
            config.cache_ttl(),
            config.cache_max_entries,
        )),
    };
    Ok(labeler)
}
