//! Prediction cache in front of any labeler

use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;
use tracing::debug;

use super::{ClauseLabeler, LabelPrediction, LabelerError};
use crate::metrics::METRICS;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    clause: String,
    candidate_labels: Vec<String>,
}

impl CacheKey {
    fn new(clause: &str, candidate_labels: &[&str]) -> Self {
        Self {
            clause: clause.to_string(),
            candidate_labels: candidate_labels.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Memoises predictions per (clause, candidate labels); errors are never cached
pub struct CachedLabeler<L> {
    inner: L,
    cache: Cache<CacheKey, LabelPrediction>,
}

impl<L: ClauseLabeler> CachedLabeler<L> {
    pub fn new(inner: L, ttl: Duration, max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self { inner, cache }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl<L: ClauseLabeler> ClauseLabeler for CachedLabeler<L> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn label(
        &self,
        clause: &str,
        candidate_labels: &[&str],
    ) -> Result<LabelPrediction, LabelerError> {
        let key = CacheKey::new(clause, candidate_labels);

        if let Some(hit) = self.cache.get(&key).await {
            METRICS.labeler_cache_hits.inc();
            return Ok(hit);
        }
        METRICS.labeler_cache_misses.inc();

        let prediction = self.inner.label(clause, candidate_labels).await?;
        self.cache.insert(key, prediction.clone()).await;
        debug!("Cached prediction for {}", prediction.label);
        Ok(prediction)
    }
}
