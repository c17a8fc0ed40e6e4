//! Zero-shot classification over HTTP with retry and circuit breaker

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use super::circuit_breaker::{BreakerState, CircuitBreaker, CircuitBreakerConfig};
use super::{ClauseLabeler, LabelPrediction, LabelerError};
use crate::config::LabelerConfig;
use crate::metrics::METRICS;

const OPERATION: &str = "label";

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
}

/// Labels and scores, sorted by descending score
#[derive(Debug, Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f64>,
}

impl ZeroShotResponse {
    fn top(self) -> Result<LabelPrediction, LabelerError> {
        if self.labels.len() != self.scores.len() {
            return Err(LabelerError::InvalidResponse(format!(
                "{} labels but {} scores",
                self.labels.len(),
                self.scores.len()
            )));
        }

        self.labels
            .into_iter()
            .zip(self.scores)
            .fold(None::<LabelPrediction>, |best, (label, score)| match best {
                Some(b) if b.score >= score => Some(b),
                _ => Some(LabelPrediction::new(label, score)),
            })
            .ok_or_else(|| LabelerError::InvalidResponse("empty label list".to_string()))
    }
}

pub struct HttpZeroShotLabeler {
    http: Client,
    config: LabelerConfig,
    breaker: CircuitBreaker,
}

impl HttpZeroShotLabeler {
    pub fn new(config: LabelerConfig) -> Result<Self, LabelerError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LabelerError::RequestFailed(e.to_string()))?;

        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: config.circuit_breaker_failures,
            reset_timeout: config.breaker_reset_timeout(),
        });

        Ok(Self {
            http,
            config,
            breaker,
        })
    }

    pub fn breaker_state(&self) -> BreakerState {
        self.breaker.state(OPERATION)
    }

    async fn call_endpoint(
        &self,
        clause: &str,
        candidate_labels: &[&str],
    ) -> Result<LabelPrediction, LabelerError> {
        let body = ZeroShotRequest {
            inputs: clause,
            parameters: ZeroShotParameters { candidate_labels },
        };

        let mut req = self.http.post(&self.config.endpoint).json(&body);
        if let Some(api_key) = &self.config.api_key {
            req = req.bearer_auth(api_key.expose_secret());
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                LabelerError::Timeout(e.to_string())
            } else {
                LabelerError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LabelerError::Upstream(format!(
                "Status {}: {}",
                status, error_text
            )));
        }

        let parsed: ZeroShotResponse = response
            .json()
            .await
            .map_err(|e| LabelerError::InvalidResponse(e.to_string()))?;

        parsed.top()
    }

    /// Exponential backoff: base * 2^(attempt - 1)
    fn calculate_backoff(&self, attempt: usize) -> Duration {
        let multiplier = 2_u32.saturating_pow(attempt.saturating_sub(1) as u32);
        self.config.retry_backoff().saturating_mul(multiplier)
    }
}

#[async_trait]
impl ClauseLabeler for HttpZeroShotLabeler {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn label(
        &self,
        clause: &str,
        candidate_labels: &[&str],
    ) -> Result<LabelPrediction, LabelerError> {
        if self.breaker.is_open(OPERATION) {
            METRICS.record_labeler_request("circuit_open");
            error!("Circuit breaker is open for labeler endpoint");
            return Err(LabelerError::CircuitOpen(OPERATION.to_string()));
        }

        let start = Instant::now();
        let mut attempt = 0;
        loop {
            attempt += 1;

            match self.call_endpoint(clause, candidate_labels).await {
                Ok(prediction) => {
                    self.breaker.mark_success(OPERATION);
                    METRICS.record_labeler_request("success");
                    debug!(
                        "Labeled clause as {} after {} attempt(s) in {:?}",
                        prediction.label,
                        attempt,
                        start.elapsed()
                    );
                    return Ok(prediction);
                }
                Err(e) => {
                    self.breaker.mark_failure(OPERATION);
                    METRICS.record_labeler_request("error");

                    if attempt > self.config.retry_attempts {
                        error!("Labeling failed after {} attempts: {}", attempt, e);
                        return Err(e);
                    }

                    let backoff = self.calculate_backoff(attempt);
                    warn!(
                        "Labeling attempt {} failed: {}, retrying in {:?}",
                        attempt, e, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_backoff() {
        let labeler = HttpZeroShotLabeler::new(LabelerConfig::default()).unwrap();
        assert_eq!(labeler.calculate_backoff(1), Duration::from_millis(200));
        assert_eq!(labeler.calculate_backoff(2), Duration::from_millis(400));
        assert_eq!(labeler.calculate_backoff(3), Duration::from_millis(800));
    }

    #[test]
    fn test_top_prediction_uses_highest_score() {
        let response = ZeroShotResponse {
            labels: vec!["Safe Clause".to_string(), "Payment Terms".to_string()],
            scores: vec![0.2, 0.7],
        };
        let top = response.top().unwrap();
        assert_eq!(top.label, "Payment Terms");
        assert_eq!(top.score, 0.7);
    }

    #[test]
    fn test_malformed_responses() {
        let empty = ZeroShotResponse {
            labels: vec![],
            scores: vec![],
        };
        assert!(matches!(empty.top(), Err(LabelerError::InvalidResponse(_))));

        let mismatched = ZeroShotResponse {
            labels: vec!["Safe Clause".to_string()],
            scores: vec![],
        };
        assert!(matches!(
            mismatched.top(),
            Err(LabelerError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_request_shape() {
        let labels = ["Payment Terms", "Safe Clause"];
        let body = ZeroShotRequest {
            inputs: "Invoices are due monthly.",
            parameters: ZeroShotParameters {
                candidate_labels: &labels,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["inputs"], "Invoices are due monthly.");
        assert_eq!(json["parameters"]["candidate_labels"][1], "Safe Clause");
    }
}
