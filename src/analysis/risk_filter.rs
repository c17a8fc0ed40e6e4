//! Risk filter: turns labeled clauses into risk items

use super::models::{ClauseLabel, RiskItem};

/// Drops safe clauses and attaches a risk tier and explanation to the rest
///
/// Confidence is not thresholded here unless a floor is explicitly configured;
/// the scorer applies its own threshold.
#[derive(Debug, Clone, Default)]
pub struct RiskFilter {
    min_confidence: Option<f64>,
}

impl RiskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Additionally drop labels whose confidence is below `floor`
    pub fn with_min_confidence(floor: f64) -> Self {
        Self {
            min_confidence: Some(floor),
        }
    }

    pub fn min_confidence(&self) -> Option<f64> {
        self.min_confidence
    }

    /// Filter labels, preserving input order
    pub fn filter(&self, labels: &[ClauseLabel]) -> Vec<RiskItem> {
        labels
            .iter()
            .filter(|label| {
                self.min_confidence
                    .map_or(true, |floor| label.confidence >= floor)
            })
            .filter_map(|label| {
                let category = label.category.as_risk()?;
                Some(RiskItem {
                    clause: label.clause.as_str().to_string(),
                    category,
                    confidence: label.confidence,
                    risk_level: category.risk_level(),
                    explanation: explain(category.label(), label.confidence),
                })
            })
            .collect()
    }
}

fn explain(category: &str, confidence: f64) -> String {
    format!(
        "Identified as {} with {:.1}% confidence.",
        category,
        confidence * 100.0
    )
}
