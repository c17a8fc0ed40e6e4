//! Risk scoring
//!
//! Starts from a base score of 100 and applies a flat per-category penalty for
//! every risk item whose confidence reaches the threshold. Confidence never
//! scales the penalty.

use std::collections::HashMap;

use super::models::{RiskCategory, RiskItem, RiskScore, ScoreEntry};

pub const BASE_SCORE: i64 = 100;
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;
/// Penalty for categories missing from the table
pub const DEFAULT_PENALTY: u32 = 5;

const CLAUSE_PREVIEW_CHARS: usize = 50;

fn default_penalties() -> HashMap<RiskCategory, u32> {
    HashMap::from([
        (RiskCategory::FinancialLiability, 15),
        (RiskCategory::TerminationAndCancellation, 20),
        (RiskCategory::IntellectualPropertyOwnership, 15),
        (RiskCategory::Indemnification, 10),
        (RiskCategory::Confidentiality, 5),
        (RiskCategory::PaymentTerms, 5),
    ])
}

/// Aggregates risk items into a clamped 0-100 score
#[derive(Debug, Clone)]
pub struct RiskScorer {
    penalties: HashMap<RiskCategory, u32>,
    min_confidence: f64,
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self {
            penalties: default_penalties(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

impl RiskScorer {
    pub fn new(min_confidence: f64) -> Self {
        Self {
            min_confidence,
            ..Self::default()
        }
    }

    /// Replace the penalty table; categories left out fall back to [`DEFAULT_PENALTY`]
    pub fn with_penalties(mut self, penalties: HashMap<RiskCategory, u32>) -> Self {
        self.penalties = penalties;
        self
    }

    pub fn penalty_for(&self, category: RiskCategory) -> u32 {
        self.penalties
            .get(&category)
            .copied()
            .unwrap_or(DEFAULT_PENALTY)
    }

    pub fn calculate(&self, risks: &[RiskItem]) -> RiskScore {
        let mut running = BASE_SCORE;
        let mut breakdown = Vec::new();

        for risk in risks {
            if risk.confidence < self.min_confidence {
                continue;
            }

            let penalty = self.penalty_for(risk.category);
            running -= i64::from(penalty);
            breakdown.push(ScoreEntry {
                category: risk.category,
                clause: preview(&risk.clause),
                penalty: -(penalty as i32),
                reason: format!("Detected {}", risk.category),
            });
        }

        RiskScore {
            total_score: running.clamp(0, BASE_SCORE) as u8,
            breakdown,
        }
    }
}

fn preview(clause: &str) -> String {
    let head: String = clause.chars().take(CLAUSE_PREVIEW_CHARS).collect();
    format!("{}...", head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::RiskLevel;

    fn risk(category: RiskCategory, confidence: f64) -> RiskItem {
        RiskItem {
            clause: "Company may terminate this Agreement at any time without notice or cause."
                .to_string(),
            category,
            confidence,
            risk_level: category.risk_level(),
            explanation: String::new(),
        }
    }

    #[test]
    fn test_termination_penalty() {
        let score = RiskScorer::default()
            .calculate(&[risk(RiskCategory::TerminationAndCancellation, 0.9)]);
        assert_eq!(score.total_score, 80);
        assert_eq!(score.breakdown.len(), 1);
        assert_eq!(score.breakdown[0].penalty, -20);
        assert_eq!(
            score.breakdown[0].reason,
            "Detected Termination and Cancellation"
        );
    }

    #[test]
    fn test_low_confidence_skipped() {
        let score = RiskScorer::default()
            .calculate(&[risk(RiskCategory::TerminationAndCancellation, 0.3)]);
        assert_eq!(score.total_score, 100);
        assert!(score.breakdown.is_empty());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let score = RiskScorer::default().calculate(&[risk(RiskCategory::PaymentTerms, 0.5)]);
        assert_eq!(score.total_score, 95);
    }

    #[test]
    fn test_score_clamped_at_zero() {
        let risks: Vec<RiskItem> = (0..12)
            .map(|_| risk(RiskCategory::TerminationAndCancellation, 0.99))
            .collect();
        let score = RiskScorer::default().calculate(&risks);
        assert_eq!(score.total_score, 0);
        assert_eq!(score.breakdown.len(), 12);
    }

    #[test]
    fn test_score_in_range_for_all_category_mixes() {
        let categories = [
            RiskCategory::FinancialLiability,
            RiskCategory::TerminationAndCancellation,
            RiskCategory::PaymentTerms,
            RiskCategory::IntellectualPropertyOwnership,
            RiskCategory::Confidentiality,
            RiskCategory::Indemnification,
        ];
        let scorer = RiskScorer::default();
        for n in 0..30 {
            let risks: Vec<RiskItem> = (0..n)
                .map(|i| risk(categories[i % categories.len()], 0.4 + (i % 6) as f64 * 0.1))
                .collect();
            let score = scorer.calculate(&risks);
            assert!(score.total_score <= 100);
        }
    }

    #[test]
    fn test_breakdown_order_and_preview() {
        let risks = vec![
            risk(RiskCategory::Confidentiality, 0.8),
            risk(RiskCategory::FinancialLiability, 0.8),
        ];
        let score = RiskScorer::default().calculate(&risks);
        assert_eq!(score.total_score, 80);
        assert_eq!(score.breakdown[0].category, RiskCategory::Confidentiality);
        assert_eq!(score.breakdown[1].category, RiskCategory::FinancialLiability);
        assert_eq!(
            score.breakdown[0].clause,
            "Company may terminate this Agreement at any time w..."
        );
        assert_eq!(risks[0].risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_missing_category_uses_default_penalty() {
        let scorer = RiskScorer::default().with_penalties(HashMap::from([(
            RiskCategory::FinancialLiability,
            40,
        )]));
        let score = scorer.calculate(&[
            risk(RiskCategory::FinancialLiability, 0.9),
            risk(RiskCategory::Indemnification, 0.9),
        ]);
        assert_eq!(score.total_score, 55);
    }
}
