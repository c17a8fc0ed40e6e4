//! Offline keyword labeler
//!
//! Deterministic stand-in for the zero-shot model. Each category has a
//! case-insensitive vocabulary; the category with the most hits wins and ties
//! go to the earlier candidate label.

use async_trait::async_trait;
use regex::Regex;

use super::{ClauseLabeler, LabelPrediction, LabelerError};
use crate::analysis::models::ClauseCategory;

const SAFE_SCORE: f64 = 0.9;
const BASE_SCORE: f64 = 0.5;
const SCORE_PER_HIT: f64 = 0.15;
const MAX_SCORE: f64 = 0.95;

fn vocabulary(category: ClauseCategory) -> Option<&'static str> {
    match category {
        ClauseCategory::FinancialLiability => Some(r"liab\w*|damages|losses|unlimited"),
        ClauseCategory::TerminationAndCancellation => Some(r"terminat\w*|cancel\w*|notice"),
        ClauseCategory::PaymentTerms => {
            Some(r"pay\w*|invoices?|fees?|net[- ]?\d+|compensation")
        }
        ClauseCategory::IntellectualPropertyOwnership => Some(
            r"intellectual property|work product|ownership|copyrights?|patents?|inventions?",
        ),
        ClauseCategory::Confidentiality => {
            Some(r"confidential\w*|non-disclosure|secrets?|proprietary")
        }
        ClauseCategory::Indemnification => Some(r"indemnif\w*|hold harmless|defend"),
        ClauseCategory::SafeClause => None,
    }
}

#[derive(Debug, Clone)]
pub struct KeywordLabeler {
    rules: Vec<(ClauseCategory, Regex)>,
}

impl Default for KeywordLabeler {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordLabeler {
    pub fn new() -> Self {
        let rules = ClauseCategory::ALL
            .iter()
            .filter_map(|category| {
                let words = vocabulary(*category)?;
                let pattern = format!(r"(?i)\b(?:{})\b", words);
                Some((
                    *category,
                    Regex::new(&pattern).expect("keyword vocabulary is a valid pattern"),
                ))
            })
            .collect();
        Self { rules }
    }

    /// Top category and its hit count, restricted to `candidates`
    fn best_match(&self, clause: &str, candidates: &[&str]) -> Option<(ClauseCategory, usize)> {
        let mut best: Option<(ClauseCategory, usize)> = None;
        for (category, regex) in &self.rules {
            if !candidates.contains(&category.label()) {
                continue;
            }
            let hits = regex.find_iter(clause).count();
            if hits > 0 && best.map_or(true, |(_, top)| hits > top) {
                best = Some((*category, hits));
            }
        }
        best
    }
}

#[async_trait]
impl ClauseLabeler for KeywordLabeler {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn label(
        &self,
        clause: &str,
        candidate_labels: &[&str],
    ) -> Result<LabelPrediction, LabelerError> {
        match self.best_match(clause, candidate_labels) {
            Some((category, hits)) => {
                let score = (BASE_SCORE + SCORE_PER_HIT * hits as f64).min(MAX_SCORE);
                Ok(LabelPrediction::new(category.label(), score))
            }
            None => Ok(LabelPrediction::new(
                ClauseCategory::SafeClause.label(),
                SAFE_SCORE,
            )),
        }
    }
}
