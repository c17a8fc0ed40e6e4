//! Contract analysis pipeline
//!
//! `analyze` segments the text, labels every clause through the configured
//! [`ClauseLabeler`] with bounded concurrency, then hands off to `assemble`,
//! which runs the synchronous stages and builds the [`Assessment`].

use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::economic::EconomicImpactModel;
use super::financial::FinancialRiskDetector;
use super::models::{Assessment, Clause, ClauseLabel};
use super::risk_filter::RiskFilter;
use super::scorer::RiskScorer;
use super::segmenter::Segmenter;
use super::structure::StructureAnalyzer;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::labeler::{ClauseLabeler, CANDIDATE_LABELS};
use crate::metrics::METRICS;

/// Explicitly constructed pipeline; holds no per-request state
pub struct ContractAnalyzer {
    labeler: Arc<dyn ClauseLabeler>,
    config: AnalysisConfig,
    segmenter: Segmenter,
    risk_filter: RiskFilter,
    scorer: RiskScorer,
    structure: StructureAnalyzer,
    financial: FinancialRiskDetector,
    economic: EconomicImpactModel,
}

impl ContractAnalyzer {
    pub fn new(labeler: Arc<dyn ClauseLabeler>, config: AnalysisConfig) -> Self {
        let risk_filter = match config.risk_filter_floor {
            Some(floor) => RiskFilter::with_min_confidence(floor),
            None => RiskFilter::new(),
        };

        Self {
            labeler,
            segmenter: Segmenter::default(),
            risk_filter,
            scorer: RiskScorer::new(config.min_confidence),
            structure: StructureAnalyzer::new(),
            financial: FinancialRiskDetector::new(),
            economic: EconomicImpactModel::new(),
            config,
        }
    }

    pub fn with_segmenter(mut self, segmenter: Segmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    pub fn with_scorer(mut self, scorer: RiskScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_economic_model(mut self, economic: EconomicImpactModel) -> Self {
        self.economic = economic;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze contract text; `contract_value` falls back to the configured default
    pub async fn analyze(&self, text: &str, contract_value: Option<f64>) -> Result<Assessment> {
        let start = Instant::now();

        if text.trim().is_empty() {
            METRICS.record_analysis("no_content", start.elapsed().as_secs_f64(), 0, None);
            return Err(AnalysisError::NoContent);
        }

        let clauses = self.segmenter.segment(text);
        debug!("Segmented text into {} clauses", clauses.len());

        let labels = match self.label_clauses(&clauses).await {
            Ok(labels) => labels,
            Err(e) => {
                warn!("Analysis aborted by labeler ({}): {}", self.labeler.name(), e);
                METRICS.record_analysis(
                    "labeler_error",
                    start.elapsed().as_secs_f64(),
                    clauses.len(),
                    None,
                );
                return Err(e);
            }
        };

        let value = contract_value.unwrap_or(self.config.default_contract_value);
        let assessment = self.assemble(text, clauses, labels, value);

        info!(
            "Analyzed {} clauses: {} risks, score {}, exposure {}",
            assessment.total_clauses_analyzed,
            assessment.risks.len(),
            assessment.risk_score,
            assessment.financial_risks.estimated_exposure
        );
        METRICS.record_analysis(
            "success",
            start.elapsed().as_secs_f64(),
            assessment.total_clauses_analyzed,
            Some(assessment.risk_score),
        );

        Ok(assessment)
    }

    /// Label clauses concurrently while keeping clause order; stops at the first error
    async fn label_clauses(&self, clauses: &[Clause]) -> Result<Vec<ClauseLabel>> {
        let labeler = self.labeler.as_ref();

        stream::iter(clauses.iter().cloned())
            .map(|clause| async move {
                let prediction = labeler.label(clause.as_str(), &CANDIDATE_LABELS).await?;
                let category = prediction.category()?;
                Ok::<_, AnalysisError>(ClauseLabel {
                    clause,
                    category,
                    confidence: round4(prediction.score),
                })
            })
            .buffered(self.config.label_concurrency.max(1))
            .try_collect()
            .await
    }

    /// Run every stage after labeling; pure and synchronous
    pub fn assemble(
        &self,
        text: &str,
        clauses: Vec<Clause>,
        labels: Vec<ClauseLabel>,
        contract_value: f64,
    ) -> Assessment {
        let risks = self.risk_filter.filter(&labels);
        let score = self.scorer.calculate(&risks);
        debug!("Scored {} risks at {}", risks.len(), score.total_score);

        let legal_structure = self.structure.analyze(text, &clauses);
        let financial_risks = self.financial.detect(&risks, text);
        let economic_impact = self
            .economic
            .calculate(&financial_risks.risks, contract_value);

        Assessment {
            risk_score: score.total_score,
            score_breakdown: score.breakdown,
            risks,
            total_clauses_analyzed: clauses.len(),
            legal_structure,
            financial_risks,
            economic_impact,
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::{ClauseCategory, RiskCategory};
    use crate::labeler::{KeywordLabeler, LabelPrediction, LabelerError};
    use async_trait::async_trait;

    struct FixedLabeler(&'static str);

    #[async_trait]
    impl ClauseLabeler for FixedLabeler {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn label(
            &self,
            _clause: &str,
            _candidate_labels: &[&str],
        ) -> std::result::Result<LabelPrediction, LabelerError> {
            Ok(LabelPrediction::new(self.0, 0.912345))
        }
    }

    fn analyzer(labeler: impl ClauseLabeler + 'static) -> ContractAnalyzer {
        ContractAnalyzer::new(Arc::new(labeler), AnalysisConfig::default())
    }

    #[tokio::test]
    async fn test_empty_text_is_no_content() {
        let result = analyzer(KeywordLabeler::new()).analyze("  \n ", None).await;
        assert!(matches!(result, Err(AnalysisError::NoContent)));
    }

    #[tokio::test]
    async fn test_unknown_label_aborts() {
        let result = analyzer(FixedLabeler("Force Majeure"))
            .analyze("Either party may terminate this agreement.", None)
            .await;
        assert!(matches!(
            result,
            Err(AnalysisError::Labeler(LabelerError::UnknownLabel(_)))
        ));
    }

    #[tokio::test]
    async fn test_confidence_rounded_and_default_value_applied() {
        let assessment = analyzer(FixedLabeler("Termination and Cancellation"))
            .analyze("Either party may terminate this agreement.", None)
            .await
            .unwrap();
        assert_eq!(assessment.risks[0].confidence, 0.9123);
        assert_eq!(assessment.risk_score, 80);
        assert_eq!(assessment.economic_impact.contract_value, 10_000.0);
    }

    #[tokio::test]
    async fn test_labels_keep_clause_order() {
        let text = "Contractor is liable for all damages. Company may terminate at will. \
                    Invoices are payable in thirty days. All inventions belong to Company.";
        let analyzer = ContractAnalyzer::new(
            Arc::new(KeywordLabeler::new()),
            AnalysisConfig {
                label_concurrency: 3,
                ..AnalysisConfig::default()
            },
        );
        let assessment = analyzer.analyze(text, Some(5_000.0)).await.unwrap();
        let categories: Vec<RiskCategory> = assessment.risks.iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![
                RiskCategory::FinancialLiability,
                RiskCategory::TerminationAndCancellation,
                RiskCategory::PaymentTerms,
                RiskCategory::IntellectualPropertyOwnership,
            ]
        );
        assert_eq!(assessment.economic_impact.contract_value, 5_000.0);
    }

    #[test]
    fn test_assemble_with_fixed_labels() {
        let analyzer = analyzer(KeywordLabeler::new());
        let text = "The parties shall cooperate in good faith.";
        let clauses = crate::analysis::segmenter::segment_text(text);
        let labels = vec![ClauseLabel {
            clause: clauses[0].clone(),
            category: ClauseCategory::SafeClause,
            confidence: 0.99,
        }];
        let assessment = analyzer.assemble(text, clauses, labels, 10_000.0);
        assert_eq!(assessment.risk_score, 100);
        assert!(assessment.risks.is_empty());
        assert_eq!(assessment.total_clauses_analyzed, 1);
        assert_eq!(
            assessment.economic_impact.recommendations,
            vec!["Standard contract terms - minimal concerns"]
        );
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.912345), 0.9123);
        assert_eq!(round4(0.5), 0.5);
    }
}
