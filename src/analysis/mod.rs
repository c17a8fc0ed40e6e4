//! Contract risk analysis
//!
//! Stages, in data-flow order: segmentation, risk filtering, scoring, legal
//! structure, financial risk detection and economic impact. [`ContractAnalyzer`]
//! wires them together behind a pluggable clause labeler.

pub mod economic;
pub mod financial;
pub mod models;
pub mod pipeline;
pub mod risk_filter;
pub mod scorer;
pub mod segmenter;
pub mod structure;

pub use economic::{CostEstimate, EconomicImpactModel, DEFAULT_CONTRACT_VALUE};
pub use financial::FinancialRiskDetector;
pub use models::*;
pub use pipeline::ContractAnalyzer;
pub use risk_filter::RiskFilter;
pub use scorer::RiskScorer;
pub use segmenter::{segment_text, Segmenter};
pub use structure::StructureAnalyzer;
