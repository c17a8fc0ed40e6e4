//! Contract risk intelligence
//!
//! Segments contract text into clauses, labels them through a pluggable
//! clause labeler and derives a risk score, legal structure summary,
//! financial risk assessment and economic impact estimate.

pub mod analysis;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod extractor;
pub mod labeler;
pub mod metrics;
pub mod report;
pub mod telemetry;

pub use analysis::{Assessment, ContractAnalyzer};
pub use config::AppConfig;
pub use error::{AnalysisError, Result};
