//! Error taxonomy for contract analysis

use thiserror::Error;

use crate::extractor::ExtractionError;
use crate::labeler::LabelerError;

/// Errors surfaced by the analysis pipeline
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Input text was empty or whitespace-only
    #[error("No content to analyze")]
    NoContent,

    #[error("Clause labeler failed: {0}")]
    Labeler(#[from] LabelerError),

    #[error("Text extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
}

impl AnalysisError {
    /// Stable machine-readable code used by the HTTP layer
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::NoContent => "NO_CONTENT",
            AnalysisError::Labeler(_) => "LABELER_FAILED",
            AnalysisError::Extraction(_) => "EXTRACTION_FAILED",
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
