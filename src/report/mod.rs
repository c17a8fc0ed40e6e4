//! Report rendering
//!
//! Renderers consume a finished [`Assessment`] read-only. Their failures are
//! reported as [`RenderError`] and never invalidate the assessment itself.

pub mod json;
pub mod text;

use chrono::{DateTime, TimeZone};
use std::path::Path;
use thiserror::Error;

use crate::analysis::models::Assessment;

pub use json::JsonReportRenderer;
pub use text::TextReportRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub trait DocumentRenderer: Send + Sync {
    /// File extension of the produced document, without the dot
    fn extension(&self) -> &'static str;

    fn content_type(&self) -> &'static str;

    fn render(&self, assessment: &Assessment, output: &Path) -> Result<(), RenderError>;
}

/// Timestamped report file name, e.g. `contract_intelligence_report_20240131_142500.txt`
pub fn report_file_name<Tz>(now: &DateTime<Tz>, extension: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "contract_intelligence_report_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        extension
    )
}

/// Create the parent directory of `output` if needed
pub(crate) fn ensure_parent(output: &Path) -> Result<(), RenderError> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
