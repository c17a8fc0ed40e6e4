use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{ensure_parent, DocumentRenderer, RenderError};
use crate::analysis::models::Assessment;

/// Pretty-printed JSON of the assessment, using the HTTP wire names
#[derive(Debug, Clone, Default)]
pub struct JsonReportRenderer;

impl DocumentRenderer for JsonReportRenderer {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, assessment: &Assessment, output: &Path) -> Result<(), RenderError> {
        ensure_parent(output)?;
        let mut writer = BufWriter::new(File::create(output)?);
        serde_json::to_writer_pretty(&mut writer, assessment)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
