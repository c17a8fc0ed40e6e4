//! Text extraction collaborators
//!
//! Turn uploaded document bytes into plain text for the analysis pipeline.
//! Any returned string is treated as valid input regardless of quality.

pub mod ocr;
pub mod plain;

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ExtractorConfig;

pub use ocr::OcrServiceExtractor;
pub use plain::PlainTextExtractor;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Invalid text encoding: {0}")]
    InvalidEncoding(String),

    #[error("Document is empty")]
    Empty,

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, document: Bytes, content_type: &str) -> Result<String, ExtractionError>;
}

/// Media type without parameters, lower-cased
pub(crate) fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Plain text for `text/*`, OCR for everything else when a service is configured
pub struct RoutingExtractor {
    plain: PlainTextExtractor,
    ocr: Option<Arc<dyn TextExtractor>>,
}

impl RoutingExtractor {
    pub fn new(ocr: Option<Arc<dyn TextExtractor>>) -> Self {
        Self {
            plain: PlainTextExtractor,
            ocr,
        }
    }

    pub fn from_config(config: &ExtractorConfig) -> Result<Self, ExtractionError> {
        let ocr = match &config.ocr_url {
            Some(url) => {
                let client = OcrServiceExtractor::new(url.clone(), config.timeout())?;
                Some(Arc::new(client) as Arc<dyn TextExtractor>)
            }
            None => None,
        };
        Ok(Self::new(ocr))
    }
}

#[async_trait]
impl TextExtractor for RoutingExtractor {
    async fn extract(&self, document: Bytes, content_type: &str) -> Result<String, ExtractionError> {
        if document.is_empty() {
            return Err(ExtractionError::Empty);
        }

        if media_type(content_type).starts_with("text/") {
            return self.plain.extract(document, content_type).await;
        }

        match &self.ocr {
            Some(ocr) => ocr.extract(document, content_type).await,
            None => Err(ExtractionError::UnsupportedContentType(content_type.to_string())),
        }
    }
}
