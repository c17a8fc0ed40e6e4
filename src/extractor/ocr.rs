//! Client for an external OCR service

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};

use super::{ExtractionError, TextExtractor};

/// The service answers with either the full text or recognised lines in reading order
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OcrResponse {
    Text { text: String },
    Lines { lines: Vec<String> },
}

impl OcrResponse {
    fn into_text(self) -> String {
        match self {
            OcrResponse::Text { text } => text,
            OcrResponse::Lines { lines } => lines.join("\n"),
        }
    }
}

pub struct OcrServiceExtractor {
    http: Client,
    service_url: String,
}

impl OcrServiceExtractor {
    pub fn new(service_url: String, timeout: Duration) -> Result<Self, ExtractionError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExtractionError::RequestFailed(e.to_string()))?;
        Ok(Self { http, service_url })
    }
}

#[async_trait]
impl TextExtractor for OcrServiceExtractor {
    async fn extract(&self, document: Bytes, content_type: &str) -> Result<String, ExtractionError> {
        debug!("Sending {} bytes ({}) to OCR service", document.len(), content_type);

        let response = self
            .http
            .post(&self.service_url)
            .header(CONTENT_TYPE, content_type)
            .body(document)
            .send()
            .await
            .map_err(|e| ExtractionError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("OCR service returned {}", status);
            return Err(ExtractionError::Upstream(format!(
                "Status {}: {}",
                status, error_text
            )));
        }

        let parsed: OcrResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::InvalidResponse(e.to_string()))?;

        Ok(parsed.into_text())
    }
}
