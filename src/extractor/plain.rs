use async_trait::async_trait;
use bytes::Bytes;

use super::{media_type, ExtractionError, TextExtractor};

/// Strict UTF-8 decoding of `text/*` documents
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, document: Bytes, content_type: &str) -> Result<String, ExtractionError> {
        if !media_type(content_type).starts_with("text/") {
            return Err(ExtractionError::UnsupportedContentType(content_type.to_string()));
        }

        let text = String::from_utf8(document.to_vec())
            .map_err(|e| ExtractionError::InvalidEncoding(e.to_string()))?;
        // Strip a leading byte-order mark.
        Ok(text.trim_start_matches('\u{feff}').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_decodes_utf8() {
        let text = PlainTextExtractor
            .extract(Bytes::from("\u{feff}Señor Pérez shall pay.".as_bytes()), "text/plain; charset=utf-8")
            .await
            .unwrap();
        assert_eq!(text, "Señor Pérez shall pay.");
    }

    #[tokio::test]
    async fn test_rejects_invalid_utf8() {
        let err = PlainTextExtractor
            .extract(Bytes::from_static(&[0x66, 0xff, 0xfe]), "text/plain")
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidEncoding(_)));
    }

    #[tokio::test]
    async fn test_rejects_non_text() {
        let err = PlainTextExtractor
            .extract(Bytes::from_static(b"abc"), "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedContentType(_)));
    }
}
