use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

/// A document handed over by the front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub name: String,
    pub content: String,
}

/// Turns an uploaded document into plain text.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, document: &UploadedDocument) -> Result<String, ApiError>;
}

/// Accepts documents that already are plain text.
#[derive(Debug, Default, Clone)]
pub struct PlainTextExtractor;

impl DocumentExtractor for PlainTextExtractor {
    fn extract(&self, document: &UploadedDocument) -> Result<String, ApiError> {
        if document.content.contains('\0') {
            return Err(ApiError::BadRequest(format!(
                "{} does not look like a text document",
                document.name
            )));
        }
        Ok(document.content.replace("\r\n", "\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_line_endings() {
        let doc = UploadedDocument {
            name: "notes.txt".to_string(),
            content: "a\r\nb".to_string(),
        };
        assert_eq!(PlainTextExtractor.extract(&doc).expect("text"), "a\nb");
    }

    #[test]
    fn rejects_binary_content() {
        let doc = UploadedDocument {
            name: "scan.pdf".to_string(),
            content: "%PDF\0\0".to_string(),
        };
        assert!(matches!(
            PlainTextExtractor.extract(&doc),
            Err(ApiError::BadRequest(_))
        ));
    }
}
