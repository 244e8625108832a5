//! Retrieved passage type.

use serde::{Deserialize, Serialize};

/// A scored passage returned by the retrieval service.
///
/// Passages keep the order the retriever returned them in, most relevant
/// first. That order is what "retrieval order" means everywhere downstream:
/// verdict indices, context assembly, and diagnostics all refer to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Passage text as stored in the corpus.
    pub text: String,
    /// Similarity score assigned by the retrieval service.
    pub score: f32,
    /// Identifier of the source document, when the service provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

impl Passage {
    /// Creates a passage with no source attribution.
    #[must_use]
    pub fn new(text: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            score,
            source_id: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_without_source_id() {
        let json = r#"{"text": "Q4 revenue grew 12%.", "score": 0.87}"#;
        let passage: Passage = serde_json::from_str(json)
            .unwrap_or_else(|e| panic!("failed to deserialize passage: {e}"));
        assert_eq!(passage.text, "Q4 revenue grew 12%.");
        assert!(passage.source_id.is_none());
    }

    #[test]
    fn serializes_skipping_empty_source() {
        let passage = Passage::new("text", 0.5);
        let json = serde_json::to_string(&passage)
            .unwrap_or_else(|e| panic!("failed to serialize passage: {e}"));
        assert!(!json.contains("source_id"));
    }
}
