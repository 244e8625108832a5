//! Output formatting helpers for CLI commands.

use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// Pretty-printed JSON output.
    Json,
}

impl OutputFormat {
    /// Parses a format string, defaulting to text for unknown values.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Serializes a value as pretty-printed JSON.
    ///
    /// Falls back to an empty JSON object when serialization fails,
    /// which cannot happen for the derived types this crate emits.
    #[must_use]
    pub fn to_json<T: Serialize>(self, value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_formats() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
    }

    #[test]
    fn test_parse_unknown_defaults_to_text() {
        assert_eq!(OutputFormat::parse("yaml"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse(""), OutputFormat::Text);
    }

    #[test]
    fn test_to_json_pretty_prints() {
        let json = OutputFormat::Json.to_json(&serde_json::json!({"answer": "ok"}));
        assert!(json.contains("\"answer\": \"ok\""));
    }
}
