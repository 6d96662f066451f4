//! Error types for the Narou client and MCP tools.

use crate::catalog::UnknownLabel;

/// Errors that can occur when calling a tool or the Narou API.
#[derive(Debug, thiserror::Error)]
pub enum NarouError {
    /// HTTP request failed (network, timeout, etc.)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Narou API returned an error status code.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Failed to parse API response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Tool input failed a schema constraint.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// No tool is registered under this name.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NarouError {
    /// True when the caller must fix the input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// True when the failure came from the remote API or the transport.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Api { .. } | Self::Parse(_))
    }
}

/// A rejected tool argument.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {kind}")]
pub struct ValidationError {
    /// Name of the offending input field.
    pub field: String,
    /// Which constraint was violated.
    pub kind: ValidationKind,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, kind: ValidationKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

/// The constraint a [`ValidationError`] reports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationKind {
    #[error("required field is missing")]
    Missing,

    #[error("expected {expected}")]
    Type { expected: &'static str },

    #[error("must be between {min} and {}", upper_bound(.max))]
    Range { min: u64, max: Option<u64> },

    #[error("must match pattern {pattern}")]
    Pattern { pattern: &'static str },

    #[error("expected format {expected}")]
    Format { expected: &'static str },

    #[error("{0}")]
    UnknownLabel(UnknownLabel),
}

fn upper_bound(max: &Option<u64>) -> String {
    max.map(|m| m.to_string())
        .unwrap_or_else(|| "unbounded".to_string())
}

/// Convenience alias for Results using [`NarouError`].
pub type Result<T> = std::result::Result<T, NarouError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_message_names_bounds() {
        let err = ValidationError::new("limit", ValidationKind::Range { min: 1, max: Some(500) });
        assert_eq!(err.to_string(), "limit: must be between 1 and 500");

        let err = ValidationError::new("limit", ValidationKind::Range { min: 1, max: None });
        assert_eq!(err.to_string(), "limit: must be between 1 and unbounded");
    }

    #[test]
    fn test_validation_and_remote_are_distinct() {
        let invalid = NarouError::from(ValidationError::new("ncode", ValidationKind::Missing));
        assert!(invalid.is_validation());
        assert!(!invalid.is_remote());

        let remote = NarouError::Api {
            status: 503,
            message: "busy".into(),
        };
        assert!(remote.is_remote());
        assert!(!remote.is_validation());
        assert!(remote.to_string().starts_with("API error (HTTP 503)"));
    }
}
