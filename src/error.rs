//! Error types for App Store Connect and Firebase operations.

use thiserror::Error;

/// Errors that can occur during API and provisioning operations.
#[derive(Debug, Error)]
pub enum AppDistError {
    /// Configuration is missing or incomplete.
    #[error("configuration required: {0}")]
    ConfigMissing(String),

    /// A caller-supplied value was rejected before any request was made.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A resource reference points at a different resource type.
    #[error("expected a reference to {expected}, got {actual}")]
    WrongResourceType {
        expected: &'static str,
        actual: String,
    },

    /// Entity not found.
    #[error("{entity_type} '{id}' not found")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A natural-key lookup matched more than one entity.
    #[error("multiple {entity_type} match '{key}', expected exactly one")]
    Ambiguous { entity_type: &'static str, key: String },

    /// Credentials were rejected by the API.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The API reported an application-level error.
    #[error("API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    /// Client-side failure that is neither transport nor API related.
    #[error("client error: {0}")]
    Client(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Local file system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppDistError {
    /// Whether the error was raised locally without contacting the API.
    pub fn is_local_validation(&self) -> bool {
        matches!(
            self,
            Self::ConfigMissing(_) | Self::InvalidParameter(_) | Self::WrongResourceType { .. }
        )
    }

    /// Whether the error comes from resolving a natural key.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Ambiguous { .. })
    }
}

/// Result type alias for appdist operations.
pub type Result<T> = core::result::Result<T, AppDistError>;

/// Log a transport or API failure once, inside the manager's span.
///
/// Local validation and lookup failures are returned without logging.
pub(crate) fn log_failure(
    span: &tracing::Span,
    vendor: &str,
    action: &str,
    label: &str,
    error: &AppDistError,
) {
    if error.is_local_validation() || error.is_lookup_failure() {
        return;
    }
    span.in_scope(|| tracing::error!(error = %error, "Failed to {action} {vendor} {label}"));
}

/// Reject empty or whitespace-only identifiers.
pub(crate) fn require_non_empty(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppDistError::InvalidParameter(format!("{name} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(AppDistError::InvalidParameter("limit".into()).is_local_validation());
        assert!(AppDistError::WrongResourceType {
            expected: "builds",
            actual: "apps".into()
        }
        .is_local_validation());
        assert!(!AppDistError::Client("boom".into()).is_local_validation());

        assert!(AppDistError::Ambiguous {
            entity_type: "betaBuildLocalizations",
            key: "123/en-US".into()
        }
        .is_lookup_failure());
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("locale", "en-US").is_ok());
        let err = require_non_empty("locale", "  ").unwrap_err();
        assert_eq!(err.to_string(), "invalid parameter: locale must not be empty");
    }
}
