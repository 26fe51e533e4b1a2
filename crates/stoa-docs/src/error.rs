//! Error types for the documentation crate.

use stoa_core::ConfigurationError;
use thiserror::Error;

/// Errors that can occur while describing routes.
#[derive(Debug, Error)]
pub enum DocsError {
    /// A handler signature cannot be documented.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Failed to serialize the document to JSON.
    #[error("Failed to serialize API document: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl DocsError {
    /// Returns the configuration error, if this is one.
    pub fn as_configuration(&self) -> Option<&ConfigurationError> {
        match self {
            Self::Configuration(err) => Some(err),
            Self::SerializationError(_) => None,
        }
    }
}

/// Result type for documentation operations.
pub type DocsResult<T> = Result<T, DocsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error() {
        let err: DocsError = serde_json::from_str::<String>("invalid")
            .unwrap_err()
            .into();
        assert!(matches!(err, DocsError::SerializationError(_)));
        assert!(err.to_string().contains("serialize"));
        assert!(err.as_configuration().is_none());
    }

    #[test]
    fn test_configuration_error_is_transparent() {
        let err: DocsError = ConfigurationError::AsyncNotAllowed {
            function: "h".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Function \"h\" may not be async.");
        assert!(err.as_configuration().is_some());
    }
}
