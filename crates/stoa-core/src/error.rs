//! Error types for Stoa.
//!
//! Two classes of failure exist and they are kept apart on purpose:
//!
//! | Class | Type | When | Retryable |
//! |---|---|---|---|
//! | Configuration | [`ConfigurationError`] | plan building, route construction | never |
//! | Validation | [`ValidationErrors`] | step execution against request data | per request |
//!
//! Both are carried by the top-level [`Error`], which also wraps failures
//! raised by handler bodies and executor invariants.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validators::ValidationErrors;

/// Result type alias using [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The application is wired incorrectly. Surfaces at startup or first use.
    Configuration,
    /// Request data failed validation.
    Validation,
    /// Anything else raised while serving a request.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Configuration | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A fatal wiring error detected while inspecting handler signatures.
///
/// These are raised once, when a plan or a route description is built, and
/// are never produced by request data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No registered component accepts the parameter.
    #[error("No component able to handle parameter \"{parameter}\" on function \"{function}\".")]
    NoComponent {
        /// Parameter name.
        parameter: String,
        /// Function declaring the parameter.
        function: String,
    },

    /// An async function was given to an injector that only runs blocking steps.
    #[error("Function \"{function}\" may not be async.")]
    AsyncNotAllowed {
        /// Function name.
        function: String,
    },

    /// A parameter annotation has a shape the route builder cannot document.
    #[error("Unsupported annotation `{annotation}` for parameter \"{parameter}\" on function \"{function}\".")]
    UnsupportedAnnotation {
        /// Parameter name.
        parameter: String,
        /// Function declaring the parameter.
        function: String,
        /// Rendered annotation.
        annotation: String,
    },

    /// A path parameter is annotated with something other than a scalar or validator.
    #[error("Path parameter \"{parameter}\" on function \"{function}\" must be a scalar or a validator, found `{annotation}`.")]
    InvalidPathParameter {
        /// Parameter name.
        parameter: String,
        /// Function declaring the parameter.
        function: String,
        /// Rendered annotation.
        annotation: String,
    },

    /// A dependency (transitively) requires itself.
    #[error("Dependency cycle on \"{key}\" while resolving function \"{function}\".")]
    DependencyCycle {
        /// State key that was re-entered.
        key: String,
        /// Function whose parameter closed the cycle.
        function: String,
    },

    /// Two routes share a method and URL.
    #[error("Route {method} {url} is registered more than once.")]
    DuplicateRoute {
        /// HTTP method.
        method: String,
        /// URL template.
        url: String,
    },
}

/// Standard error type for Stoa.
///
/// # Example
///
/// ```
/// use stoa_core::{Error, ErrorCategory, ValidationErrors};
///
/// let err: Error = ValidationErrors::required("n").into();
/// assert_eq!(err.category(), ErrorCategory::Validation);
/// assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
/// ```
#[derive(Debug, Error)]
pub enum Error {
    /// The application is misconfigured.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// A step read a state key that no earlier step produced.
    #[error("State key \"{key}\" is not present")]
    MissingState {
        /// The missing key.
        key: String,
    },

    /// A function body asked for an argument it was not given.
    #[error("Argument \"{name}\" was not supplied")]
    MissingArgument {
        /// Argument name.
        name: String,
    },

    /// An argument held a value of a different type than requested.
    #[error("Argument \"{name}\" is not a `{expected}`")]
    Downcast {
        /// Argument name.
        name: String,
        /// Requested type.
        expected: &'static str,
    },

    /// The blocking executor reached an async step.
    #[error("Function \"{function}\" is async and cannot run on the blocking executor")]
    AsyncStepInSyncRunner {
        /// Function name.
        function: String,
    },

    /// A handler or component body failed.
    #[error("Handler error: {0}")]
    Handler(#[source] anyhow::Error),
}

impl Error {
    /// Wraps an arbitrary failure raised inside a function body.
    #[must_use]
    pub fn handler(err: impl Into<anyhow::Error>) -> Self {
        Self::Handler(err.into())
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::MissingState { .. }
            | Self::MissingArgument { .. }
            | Self::Downcast { .. }
            | Self::AsyncStepInSyncRunner { .. }
            | Self::Handler(_) => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns the field errors if this is a validation failure.
    #[must_use]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Returns `true` for configuration errors.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_status_codes() {
        assert_eq!(
            ErrorCategory::Validation.default_status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCategory::Configuration.default_status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCategory::Internal.default_status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_no_component_message() {
        let err = ConfigurationError::NoComponent {
            parameter: "db".to_string(),
            function: "list_users".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No component able to handle parameter \"db\" on function \"list_users\"."
        );
    }

    #[test]
    fn test_async_not_allowed_message() {
        let err = ConfigurationError::AsyncNotAllowed {
            function: "fetch".to_string(),
        };
        assert_eq!(err.to_string(), "Function \"fetch\" may not be async.");
    }

    #[test]
    fn test_configuration_conversion() {
        let err: Error = ConfigurationError::AsyncNotAllowed {
            function: "fetch".to_string(),
        }
        .into();
        assert!(err.is_configuration());
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.validation_errors().is_none());
    }

    #[test]
    fn test_validation_conversion() {
        let err: Error = ValidationErrors::required("i").into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let errors = err.validation_errors().unwrap();
        assert_eq!(errors.get("i"), Some("The \"i\" field is required."));
    }

    #[test]
    fn test_handler_error() {
        let err = Error::handler(anyhow::anyhow!("database unavailable"));
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert!(err.to_string().contains("database unavailable"));
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&ErrorCategory::Configuration).unwrap();
        assert_eq!(json, "\"configuration\"");
    }
}
