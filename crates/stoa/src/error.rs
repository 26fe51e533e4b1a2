//! Errors raised while assembling an application.

use stoa_core::ConfigurationError;
use stoa_docs::DocsError;
use thiserror::Error;

/// A startup failure.
///
/// Request-time failures never surface as `AppError`; they are mapped to a
/// [`Response`](crate::Response) instead.
#[derive(Debug, Error)]
pub enum AppError {
    /// Routes, hooks or components are wired incorrectly.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The API document could not be produced.
    #[error(transparent)]
    Docs(#[from] DocsError),
}

impl AppError {
    /// Returns the configuration error, if this is one.
    pub fn as_configuration(&self) -> Option<&ConfigurationError> {
        match self {
            Self::Configuration(err) => Some(err),
            Self::Docs(err) => err.as_configuration(),
        }
    }
}

/// Result type for application assembly.
pub type AppResult<T> = Result<T, AppError>;
