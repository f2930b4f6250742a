//! Unified error handling for tierstack core.
//!
//! Wraps domain and application errors behind one type with a category
//! for display and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{ConfigError, DomainError};

/// Root error type for tierstack core operations.
#[derive(Debug, Error, Clone)]
pub enum TierstackError {
    /// Errors from the domain layer (invalid configuration, broken wiring).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration failures).
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl From<ConfigError> for TierstackError {
    fn from(e: ConfigError) -> Self {
        Self::Domain(e.into())
    }
}

impl TierstackError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {message}"),
                "Check your setup and try again".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in tierstack".into(),
                "Please report this issue at: https://github.com/cosecruz/tierstack/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Configuration => ErrorCategory::Configuration,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// True when the failure came from the stack configuration document.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Domain(
                DomainError::Config(_)
                    | DomainError::UnsupportedEngine { .. }
                    | DomainError::NoDomainConfigured
            )
        )
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type TierstackResult<T> = Result<T, TierstackError>;

/// Extension trait for adding context to errors.
pub trait Context<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> TierstackResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> TierstackResult<T> {
        self.map_err(|e| TierstackError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn config_errors_are_categorised_as_configuration() {
        let err: TierstackError = ConfigError::MissingRequiredField { field: "dnsDomain" }.into();
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.is_config_error());
        assert!(err.suggestions().iter().any(|s| s.contains("dnsDomain")));
    }

    #[test]
    fn existing_output_is_a_validation_error() {
        let err: TierstackError = ApplicationError::OutputExists {
            path: PathBuf::from("cdk.out"),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(!err.is_config_error());
    }

    #[test]
    fn context_wraps_foreign_errors_as_internal() {
        let parsed: Result<u32, _> = "x".parse::<u32>();
        let err = parsed.context("parsing port").unwrap_err();
        assert!(matches!(err, TierstackError::Internal { ref message } if message.starts_with("parsing port")));
    }
}
