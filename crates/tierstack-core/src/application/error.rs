//! Application layer errors.
//!
//! These errors represent failures in orchestration, not declaration rules.
//! Rule violations are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::MANIFEST_FILE;
use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// The configuration source could not be read.
    #[error("Could not read configuration from {source_name}: {reason}")]
    SourceFailed { source_name: String, reason: String },

    /// The configuration source does not exist.
    #[error("Configuration not found at {path}")]
    SourceNotFound { path: PathBuf },

    /// Rendering the assembly failed.
    #[error("Rendering failed: {reason}")]
    RenderingFailed { reason: String },

    /// Writing artifacts failed.
    #[error("Artifact sink error at {path}: {reason}")]
    SinkError { path: PathBuf, reason: String },

    /// Output directory already present.
    #[error("Output already exists at {path}")]
    OutputExists { path: PathBuf },

    /// `--force` was asked to replace a directory it must not delete.
    #[error("Refusing to replace {path}: {reason}")]
    ReplaceRefused { path: PathBuf, reason: String },

    /// Rollback failed (best-effort cleanup failed).
    #[error("Rollback failed for {path}: {reason}")]
    RollbackFailed { path: PathBuf, reason: String },

    /// A shared in-memory adapter was poisoned by a panicking writer.
    #[error("Adapter state lock poisoned")]
    LockPoisoned,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::SourceFailed { source_name, .. } => vec![
                format!("Check that {source_name} is readable"),
                "JSON and TOML documents are accepted".into(),
            ],
            Self::SourceNotFound { path } => vec![
                format!("No configuration at: {}", path.display()),
                "Create one with: tierstack init".into(),
                "Or point at another file with --stack-config".into(),
            ],
            Self::SinkError { path, .. } => vec![
                format!("Failed to write: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::OutputExists { path } => vec![
                format!("Directory already exists: {}", path.display()),
                "Use --force to replace it (destructive)".into(),
                "Or choose another directory with --out".into(),
            ],
            Self::ReplaceRefused { .. } => vec![
                format!("Only a directory holding a previous {MANIFEST_FILE} is replaced"),
                "Choose a dedicated output directory with --out".into(),
            ],
            Self::LockPoisoned => vec!["Try again; a previous write panicked".into()],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SourceNotFound { .. } => ErrorCategory::NotFound,
            Self::SourceFailed { .. } => ErrorCategory::Configuration,
            Self::OutputExists { .. } | Self::ReplaceRefused { .. } => ErrorCategory::Validation,
            Self::RenderingFailed { .. }
            | Self::SinkError { .. }
            | Self::RollbackFailed { .. }
            | Self::LockPoisoned => ErrorCategory::Internal,
        }
    }
}
