// ============================================================================
// domain/error.rs - DOMAIN ERROR TAXONOMY
// ============================================================================

use thiserror::Error;

/// Invalid or missing configuration.
///
/// Always fatal: raised before any topology is declared.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("required configuration key missing: {field}")]
    MissingRequiredField { field: &'static str },

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("configuration document could not be parsed: {0}")]
    Malformed(String),
}

/// Root domain error type.
///
/// All errors are:
/// - Cloneable
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Configuration
    // ========================================================================
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unsupported database engine '{engine}' (expected mysql or postgresql)")]
    UnsupportedEngine { engine: String },

    #[error("certificate requested but neither dnsDomainHost nor dnsDomainEnableRoot is set")]
    NoDomainConfigured,

    // ========================================================================
    // Declaration model violations
    // ========================================================================
    #[error("invalid resource identifier '{value}': {reason}")]
    InvalidIdentifier { value: String, reason: String },

    #[error("topology '{topology}' references undeclared resource '{id}'")]
    UnknownResource { topology: String, id: String },

    #[error("duplicate resource '{id}' in topology '{topology}'")]
    DuplicateResource { topology: String, id: String },

    #[error("duplicate output '{id}' in topology '{topology}'")]
    DuplicateOutput { topology: String, id: String },

    #[error("duplicate output export name '{name}'")]
    DuplicateExport { name: String },

    #[error("duplicate topology name '{name}'")]
    DuplicateTopology { name: String },

    #[error("topology '{consumer}' references '{producer}', which is not declared before it")]
    UnresolvedDependency { consumer: String, producer: String },

    #[error("topology '{consumer}' uses {reference} across regions without marking it")]
    UnmarkedCrossRegionReference { consumer: String, reference: String },

    #[error("artifact path '{path}' must be relative and stay inside the output directory")]
    InvalidArtifactPath { path: String },

    #[error("artifact '{path}' is produced twice")]
    DuplicateArtifact { path: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(ConfigError::MissingRequiredField { field }) => vec![
                format!("Add '{field}' to your stack configuration"),
                "Required keys: namePrefix, dnsDomain, dbEngine".into(),
            ],
            Self::Config(ConfigError::InvalidValue { field, reason }) => vec![
                format!("Fix the value of '{field}': {reason}"),
                "Run: tierstack validate to check the configuration".into(),
            ],
            Self::Config(ConfigError::Malformed(msg)) => vec![
                "The configuration file is not valid JSON or TOML".into(),
                format!("Details: {msg}"),
            ],
            Self::UnsupportedEngine { engine } => vec![
                format!("'{engine}' is not a supported engine"),
                "Set dbEngine to one of:".into(),
                "  • mysql      - Aurora MySQL".into(),
                "  • postgresql - Aurora PostgreSQL".into(),
            ],
            Self::NoDomainConfigured => vec![
                "Set dnsDomainHost (e.g. \"www\") to serve www.<dnsDomain>".into(),
                "Or set dnsDomainEnableRoot to true to serve <dnsDomain>".into(),
            ],
            Self::DuplicateExport { name } => vec![
                format!("Export '{name}' is declared twice in this deployment"),
                "Export names must be unique across all topologies".into(),
            ],
            _ => vec!["This usually indicates a bug in topology wiring".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) | Self::UnsupportedEngine { .. } | Self::NoDomainConfigured => {
                ErrorCategory::Configuration
            }
            Self::InvalidIdentifier { .. }
            | Self::InvalidArtifactPath { .. }
            | Self::DuplicateArtifact { .. } => {
                ErrorCategory::Validation
            }
            _ => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Configuration,
    Internal,
}
