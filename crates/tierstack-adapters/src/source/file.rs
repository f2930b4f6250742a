//! Stack configuration read from a JSON or TOML document.
//!
//! The format follows the file extension: `.toml` is parsed as TOML,
//! anything else as JSON. Keys are camelCase in both formats:
//!
//! ```toml
//! namePrefix = "Acme"
//! dnsDomain = "example.com"
//! dbEngine = "postgresql"
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument};

use tierstack_core::{
    application::{ApplicationError, ports::ConfigSource},
    domain::{ConfigError, RawConfig},
    error::TierstackResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }

    /// Parse a document in this format.
    pub fn parse(self, text: &str) -> Result<RawConfig, ConfigError> {
        match self {
            Self::Json => {
                serde_json::from_str(text).map_err(|e| ConfigError::Malformed(e.to_string()))
            }
            Self::Toml => toml::from_str(text).map_err(|e| ConfigError::Malformed(e.to_string())),
        }
    }
}

/// Reads the configuration from disk on every `load`.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ConfigFormat {
        ConfigFormat::from_path(&self.path)
    }
}

impl ConfigSource for FileConfigSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> TierstackResult<RawConfig> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ApplicationError::SourceNotFound {
                path: self.path.clone(),
            },
            _ => ApplicationError::SourceFailed {
                source_name: self.path.display().to_string(),
                reason: e.to_string(),
            },
        })?;

        let format = self.format();
        debug!(?format, bytes = text.len(), "Parsing configuration");
        Ok(format.parse(&text)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tierstack_core::{domain::DomainError, error::TierstackError};

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reads_json_document() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "stack.config.json",
            r#"{"namePrefix": "Acme", "dnsDomain": "example.com", "dbReplicaInstances": 2}"#,
        );

        let raw = FileConfigSource::new(path).load().unwrap();
        assert_eq!(raw.name_prefix.as_deref(), Some("Acme"));
        assert_eq!(raw.db_replica_instances, Some(2));
        assert!(raw.db_engine.is_none());
    }

    #[test]
    fn reads_toml_document() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "stack.toml",
            "namePrefix = \"Acme\"\ndbIngressSources = [\"10.0.0.0/8\"]\nsesEmailEnabled = true\n",
        );

        let source = FileConfigSource::new(path);
        assert_eq!(source.format(), ConfigFormat::Toml);
        let raw = source.load().unwrap();
        assert_eq!(raw.db_ingress_sources, Some(vec!["10.0.0.0/8".to_string()]));
        assert_eq!(raw.ses_email_enabled, Some(true));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = FileConfigSource::new(dir.path().join("absent.json"))
            .load()
            .unwrap_err();
        assert!(matches!(
            err,
            TierstackError::Application(ApplicationError::SourceNotFound { .. })
        ));
    }

    #[test]
    fn malformed_document_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "broken.json", "{ namePrefix: ");
        let err = FileConfigSource::new(path).load().unwrap_err();
        assert!(matches!(
            err,
            TierstackError::Domain(DomainError::Config(ConfigError::Malformed(_)))
        ));
        assert!(err.is_config_error());
    }

    #[test]
    fn wrong_value_type_is_malformed() {
        let err = ConfigFormat::Json
            .parse(r#"{"maxAzs": "three"}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)));
    }
}
