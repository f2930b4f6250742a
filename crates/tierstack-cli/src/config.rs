//! CLI settings.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns these settings; the core crate never sees them.  They are
//! distinct from the stack configuration document, which goes through the
//! core validator.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `TIERSTACK_*` environment variables (`.env` included)
//! 3. Settings file (`--config`, or `config.toml` in the platform config dir)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use tierstack_adapters::sample::DEFAULT_CONFIG_FILE;

pub const DEFAULT_OUT_DIR: &str = "cdk.out";
const ENV_PREFIX: &str = "TIERSTACK";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Stack configuration document read when `--stack-config` is absent.
    pub stack_config: PathBuf,
    /// Where `synth` writes when `--out` is absent.
    pub out_dir: PathBuf,
    /// Region for documents that name none, after `--region` and the
    /// `AWS_REGION` / `AWS_DEFAULT_REGION` variables.
    pub default_region: Option<String>,
    pub no_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stack_config: PathBuf::from(DEFAULT_CONFIG_FILE),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            default_region: None,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load settings from defaults, the settings file and the environment.
    ///
    /// An explicit `config_file` must exist; the platform default is optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        Self::load_from(&path, required)
    }

    fn load_from(path: &Path, required: bool) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("stack_config", defaults.stack_config.display().to_string())?
            .set_default("out_dir", defaults.out_dir.display().to_string())?
            .set_default("no_color", defaults.no_color)?
            .add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(required),
            )
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        settings
            .try_deserialize()
            .context("Settings have an unexpected shape")
    }

    /// Path to the default settings file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.tierstack.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "tierstack", "tierstack")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".tierstack.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_point_at_sample_locations() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.stack_config, PathBuf::from("stack.config.json"));
        assert_eq!(cfg.out_dir, PathBuf::from("cdk.out"));
        assert!(cfg.default_region.is_none());
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            "out_dir = \"build/templates\"\ndefault_region = \"eu-west-2\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.out_dir, PathBuf::from("build/templates"));
        assert_eq!(cfg.default_region.as_deref(), Some("eu-west-2"));
        assert_eq!(cfg.stack_config, PathBuf::from("stack.config.json"));
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn default_file_is_optional() {
        let dir = TempDir::new().unwrap();
        let cfg = AppConfig::load_from(&dir.path().join("none.toml"), false).unwrap();
        assert!(!cfg.no_color);
    }

    #[test]
    fn malformed_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "out_dir = [").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn config_path_is_not_empty() {
        assert!(!AppConfig::config_path().as_os_str().is_empty());
    }
}
