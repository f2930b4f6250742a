//! `tierstack init` - write a sample stack configuration.

use std::path::Path;

use tracing::{debug, instrument};

use tierstack_adapters::{
    sample::{parse_sample, sample_config},
    source::ConfigFormat,
};
use tierstack_core::domain::{DomainValidator, RawConfig};

use crate::{
    cli::{GlobalArgs, InitArgs},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

#[instrument(skip_all, fields(prefix = %args.prefix))]
pub fn execute(
    args: InitArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let path = args
        .path
        .clone()
        .unwrap_or_else(|| super::stack_config_path(&global, &config));

    if path.exists() && !args.force {
        return Err(CliError::FileExists { path });
    }
    if path.exists() {
        output.warning(&format!("Overwriting {}", path.display()))?;
    }

    let document = render_sample(&args.prefix, &path)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_cli_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    std::fs::write(&path, document)
        .with_cli_context(|| format!("Failed to write '{}'", path.display()))?;
    debug!(path = %path.display(), "Sample written");

    output.success(&format!("Stack configuration created at {}", path.display()))?;
    if !output.is_quiet() {
        output.print("")?;
        output.print("Next steps:")?;
        output.print("  set dnsDomain to a zone you control")?;
        output.print("  tierstack validate")?;
        output.print("  tierstack synth")?;
    }

    Ok(())
}

/// The sample for `prefix`, validated, in the format `path` implies.
fn render_sample(prefix: &str, path: &Path) -> CliResult<String> {
    let json = sample_config(prefix);
    let raw = parse_sample(&json).map_err(|e| CliError::InvalidInput {
        message: format!("prefix '{prefix}' does not produce a valid document: {e}"),
    })?;
    DomainValidator::validate_config(&raw).map_err(|e| CliError::InvalidInput {
        message: format!("prefix '{prefix}': {e}"),
    })?;

    match ConfigFormat::from_path(path) {
        ConfigFormat::Json => Ok(json),
        ConfigFormat::Toml => to_toml(&raw),
    }
}

fn to_toml(raw: &RawConfig) -> CliResult<String> {
    toml::to_string_pretty(raw).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise sample as TOML: {e}"),
        source: Some(Box::new(e)),
    })
}
