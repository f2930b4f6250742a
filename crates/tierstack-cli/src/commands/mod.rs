//! Subcommand handlers.
//!
//! Each handler translates arguments into service calls and displays the
//! result. Wiring of the concrete adapters happens here.

pub mod completions;
pub mod init;
pub mod outputs;
pub mod synth;
pub mod validate;

use std::path::PathBuf;

use tierstack_adapters::{FileConfigSource, JsonRenderer, LocalArtifactSink};
use tierstack_core::{
    application::{ConfigSource, SynthService},
    domain::RawConfig,
    error::TierstackResult,
};

use crate::{cli::GlobalArgs, config::AppConfig};

const REGION_VARIABLES: [&str; 2] = ["AWS_REGION", "AWS_DEFAULT_REGION"];

/// Stack configuration path: `--stack-config`, else the configured default.
pub fn stack_config_path(global: &GlobalArgs, config: &AppConfig) -> PathBuf {
    global
        .stack_config
        .clone()
        .unwrap_or_else(|| config.stack_config.clone())
}

/// Fallback region for documents that name none.
///
/// Order: `--region`, `AWS_REGION`, `AWS_DEFAULT_REGION`, then the settings
/// file. The core default applies when all of them are absent.
pub fn resolve_region(
    flag: Option<&str>,
    configured: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    flag.map(str::to_string)
        .or_else(|| {
            REGION_VARIABLES
                .iter()
                .find_map(|name| lookup(name).filter(|v| !v.trim().is_empty()))
        })
        .or_else(|| configured.map(str::to_string))
}

/// Fills a missing `region` before the document reaches validation.
pub struct RegionFallback<S> {
    inner: S,
    region: Option<String>,
}

impl<S: ConfigSource> RegionFallback<S> {
    pub fn new(inner: S, region: Option<String>) -> Self {
        Self { inner, region }
    }
}

impl<S: ConfigSource> ConfigSource for RegionFallback<S> {
    fn load(&self) -> TierstackResult<RawConfig> {
        let mut raw = self.inner.load()?;
        if raw.region.is_none() {
            raw.region = self.region.clone();
        }
        Ok(raw)
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}

/// The production service: file source, JSON renderer, local disk.
pub fn synth_service(global: &GlobalArgs, config: &AppConfig) -> SynthService {
    let region = resolve_region(
        global.region.as_deref(),
        config.default_region.as_deref(),
        |name| std::env::var(name).ok(),
    );
    let source = RegionFallback::new(
        FileConfigSource::new(stack_config_path(global, config)),
        region,
    );

    SynthService::new(
        Box::new(source),
        Box::new(JsonRenderer::new()),
        Box::new(LocalArtifactSink::new()),
    )
}
