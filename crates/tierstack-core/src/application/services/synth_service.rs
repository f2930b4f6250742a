//! Synth Service - main application orchestrator.
//!
//! This service coordinates the whole synthesis workflow:
//! 1. Load and validate the stack configuration
//! 2. Assemble the topologies
//! 3. Render the assembly
//! 4. Write the artifacts, rolling back on failure

use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    VERSION,
    application::{
        ApplicationError, Deployment, TopologyAssembler,
        ports::{ArtifactSink, AssemblyRenderer, ConfigSource, RenderMetadata},
    },
    domain::{ArtifactSet, DomainValidator as validator, MANIFEST_FILE, ValidatedConfig},
    error::TierstackResult,
};

/// Where and how to write a synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthRequest {
    pub out_dir: PathBuf,
    /// Replace an existing output directory.
    pub force: bool,
    /// Render but do not write.
    pub dry_run: bool,
}

impl SynthRequest {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            force: false,
            dry_run: false,
        }
    }
}

/// Summary of a synthesis, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthReport {
    pub assembly_id: String,
    pub out_dir: PathBuf,
    pub topologies: Vec<String>,
    pub resources: usize,
    pub files: Vec<String>,
    pub bytes: usize,
    pub written: bool,
}

/// Main synthesis service.
pub struct SynthService {
    source: Box<dyn ConfigSource>,
    renderer: Box<dyn AssemblyRenderer>,
    sink: Box<dyn ArtifactSink>,
}

impl SynthService {
    pub fn new(
        source: Box<dyn ConfigSource>,
        renderer: Box<dyn AssemblyRenderer>,
        sink: Box<dyn ArtifactSink>,
    ) -> Self {
        Self {
            source,
            renderer,
            sink,
        }
    }

    /// Load the configuration and apply every validation and default.
    #[instrument(skip_all, fields(source = %self.source.describe()))]
    pub fn load_config(&self) -> TierstackResult<ValidatedConfig> {
        let raw = self.source.load()?;
        let config = validator::validate_config(&raw)?;
        info!(prefix = %config.scope.name_prefix, "Configuration valid");
        Ok(config)
    }

    /// Validate and assemble without rendering.
    pub fn plan(&self) -> TierstackResult<Deployment> {
        let config = self.load_config()?;
        TopologyAssembler::assemble(&config)
    }

    #[instrument(
        skip_all,
        fields(
            out = %request.out_dir.display(),
            force = request.force,
            dry_run = request.dry_run
        )
    )]
    pub fn synth(&self, request: &SynthRequest) -> TierstackResult<SynthReport> {
        let deployment = self.plan()?;

        let metadata = RenderMetadata {
            assembly_id: Uuid::new_v4().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            tool_version: VERSION.to_string(),
        };
        let artifacts = self.renderer.render(&deployment.assembly, &metadata)?;
        artifacts.validate()?;
        info!(
            files = artifacts.len(),
            bytes = artifacts.total_bytes(),
            "Assembly rendered"
        );

        let mut report = SynthReport {
            assembly_id: metadata.assembly_id,
            out_dir: request.out_dir.clone(),
            topologies: deployment
                .assembly
                .names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            resources: deployment.assembly.resource_count(),
            files: artifacts.iter().map(|a| a.path.to_string()).collect(),
            bytes: artifacts.total_bytes(),
            written: false,
        };

        if request.dry_run {
            info!("Dry run, nothing written");
            return Ok(report);
        }

        self.write_artifacts(&request.out_dir, &artifacts, request.force)?;
        report.written = true;
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    /// Write artifacts under `root` with rollback on failure.
    fn write_artifacts(
        &self,
        root: &Path,
        artifacts: &ArtifactSet,
        force: bool,
    ) -> TierstackResult<()> {
        if self.sink.exists(root) {
            if !force {
                return Err(ApplicationError::OutputExists {
                    path: root.to_path_buf(),
                }
                .into());
            }
            self.check_replaceable(root)?;
            warn!(path = %root.display(), "Replacing existing output directory");
            self.sink.remove_dir_all(root)?;
        }

        match self.write_all(root, artifacts) {
            Ok(()) => {
                info!("Successfully wrote all artifacts");
                Ok(())
            }
            Err(e) => {
                warn!("Write failed, attempting rollback");
                self.rollback(root);
                Err(e)
            }
        }
    }

    /// Only a previous assembly that does not hold the working directory
    /// may be removed.
    fn check_replaceable(&self, root: &Path) -> TierstackResult<()> {
        let refuse = |reason: &str| -> TierstackResult<()> {
            Err(ApplicationError::ReplaceRefused {
                path: root.to_path_buf(),
                reason: reason.to_string(),
            }
            .into())
        };

        if contains_working_dir(root) {
            return refuse("it contains the current directory");
        }
        if !self.sink.exists(&root.join(MANIFEST_FILE)) {
            return refuse("it does not hold a previous assembly");
        }
        Ok(())
    }

    fn write_all(&self, root: &Path, artifacts: &ArtifactSet) -> TierstackResult<()> {
        self.sink.create_dir_all(root)?;

        for artifact in artifacts.iter() {
            let path = root.join(artifact.path.as_path());
            if let Some(parent) = path.parent() {
                self.sink.create_dir_all(parent)?;
            }
            debug!(path = %path.display(), "Writing artifact");
            self.sink.write_file(&path, &artifact.content)?;
        }

        Ok(())
    }

    /// Best-effort rollback on failure.
    fn rollback(&self, root: &Path) {
        if let Err(e) = self.sink.remove_dir_all(root) {
            warn!(
                error = %e,
                path = %root.display(),
                "Rollback failed"
            );
        } else {
            info!("Rollback successful");
        }
    }
}

/// `root` is the working directory or one of its ancestors.
fn contains_working_dir(root: &Path) -> bool {
    if !root.components().any(|c| matches!(c, Component::Normal(_))) {
        return true;
    }
    match (std::env::current_dir(), root.canonicalize()) {
        (Ok(cwd), Ok(root)) => cwd.starts_with(root),
        _ => false,
    }
}
