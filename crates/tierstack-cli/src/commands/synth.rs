//! Implementation of the `tierstack synth` command.
//!
//! Responsibility: resolve the output directory, confirm destructive
//! replacement, run the synth service and display the report.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument};

use tierstack_core::application::{SynthReport, SynthRequest};

use crate::{
    cli::{GlobalArgs, OutputFormat, SynthArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// JSON shape of a synth report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportView<'a> {
    assembly_id: &'a str,
    out_dir: String,
    topologies: &'a [String],
    resources: usize,
    files: &'a [String],
    bytes: usize,
    written: bool,
}

impl<'a> From<&'a SynthReport> for ReportView<'a> {
    fn from(report: &'a SynthReport) -> Self {
        Self {
            assembly_id: &report.assembly_id,
            out_dir: report.out_dir.display().to_string(),
            topologies: &report.topologies,
            resources: report.resources,
            files: &report.files,
            bytes: report.bytes,
            written: report.written,
        }
    }
}

#[instrument(skip_all, fields(force = args.force, dry_run = args.dry_run))]
pub fn execute(
    args: SynthArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let request = build_request(&args, &config);

    let replacing = request.force && !request.dry_run && request.out_dir.exists();
    if replacing && !args.yes && output.is_interactive() && !confirm_replace(&request.out_dir)? {
        return Err(CliError::Cancelled);
    }

    let service = super::synth_service(&global, &config);
    output.header(&format!(
        "Synthesizing into {}...",
        request.out_dir.display()
    ))?;

    let report = service.synth(&request)?;
    info!(assembly = %report.assembly_id, files = report.files.len(), "Synth finished");

    if output.format() == OutputFormat::Json {
        return output.json("synth report", &ReportView::from(&report));
    }

    if !report.written {
        output.info(&format!(
            "Dry run: would write {} files ({} bytes) to {}",
            report.files.len(),
            report.bytes,
            report.out_dir.display(),
        ))?;
    }
    for file in &report.files {
        output.print(&format!("  {file}"))?;
    }
    if report.written {
        output.success(&format!(
            "Synthesized {} topologies ({} resources) into {}",
            report.topologies.len(),
            report.resources,
            report.out_dir.display(),
        ))?;
    }

    Ok(())
}

fn build_request(args: &SynthArgs, config: &AppConfig) -> SynthRequest {
    let out_dir: PathBuf = args.out.clone().unwrap_or_else(|| config.out_dir.clone());
    let mut request = SynthRequest::new(out_dir);
    request.force = args.force;
    request.dry_run = args.dry_run;
    request
}

#[cfg(feature = "interactive")]
fn confirm_replace(path: &Path) -> CliResult<bool> {
    dialoguer::Confirm::new()
        .with_prompt(format!("Replace everything in {}?", path.display()))
        .default(false)
        .interact()
        .map_err(|e| CliError::IoError {
            message: "failed to read confirmation".into(),
            source: std::io::Error::other(e),
        })
}

/// `--force` alone is consent when no prompt is available.
#[cfg(not(feature = "interactive"))]
fn confirm_replace(_path: &Path) -> CliResult<bool> {
    Ok(true)
}
