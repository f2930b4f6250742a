//! JSON renderer: one template per topology plus a manifest.
//!
//! ```text
//! cdk.out/
//! ├── manifest.json
//! ├── AcmeBase.template.json
//! ├── AcmeData.template.json
//! └── AcmeWeb.template.json
//! ```
//!
//! Producers get an export for every attribute another topology imports.
//! Same-region imports are published as stack outputs; cross-region imports
//! are written to parameters in the consumer's region by a writer resource.

use std::collections::BTreeMap;

use serde_json::{Map, Value as Json, json};
use tracing::{debug, instrument};

use tierstack_core::{
    application::{
        ApplicationError,
        ports::{AssemblyRenderer, RenderMetadata},
    },
    domain::{ArtifactSet, CloudAssembly, Reference, RelativePath, Region, Topology},
    error::{Context, TierstackResult},
};

use super::intrinsics;

pub use tierstack_core::domain::MANIFEST_FILE;
pub const FORMAT_VERSION: &str = "2010-09-09";

pub fn template_file(topology: &str) -> String {
    format!("{topology}.template.json")
}

/// Renders a [`CloudAssembly`] as provisioning-engine JSON.
#[derive(Debug, Clone, Copy)]
pub struct JsonRenderer {
    pretty: bool,
}

impl JsonRenderer {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Single-line output.
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    fn encode(&self, json: &Json) -> TierstackResult<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(json)
        } else {
            serde_json::to_string(json)
        };
        text.context("encoding template")
    }
}

impl Default for JsonRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl AssemblyRenderer for JsonRenderer {
    #[instrument(skip_all, fields(assembly_id = %metadata.assembly_id))]
    fn render(
        &self,
        assembly: &CloudAssembly,
        metadata: &RenderMetadata,
    ) -> TierstackResult<ArtifactSet> {
        let exports = ExportPlan::collect(assembly);
        let mut artifacts = ArtifactSet::new();

        for topology in assembly.topologies() {
            let template = render_template(topology, &exports)?;
            let file = template_file(topology.name());
            debug!(file = %file, "Rendered template");
            artifacts.add(RelativePath::try_new(file)?, self.encode(&template)?);
        }

        let manifest = render_manifest(assembly, metadata);
        artifacts.add(
            RelativePath::try_new(MANIFEST_FILE)?,
            self.encode(&manifest)?,
        );
        Ok(artifacts)
    }
}

// ── Export planning ──────────────────────────────────────────────────────────

/// Every attribute each producer must publish, grouped by producer.
#[derive(Debug, Default)]
struct ExportPlan {
    /// producer → export key → reference
    outputs: BTreeMap<String, BTreeMap<String, Reference>>,
    /// producer → consumer region → parameter path → reference
    writers: BTreeMap<String, BTreeMap<Region, BTreeMap<String, Reference>>>,
}

impl ExportPlan {
    fn collect(assembly: &CloudAssembly) -> Self {
        let mut plan = Self::default();
        for consumer in assembly.topologies() {
            for reference in consumer.foreign_references() {
                let producer = reference.topology.clone();
                if reference.cross_region {
                    plan.writers
                        .entry(producer)
                        .or_default()
                        .entry(consumer.region().clone())
                        .or_default()
                        .insert(intrinsics::parameter_path(&reference), reference);
                } else {
                    plan.outputs
                        .entry(producer)
                        .or_default()
                        .insert(reference.export_key(), reference);
                }
            }
        }
        plan
    }
}

// ── Templates ────────────────────────────────────────────────────────────────

fn render_template(topology: &Topology, exports: &ExportPlan) -> TierstackResult<Json> {
    let name = topology.name();
    let mut resources = Map::new();

    for resource in topology.resources() {
        let declared = serde_json::to_value(&resource.spec).map_err(|e| {
            ApplicationError::RenderingFailed {
                reason: format!("{name}.{}: {e}", resource.id),
            }
        })?;
        let mut entry = intrinsics::resolve(declared, name);
        if resource.retain_on_teardown {
            if let Json::Object(map) = &mut entry {
                map.insert("DeletionPolicy".into(), json!("Retain"));
                map.insert("UpdateReplacePolicy".into(), json!("Retain"));
            }
        }
        resources.insert(resource.id.to_string(), entry);
    }

    if let Some(by_region) = exports.writers.get(name) {
        for (region, entries) in by_region {
            let values: Map<String, Json> = entries
                .iter()
                .map(|(path, r)| (path.clone(), intrinsics::local(r)))
                .collect();
            resources.insert(
                format!("ExportsWriter{}", intrinsics::alphanumeric(region.as_str())),
                json!({
                    "Type": "Custom::CrossRegionExportWriter",
                    "Properties": { "Region": region.as_str(), "Exports": values },
                }),
            );
        }
    }

    let mut outputs = Map::new();
    for record in topology.outputs() {
        let mut output = json!({ "Value": intrinsics::value(&record.value, name) });
        if let Some(export) = &record.export_name {
            output["Export"] = json!({ "Name": export });
        }
        outputs.insert(record.id.clone(), output);
    }
    if let Some(published) = exports.outputs.get(name) {
        for (key, reference) in published {
            outputs.insert(
                intrinsics::export_output_name(reference),
                json!({ "Value": intrinsics::local(reference), "Export": { "Name": key } }),
            );
        }
    }

    let parameters: Map<String, Json> = topology
        .foreign_references()
        .iter()
        .filter(|r| r.cross_region)
        .map(|r| {
            (
                intrinsics::parameter_name(r),
                json!({
                    "Type": "AWS::SSM::Parameter::Value<String>",
                    "Default": intrinsics::parameter_path(r),
                }),
            )
        })
        .collect();

    let mut template = Map::new();
    template.insert("AWSTemplateFormatVersion".into(), json!(FORMAT_VERSION));
    template.insert(
        "Description".into(),
        json!(format!("{name} ({})", topology.region())),
    );
    if !parameters.is_empty() {
        template.insert("Parameters".into(), Json::Object(parameters));
    }
    template.insert("Resources".into(), Json::Object(resources));
    if !outputs.is_empty() {
        template.insert("Outputs".into(), Json::Object(outputs));
    }
    Ok(Json::Object(template))
}

fn render_manifest(assembly: &CloudAssembly, metadata: &RenderMetadata) -> Json {
    let artifacts: Map<String, Json> = assembly
        .topologies()
        .iter()
        .map(|t| {
            (
                t.name().to_string(),
                json!({
                    "type": "aws:cloudformation:stack",
                    "environment": format!("aws://unknown-account/{}", t.region()),
                    "properties": {
                        "templateFile": template_file(t.name()),
                        "crossRegionReferences": t.cross_region_references(),
                    },
                    "dependencies": t.dependencies(),
                }),
            )
        })
        .collect();

    json!({
        "version": metadata.tool_version,
        "assemblyId": metadata.assembly_id,
        "generatedAt": metadata.generated_at,
        "order": assembly.names(),
        "artifacts": artifacts,
    })
}
