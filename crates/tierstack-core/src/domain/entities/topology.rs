use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::domain::entities::common::{Reference, ResourceId, Value};
use crate::domain::entities::resources::{Resource, attr};
use crate::domain::error::DomainError;
use crate::domain::value_objects::Region;

/// A named output record. Exported when `export_name` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    pub id: String,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_name: Option<String>,
}

impl OutputRecord {
    /// Output whose export name equals its id.
    pub fn exported(id: impl Into<String>, value: impl Into<Value>) -> Self {
        let id = id.into();
        Self {
            export_name: Some(id.clone()),
            id,
            value: value.into(),
        }
    }

    pub fn exported_as(
        id: impl Into<String>,
        export_name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            export_name: Some(export_name.into()),
        }
    }
}

// ── Topology ─────────────────────────────────────────────────────────────────

/// An independently deployable group of resource declarations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topology {
    name: String,
    region: Region,
    cross_region_references: bool,
    dependencies: Vec<String>,
    resources: Vec<Resource>,
    outputs: Vec<OutputRecord>,
}

impl Topology {
    pub fn new(name: impl Into<String>, region: Region) -> Self {
        Self {
            name: name.into(),
            region,
            cross_region_references: false,
            dependencies: Vec::new(),
            resources: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Allow this topology to consume or publish references across regions.
    pub fn with_cross_region_references(mut self) -> Self {
        self.cross_region_references = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn cross_region_references(&self) -> bool {
        self.cross_region_references
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn outputs(&self) -> &[OutputRecord] {
        &self.outputs
    }

    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id.as_str() == id)
    }

    pub fn output(&self, id: &str) -> Option<&OutputRecord> {
        self.outputs.iter().find(|o| o.id == id)
    }

    /// Reference to an attribute of one of this topology's resources.
    pub fn reference(&self, id: &ResourceId, attribute: &str) -> Reference {
        Reference::new(self.name.clone(), self.region.clone(), id.clone(), attribute)
    }

    /// Declare a resource and return a reference to its primary identifier.
    pub fn add(&mut self, resource: Resource) -> Result<Reference, DomainError> {
        if self.resources.iter().any(|r| r.id == resource.id) {
            return Err(DomainError::DuplicateResource {
                topology: self.name.clone(),
                id: resource.id.to_string(),
            });
        }
        let reference = self.reference(&resource.id, attr::REF);
        self.resources.push(resource);
        Ok(reference)
    }

    pub fn add_output(&mut self, output: OutputRecord) -> Result<(), DomainError> {
        if self.output(&output.id).is_some() {
            return Err(DomainError::DuplicateOutput {
                topology: self.name.clone(),
                id: output.id,
            });
        }
        self.outputs.push(output);
        Ok(())
    }

    /// Turn a reference produced elsewhere into a value usable here.
    ///
    /// Records the producer as a dependency and marks the reference as
    /// crossing regions when the producer lives in another region.
    pub fn import(&mut self, reference: &Reference) -> Value {
        let mut reference = reference.clone();
        if reference.topology != self.name {
            if !self.dependencies.contains(&reference.topology) {
                self.dependencies.push(reference.topology.clone());
            }
            reference.cross_region = reference.region != self.region;
        }
        Value::Ref(reference)
    }

    /// All references embedded in resources and outputs.
    pub fn references(&self) -> Vec<Reference> {
        let mut found = Vec::new();
        for resource in &self.resources {
            if let Ok(json) = serde_json::to_value(&resource.spec) {
                Value::scan(&json, &mut found);
            }
        }
        for output in &self.outputs {
            found.extend(output.value.references().into_iter().cloned());
        }
        found
    }

    /// References to resources owned by other topologies.
    pub fn foreign_references(&self) -> Vec<Reference> {
        self.references()
            .into_iter()
            .filter(|r| r.topology != self.name)
            .collect()
    }

    /// Check internal consistency.
    ///
    /// - resource and output ids are unique
    /// - local references point at declared resources
    /// - foreign references come from declared dependencies and are marked
    ///   when they cross regions
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut ids = HashSet::new();
        for resource in &self.resources {
            if !ids.insert(resource.id.as_str()) {
                return Err(DomainError::DuplicateResource {
                    topology: self.name.clone(),
                    id: resource.id.to_string(),
                });
            }
        }

        let mut output_ids = HashSet::new();
        for output in &self.outputs {
            if !output_ids.insert(output.id.as_str()) {
                return Err(DomainError::DuplicateOutput {
                    topology: self.name.clone(),
                    id: output.id.clone(),
                });
            }
        }

        for reference in self.references() {
            if reference.topology == self.name {
                if !ids.contains(reference.resource.as_str()) {
                    return Err(DomainError::UnknownResource {
                        topology: self.name.clone(),
                        id: reference.resource.to_string(),
                    });
                }
                continue;
            }

            if !self.dependencies.contains(&reference.topology) {
                return Err(DomainError::UnresolvedDependency {
                    consumer: self.name.clone(),
                    producer: reference.topology.clone(),
                });
            }

            let crosses = reference.region != self.region;
            if crosses && !(reference.cross_region && self.cross_region_references) {
                return Err(DomainError::UnmarkedCrossRegionReference {
                    consumer: self.name.clone(),
                    reference: reference.to_string(),
                });
            }
        }

        Ok(())
    }
}

// ── CloudAssembly ────────────────────────────────────────────────────────────

/// Ordered set of topologies forming one deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudAssembly {
    topologies: Vec<Topology>,
}

impl CloudAssembly {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, topology: Topology) {
        self.topologies.push(topology);
    }

    pub fn topologies(&self) -> &[Topology] {
        &self.topologies
    }

    pub fn topology(&self, name: &str) -> Option<&Topology> {
        self.topologies.iter().find(|t| t.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.topologies.iter().map(|t| t.name()).collect()
    }

    /// Every output, paired with the topology that emits it.
    pub fn outputs(&self) -> impl Iterator<Item = (&Topology, &OutputRecord)> {
        self.topologies
            .iter()
            .flat_map(|t| t.outputs.iter().map(move |o| (t, o)))
    }

    /// First output with the given id, across all topologies.
    pub fn output(&self, id: &str) -> Option<&OutputRecord> {
        self.outputs().map(|(_, o)| o).find(|o| o.id == id)
    }

    pub fn export(&self, name: &str) -> Option<&OutputRecord> {
        self.outputs()
            .map(|(_, o)| o)
            .find(|o| o.export_name.as_deref() == Some(name))
    }

    pub fn resource_count(&self) -> usize {
        self.topologies.iter().map(|t| t.resources.len()).sum()
    }

    /// Whole-deployment consistency check.
    ///
    /// On top of each topology's own validation: names are unique, export
    /// names are unique across the deployment, every topology comes after
    /// the topologies it imports from, and imported resources exist.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen: HashMap<&str, &Topology> = HashMap::new();
        let mut exports = BTreeSet::new();

        for topology in &self.topologies {
            topology.validate()?;

            for dependency in &topology.dependencies {
                if !seen.contains_key(dependency.as_str()) {
                    return Err(DomainError::UnresolvedDependency {
                        consumer: topology.name.clone(),
                        producer: dependency.clone(),
                    });
                }
            }

            for reference in topology.foreign_references() {
                let declared = seen
                    .get(reference.topology.as_str())
                    .is_some_and(|p| p.resource(reference.resource.as_str()).is_some());
                if !declared {
                    return Err(DomainError::UnknownResource {
                        topology: reference.topology.clone(),
                        id: reference.resource.to_string(),
                    });
                }
            }

            for name in topology.outputs.iter().filter_map(|o| o.export_name.as_ref()) {
                if !exports.insert(name.as_str()) {
                    return Err(DomainError::DuplicateExport { name: name.clone() });
                }
            }

            if seen.insert(topology.name.as_str(), topology).is_some() {
                return Err(DomainError::DuplicateTopology {
                    name: topology.name.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::resources::{HostedZoneSpec, RepositorySpec};

    fn region(name: &str) -> Region {
        Region::parse("region", name).unwrap()
    }

    fn id(s: &str) -> ResourceId {
        ResourceId::new(s).unwrap()
    }

    fn producer() -> (Topology, Reference) {
        let mut base = Topology::new("AcmeBase", region("eu-west-2"));
        let zone = base
            .add(Resource::new(
                id("Zone"),
                HostedZoneSpec {
                    name: "example.com".into(),
                },
            ))
            .unwrap();
        (base, zone)
    }

    #[test]
    fn duplicate_resource_is_rejected() {
        let (mut base, _) = producer();
        let err = base
            .add(Resource::new(
                id("Zone"),
                RepositorySpec {
                    image_scan_on_push: false,
                },
            ))
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateResource { .. }));
    }

    #[test]
    fn import_records_dependency_once() {
        let (_, zone) = producer();
        let mut web = Topology::new("AcmeWeb", region("eu-west-2"));
        web.import(&zone);
        web.import(&zone);
        assert_eq!(web.dependencies(), &["AcmeBase".to_string()]);
    }

    #[test]
    fn cross_region_import_is_marked() {
        let (_, zone) = producer();
        let mut cert = Topology::new("AcmeCert", Region::cdn_home());
        let value = cert.import(&zone);

        match value {
            Value::Ref(r) => assert!(r.cross_region),
            other => panic!("expected reference, got {other:?}"),
        }
    }

    #[test]
    fn unmarked_cross_region_output_fails_validation() {
        let (_, zone) = producer();
        let mut cert = Topology::new("AcmeCert", Region::cdn_home());
        let value = cert.import(&zone);
        cert.add_output(OutputRecord::exported("ZoneId", value)).unwrap();

        assert!(matches!(
            cert.validate(),
            Err(DomainError::UnmarkedCrossRegionReference { .. })
        ));

        let mut cert = Topology::new("AcmeCert", Region::cdn_home()).with_cross_region_references();
        let value = cert.import(&zone);
        cert.add_output(OutputRecord::exported("ZoneId", value)).unwrap();
        assert!(cert.validate().is_ok());
    }

    #[test]
    fn raw_foreign_reference_is_unresolved() {
        let (_, zone) = producer();
        let mut web = Topology::new("AcmeWeb", region("eu-west-2"));
        web.add_output(OutputRecord::exported("Zone", zone)).unwrap();
        assert!(matches!(
            web.validate(),
            Err(DomainError::UnresolvedDependency { .. })
        ));
    }

    #[test]
    fn local_reference_must_exist() {
        let mut base = Topology::new("AcmeBase", region("eu-west-2"));
        let dangling = base.reference(&id("Missing"), attr::ARN);
        base.add_output(OutputRecord::exported("Missing", dangling))
            .unwrap();
        assert!(matches!(
            base.validate(),
            Err(DomainError::UnknownResource { .. })
        ));
    }

    #[test]
    fn assembly_enforces_order_and_unique_exports() {
        let (mut base, zone) = producer();
        base.add_output(OutputRecord::exported("OutputZone", zone.clone()))
            .unwrap();

        let mut web = Topology::new("AcmeWeb", region("eu-west-2"));
        let value = web.import(&zone);
        web.add_output(OutputRecord::exported("OutputZone", value))
            .unwrap();

        let mut out_of_order = CloudAssembly::new();
        out_of_order.push(web.clone());
        out_of_order.push(base.clone());
        assert!(matches!(
            out_of_order.validate(),
            Err(DomainError::UnresolvedDependency { .. })
        ));

        let mut duplicated = CloudAssembly::new();
        duplicated.push(base);
        duplicated.push(web);
        assert!(matches!(
            duplicated.validate(),
            Err(DomainError::DuplicateExport { name }) if name == "OutputZone"
        ));
    }

    #[test]
    fn assembly_rejects_duplicate_names() {
        let (base, _) = producer();
        let mut assembly = CloudAssembly::new();
        assembly.push(base.clone());
        assembly.push(base);
        assert!(matches!(
            assembly.validate(),
            Err(DomainError::DuplicateTopology { .. })
        ));
    }
}
