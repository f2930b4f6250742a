//! Handles: read-only references one topology hands to the next.
//!
//! A handle is produced exactly once by the topology that owns the
//! resources behind it. Consumers hold it by shared reference and go through
//! `Topology::import` to use anything inside.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::config::DnsSettings;
use crate::domain::engines::EngineDef;
use crate::domain::entities::common::{Reference, ResourceId, Value};
use crate::domain::entities::resources::{
    Connection, LoadBalancedServiceSpec, PolicyStatement, Resource, VolumeMount, attr,
};
use crate::domain::entities::topology::Topology;
use crate::domain::error::DomainError;
use crate::domain::value_objects::SubnetType;

// ── Network ──────────────────────────────────────────────────────────────────

/// One subnet of the shared network.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetRef {
    /// Separator-free identifier, safe to embed in consumer resource ids.
    pub local_id: ResourceId,
    pub subnet_type: SubnetType,
    pub subnet: Reference,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneHandle {
    pub zone: Reference,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkHandle {
    pub vpc: Reference,
    pub subnets: Vec<SubnetRef>,
    pub repository_uri: Reference,
    pub zone: ZoneHandle,
}

impl NetworkHandle {
    pub fn subnets_of(&self, subnet_type: SubnetType) -> impl Iterator<Item = &SubnetRef> {
        self.subnets
            .iter()
            .filter(move |s| s.subnet_type == subnet_type)
    }

    pub fn private_subnets(&self) -> Vec<&SubnetRef> {
        self.subnets_of(SubnetType::Private).collect()
    }
}

// ── Credentials & storage ────────────────────────────────────────────────────

/// A generated secret. The secret value never appears in any declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialHandle {
    pub name: String,
    /// Resolves to the secret ARN.
    pub secret: Reference,
}

impl CredentialHandle {
    pub const RETRIEVE_ACTIONS: &'static [&'static str] = &["secretsmanager:GetSecretValue"];

    /// Policy statement letting `consumer` read this secret.
    pub fn retrieval_statement(&self, consumer: &mut Topology) -> PolicyStatement {
        PolicyStatement::allow(Self::RETRIEVE_ACTIONS, vec![consumer.import(&self.secret)])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesystemHandle {
    pub file_system: Reference,
    pub security_group: Reference,
    pub port: u16,
}

impl FilesystemHandle {
    pub const NFS_PORT: u16 = 2049;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHandle {
    pub cluster: Reference,
    pub cluster_endpoint: Reference,
    pub instance_endpoints: Vec<Reference>,
    pub security_group: Reference,
    pub credentials: CredentialHandle,
    pub filesystem: FilesystemHandle,
    #[serde(skip)]
    pub engine: EngineDef,
}

impl DatabaseHandle {
    pub fn port(&self) -> u16 {
        self.engine.port
    }
}

// ── Certificate ──────────────────────────────────────────────────────────────

/// Names served through the CDN: primary first, optional alternate second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainList {
    pub primary: String,
    pub alternate: Option<String>,
}

impl DomainList {
    /// `host.domain` when a host is set, plus `domain` when the root is
    /// enabled. With only the root enabled the root becomes primary.
    pub fn from_dns(dns: &DnsSettings) -> Result<Self, DomainError> {
        let root = dns.enable_root.then(|| dns.domain.clone());
        match (&dns.host, root) {
            (Some(host), alternate) => Ok(Self {
                primary: format!("{host}.{}", dns.domain),
                alternate,
            }),
            (None, Some(root)) => Ok(Self {
                primary: root,
                alternate: None,
            }),
            (None, None) => Err(DomainError::NoDomainConfigured),
        }
    }

    pub fn to_vec(&self) -> Vec<String> {
        std::iter::once(self.primary.clone())
            .chain(self.alternate.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        1 + usize::from(self.alternate.is_some())
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateHandle {
    pub certificate: Reference,
    pub domains: DomainList,
}

// ── Runtime ──────────────────────────────────────────────────────────────────

/// The web tier's application service while it is being wired.
///
/// Permissions, volumes, connections and environment entries are attached
/// one by one; [`RuntimeHandle::finalize`] declares the service resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeHandle {
    pub service_id: ResourceId,
    pub service: Reference,
    pub cluster: Reference,
    pub load_balancer_dns: Reference,
    pub task_role: Reference,
    pub service_security_group: Reference,
    spec: LoadBalancedServiceSpec,
    finalized: bool,
}

impl RuntimeHandle {
    pub fn new(
        topology: &Topology,
        service_id: ResourceId,
        spec: LoadBalancedServiceSpec,
        cluster: Reference,
    ) -> Self {
        Self {
            service: topology.reference(&service_id, attr::REF),
            load_balancer_dns: topology.reference(&service_id, attr::LOAD_BALANCER_DNS),
            task_role: topology.reference(&service_id, "TaskRole"),
            service_security_group: topology.reference(&service_id, attr::SECURITY_GROUP_ID),
            service_id,
            cluster,
            spec,
            finalized: false,
        }
    }

    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.spec.environment.insert(key.into(), value.into());
    }

    pub fn mount(&mut self, volume: VolumeMount) {
        self.spec.volumes.push(volume);
    }

    pub fn connect(&mut self, connection: Connection) {
        self.spec.connections.push(connection);
    }

    pub fn add_execution_policy(&mut self, managed_policy: impl Into<String>) {
        self.spec
            .execution_role_managed_policies
            .push(managed_policy.into());
    }

    pub fn environment(&self) -> &BTreeMap<String, Value> {
        &self.spec.environment
    }

    pub fn spec(&self) -> &LoadBalancedServiceSpec {
        &self.spec
    }

    pub fn log_group(&self) -> &str {
        &self.spec.log_group_name
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Declare the service in `topology` with everything attached so far.
    pub fn finalize(&mut self, topology: &mut Topology) -> Result<(), DomainError> {
        topology.add(Resource::new(self.service_id.clone(), self.spec.clone()))?;
        self.finalized = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dns(host: Option<&str>, root: bool) -> DnsSettings {
        DnsSettings {
            domain: "example.com".into(),
            host: host.map(str::to_string),
            enable_root: root,
        }
    }

    #[test]
    fn domain_list_requires_an_option() {
        assert_eq!(
            DomainList::from_dns(&dns(None, false)),
            Err(DomainError::NoDomainConfigured)
        );
    }

    #[test]
    fn host_only_yields_single_name() {
        let list = DomainList::from_dns(&dns(Some("app"), false)).unwrap();
        assert_eq!(list.to_vec(), vec!["app.example.com"]);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn host_and_root_put_host_first() {
        let list = DomainList::from_dns(&dns(Some("app"), true)).unwrap();
        assert_eq!(list.to_vec(), vec!["app.example.com", "example.com"]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn root_only_is_primary() {
        let list = DomainList::from_dns(&dns(None, true)).unwrap();
        assert_eq!(list.to_vec(), vec!["example.com"]);
    }
}
