//! The five topology builders and the context that threads their handles.
//!
//! Each builder is a plain function from configuration slices and upstream
//! handles to a [`Built`] pair: the declared [`Topology`] and the handle
//! downstream builders consume. Optional builders return `Option`, and
//! consumers match on presence instead of inspecting shared state.

pub mod certificate;
pub mod dashboard;
pub mod database;
pub mod email;
pub mod network;
pub mod web;

use crate::domain::config::ValidatedConfig;
use crate::domain::entities::{
    CertificateHandle, CredentialHandle, DatabaseHandle, NetworkHandle, RuntimeHandle, Topology,
};
use crate::domain::error::DomainError;

/// Topology suffixes appended to the name prefix.
pub mod names {
    pub const BASE: &str = "Base";
    pub const DATA: &str = "Data";
    pub const EMAIL: &str = "Email";
    pub const CERT: &str = "Cert";
    pub const WEB: &str = "Web";
}

/// A declared topology together with the handle it exposes.
#[derive(Debug, Clone)]
pub struct Built<H> {
    pub topology: Topology,
    pub handle: H,
}

impl<H> Built<H> {
    pub fn new(topology: Topology, handle: H) -> Self {
        Self { topology, handle }
    }
}

/// Everything produced so far, plus the configuration it came from.
///
/// Never mutated in place: each `with_*` call consumes the context and
/// returns an extended copy.
#[derive(Debug, Clone)]
pub struct TopologyContext {
    config: ValidatedConfig,
    network: Option<NetworkHandle>,
    database: Option<DatabaseHandle>,
    email: Option<CredentialHandle>,
    certificate: Option<CertificateHandle>,
    runtime: Option<RuntimeHandle>,
}

impl TopologyContext {
    pub fn new(config: ValidatedConfig) -> Self {
        Self {
            config,
            network: None,
            database: None,
            email: None,
            certificate: None,
            runtime: None,
        }
    }

    pub fn with_network(self, network: NetworkHandle) -> Self {
        Self {
            network: Some(network),
            ..self
        }
    }

    pub fn with_database(self, database: DatabaseHandle) -> Self {
        Self {
            database: Some(database),
            ..self
        }
    }

    pub fn with_email(self, email: Option<CredentialHandle>) -> Self {
        Self { email, ..self }
    }

    pub fn with_certificate(self, certificate: Option<CertificateHandle>) -> Self {
        Self {
            certificate,
            ..self
        }
    }

    pub fn with_runtime(self, runtime: RuntimeHandle) -> Self {
        Self {
            runtime: Some(runtime),
            ..self
        }
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    pub fn network(&self) -> Result<&NetworkHandle, DomainError> {
        self.network.as_ref().ok_or_else(|| self.missing(names::BASE))
    }

    pub fn database(&self) -> Result<&DatabaseHandle, DomainError> {
        self.database.as_ref().ok_or_else(|| self.missing(names::DATA))
    }

    pub fn runtime(&self) -> Result<&RuntimeHandle, DomainError> {
        self.runtime.as_ref().ok_or_else(|| self.missing(names::WEB))
    }

    pub fn email(&self) -> Option<&CredentialHandle> {
        self.email.as_ref()
    }

    pub fn certificate(&self) -> Option<&CertificateHandle> {
        self.certificate.as_ref()
    }

    fn missing(&self, producer: &str) -> DomainError {
        DomainError::UnresolvedDependency {
            consumer: "context".into(),
            producer: self.config.scope.topology_name(producer),
        }
    }
}
