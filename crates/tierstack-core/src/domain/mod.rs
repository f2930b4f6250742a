// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for tierstack.
//!
//! Pure declaration logic: configuration validation, the typed resource
//! model, and the five topology builders. Nothing here logs, touches the
//! filesystem, or talks to a cloud provider. Rendering and persistence are
//! reached through ports defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No I/O**: builders return values, adapters write them
//! - **No logging**: the application layer traces around domain calls
//! - **Immutable handles**: a handle is produced once and only read afterwards
//! - **Typed references**: cross-topology wiring is checked before rendering
//!
pub mod config;
pub mod engines;
pub mod entities;
pub mod error;
pub mod topologies;
pub mod value_objects;

mod validation;

pub use config::{
    ConfigValidator, DatabaseSettings, DnsSettings, EmailSettings, NetworkSettings, RawConfig,
    Scope, ValidatedConfig, WebSettings,
};
pub use engines::{ENGINE_REGISTRY, EngineDef, TASK_SIZE_REGISTRY, TaskSizeDef, engine_def};
pub use entities::{
    Artifact, ArtifactSet, CertificateHandle, CloudAssembly, CredentialHandle, DatabaseHandle,
    DomainList, FilesystemHandle, MANIFEST_FILE, NetworkHandle, OutputRecord, Reference,
    RelativePath, Resource, ResourceId, ResourceSpec, RuntimeHandle, SubnetRef, Topology, Value,
    ZoneHandle,
};
pub use error::{ConfigError, DomainError, ErrorCategory};
pub use topologies::{Built, TopologyContext};
pub use validation::DomainValidator;
pub use value_objects::{DbEngine, Peer, PortRange, Protocol, Region, SubnetType};
