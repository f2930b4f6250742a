pub mod artifacts;
pub mod common;
pub mod handles;
pub mod resources;
pub mod topology;

pub use crate::domain::DomainError;
pub use artifacts::{Artifact, ArtifactSet, MANIFEST_FILE};
pub use common::{Reference, RelativePath, ResourceId, Value};
pub use handles::{
    CertificateHandle, CredentialHandle, DatabaseHandle, DomainList, FilesystemHandle,
    NetworkHandle, RuntimeHandle, SubnetRef, ZoneHandle,
};
pub use resources::{Resource, ResourceSpec};
pub use topology::{CloudAssembly, OutputRecord, Topology};
