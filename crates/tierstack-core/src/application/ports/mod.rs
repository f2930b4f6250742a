//! Application ports (traits) for external dependencies.
//!
//! Ports define what the application needs from the outside world.
//! Adapters in `tierstack-adapters` implement them.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: called by the application, implemented by infrastructure
//!   - `ConfigSource`: where the stack configuration comes from
//!   - `AssemblyRenderer`: turns a validated assembly into files
//!   - `ArtifactSink`: where those files go
//!
//! - **Driving (Input) Ports**: the CLI calls the services directly

pub mod output;

pub use output::{ArtifactSink, AssemblyRenderer, ConfigSource, RenderMetadata};

#[cfg(test)]
pub use output::{MockArtifactSink, MockAssemblyRenderer, MockConfigSource};
