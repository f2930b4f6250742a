//! Application layer for tierstack.
//!
//! This layer contains:
//! - **Services**: use case orchestration (`TopologyAssembler`, `SynthService`)
//! - **Ports**: traits for configuration sources, renderers and artifact sinks
//! - **Errors**: application-specific error types
//!
//! The application layer coordinates the domain layer and owns all
//! logging. Declaration rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{Deployment, SynthReport, SynthRequest, SynthService, TopologyAssembler};

pub use ports::{ArtifactSink, AssemblyRenderer, ConfigSource, RenderMetadata};

pub use error::ApplicationError;
