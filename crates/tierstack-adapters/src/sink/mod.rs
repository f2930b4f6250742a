//! Artifact sinks.

mod local;
mod memory;

pub use local::LocalArtifactSink;
pub use memory::MemoryArtifactSink;
