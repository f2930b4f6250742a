//! Infrastructure adapters for tierstack.
//!
//! This crate implements the ports defined in `tierstack-core::application::ports`.
//! It contains all file formats and I/O operations.

pub mod renderer;
pub mod sample;
pub mod sink;
pub mod source;

// Re-export commonly used adapters
pub use renderer::JsonRenderer;
pub use sink::{LocalArtifactSink, MemoryArtifactSink};
pub use source::{FileConfigSource, StaticConfigSource};
