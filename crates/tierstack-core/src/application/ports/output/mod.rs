//! Driven (output) ports - implemented by infrastructure.

use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::domain::{ArtifactSet, CloudAssembly, RawConfig};
use crate::error::TierstackResult;

/// Provenance stamped into rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderMetadata {
    pub assembly_id: String,
    /// RFC 3339 timestamp.
    pub generated_at: String,
    pub tool_version: String,
}

/// Port for reading the stack configuration document.
///
/// Implemented by:
/// - `tierstack_adapters::source::FileConfigSource` (JSON or TOML file)
/// - `tierstack_adapters::source::StaticConfigSource` (in-memory, testing)
#[cfg_attr(test, automock)]
pub trait ConfigSource: Send + Sync {
    /// Read and deserialize the configuration. No validation happens here.
    fn load(&self) -> TierstackResult<RawConfig>;

    /// Human-readable origin, used in logs and error messages.
    fn describe(&self) -> String;
}

/// Port for turning an assembly into files.
///
/// Implemented by:
/// - `tierstack_adapters::renderer::JsonRenderer`
#[cfg_attr(test, automock)]
pub trait AssemblyRenderer: Send + Sync {
    fn render(
        &self,
        assembly: &CloudAssembly,
        metadata: &RenderMetadata,
    ) -> TierstackResult<ArtifactSet>;
}

/// Port for writing rendered artifacts.
///
/// Implemented by:
/// - `tierstack_adapters::sink::LocalArtifactSink` (production)
/// - `tierstack_adapters::sink::MemoryArtifactSink` (testing)
#[cfg_attr(test, automock)]
pub trait ArtifactSink: Send + Sync {
    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> TierstackResult<()>;

    /// Write content to a file.
    fn write_file(&self, path: &Path, content: &str) -> TierstackResult<()>;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> TierstackResult<()>;
}
