//! Local filesystem sink using std::fs.

use std::io;
use std::path::Path;

use tierstack_core::{
    application::{ApplicationError, ports::ArtifactSink},
    error::{TierstackError, TierstackResult},
};

/// Production sink writing to the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalArtifactSink;

impl LocalArtifactSink {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactSink for LocalArtifactSink {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> TierstackResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> TierstackResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn remove_dir_all(&self, path: &Path) -> TierstackResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> TierstackError {
    ApplicationError::SinkError {
        path: path.to_path_buf(),
        reason: format!("Failed to {operation}: {e}"),
    }
    .into()
}
