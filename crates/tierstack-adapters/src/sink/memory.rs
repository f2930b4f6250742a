//! In-memory sink for testing and dry runs.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use tierstack_core::{
    application::{ApplicationError, ports::ArtifactSink},
    error::TierstackResult,
};

/// Shared, cloneable in-memory sink.
#[derive(Debug, Clone, Default)]
pub struct MemoryArtifactSink {
    inner: Arc<RwLock<MemorySinkInner>>,
}

#[derive(Debug, Default)]
struct MemorySinkInner {
    files: BTreeMap<PathBuf, String>,
    directories: BTreeSet<PathBuf>,
}

impl MemoryArtifactSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path).cloned()
    }

    /// All written files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl ArtifactSink for MemoryArtifactSink {
    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn create_dir_all(&self, path: &Path) -> TierstackResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::LockPoisoned)?;

        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            inner.directories.insert(current.clone());
        }
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> TierstackResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::LockPoisoned)?;

        let orphan = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .is_some_and(|p| !inner.directories.contains(p));
        if orphan {
            return Err(ApplicationError::SinkError {
                path: path.to_path_buf(),
                reason: "Parent directory does not exist".into(),
            }
            .into());
        }

        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> TierstackResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::LockPoisoned)?;

        inner.directories.retain(|p| !p.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_parent_directory() {
        let sink = MemoryArtifactSink::new();
        assert!(sink.write_file(Path::new("out/a.json"), "{}").is_err());

        sink.create_dir_all(Path::new("out")).unwrap();
        sink.write_file(Path::new("out/a.json"), "{}").unwrap();
        assert_eq!(sink.read_file(Path::new("out/a.json")).as_deref(), Some("{}"));
    }

    #[test]
    fn remove_drops_everything_below() {
        let sink = MemoryArtifactSink::new();
        sink.create_dir_all(Path::new("out/nested")).unwrap();
        sink.write_file(Path::new("out/nested/a.json"), "{}").unwrap();
        sink.write_file(Path::new("out/b.json"), "{}").unwrap();

        sink.remove_dir_all(Path::new("out")).unwrap();
        assert!(sink.list_files().is_empty());
        assert!(!sink.exists(Path::new("out")));
    }
}
