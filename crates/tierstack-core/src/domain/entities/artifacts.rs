use std::collections::HashSet;

use crate::domain::{entities::common::RelativePath, error::DomainError};

/// File every rendered assembly carries at its root.
pub const MANIFEST_FILE: &str = "manifest.json";

/// One rendered file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: RelativePath,
    pub content: String,
}

/// Rendered output ready for materialization.
///
/// Produced by a renderer, written by a sink. Contains no logic beyond
/// path bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: RelativePath, content: impl Into<String>) {
        self.artifacts.push(Artifact {
            path,
            content: content.into(),
        });
    }

    pub fn with(mut self, path: RelativePath, content: impl Into<String>) -> Self {
        self.add(path, content);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter()
    }

    pub fn get(&self, path: &str) -> Option<&Artifact> {
        self.artifacts
            .iter()
            .find(|a| a.path.as_path().to_str() == Some(path))
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.artifacts.iter().map(|a| a.content.len()).sum()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for artifact in &self.artifacts {
            if !seen.insert(&artifact.path) {
                return Err(DomainError::DuplicateArtifact {
                    path: artifact.path.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> RelativePath {
        RelativePath::try_new(p).unwrap()
    }

    #[test]
    fn duplicate_paths_are_rejected() {
        let set = ArtifactSet::new()
            .with(path("manifest.json"), "{}")
            .with(path("manifest.json"), "{}");
        assert_eq!(
            set.validate(),
            Err(DomainError::DuplicateArtifact {
                path: "manifest.json".into()
            })
        );
    }

    #[test]
    fn lookup_by_path() {
        let set = ArtifactSet::new()
            .with(path("manifest.json"), "{}")
            .with(path("AcmeBase.template.json"), "{\"Resources\":{}}");
        assert!(set.validate().is_ok());
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("manifest.json").unwrap().content, "{}");
        assert!(set.get("missing.json").is_none());
        assert_eq!(set.total_bytes(), 2 + 16);
    }
}
