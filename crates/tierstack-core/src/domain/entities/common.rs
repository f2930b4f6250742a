use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::domain::error::DomainError;
use crate::domain::value_objects::Region;

// ── ResourceId ───────────────────────────────────────────────────────────────

/// Logical identifier of a resource inside one topology.
///
/// Invariant: non-empty, ASCII alphanumeric, at most 255 characters.
/// Enforced at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId(String);

impl ResourceId {
    pub const MAX_LEN: usize = 255;

    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let reason = if value.is_empty() {
            Some("identifier is empty")
        } else if value.len() > Self::MAX_LEN {
            Some("identifier is longer than 255 characters")
        } else if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            Some("only ASCII letters and digits are allowed")
        } else {
            None
        };

        match reason {
            None => Ok(Self(value)),
            Some(reason) => Err(DomainError::InvalidIdentifier {
                value,
                reason: reason.into(),
            }),
        }
    }

    /// Build an identifier from a provider-style name by dropping every `-`,
    /// `_` and space.
    pub fn sanitized(raw: &str) -> Result<Self, DomainError> {
        Self::new(
            raw.chars()
                .filter(|c| !matches!(c, '-' | '_' | ' '))
                .collect::<String>(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ResourceId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Reference ────────────────────────────────────────────────────────────────

/// Pointer to one attribute of a declared resource.
///
/// A reference is always produced by the topology that owns the resource.
/// Other topologies obtain a usable value through `Topology::import`, which
/// records the dependency and sets `cross_region` when needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub topology: String,
    pub region: Region,
    pub resource: ResourceId,
    pub attribute: String,
    #[serde(default)]
    pub cross_region: bool,
}

impl Reference {
    pub fn new(
        topology: impl Into<String>,
        region: Region,
        resource: ResourceId,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            topology: topology.into(),
            region,
            resource,
            attribute: attribute.into(),
            cross_region: false,
        }
    }

    /// Same resource, different attribute.
    pub fn attr(&self, attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            ..self.clone()
        }
    }

    /// Export key under which a producer publishes this attribute.
    pub fn export_key(&self) -> String {
        format!("{}:{}:{}", self.topology, self.resource, self.attribute)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}.{}.{}}}", self.topology, self.resource, self.attribute)
    }
}

// ── Value ────────────────────────────────────────────────────────────────────

/// A property value: literal text, a reference, or a join of both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    Literal(String),
    Ref(Reference),
    Join { separator: String, parts: Vec<Value> },
    /// Join over a single list-valued attribute such as `NameServers`.
    JoinList { separator: String, list: Box<Value> },
}

impl Value {
    pub fn literal(s: impl Into<String>) -> Self {
        Self::Literal(s.into())
    }

    pub fn join(separator: impl Into<String>, parts: Vec<Value>) -> Self {
        Self::Join {
            separator: separator.into(),
            parts,
        }
    }

    pub fn join_list(separator: impl Into<String>, list: Reference) -> Self {
        Self::JoinList {
            separator: separator.into(),
            list: Box::new(Self::Ref(list)),
        }
    }

    /// Concatenation without separator.
    pub fn concat(parts: Vec<Value>) -> Self {
        Self::join("", parts)
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(s) => Some(s),
            _ => None,
        }
    }

    /// Every reference contained in this value, depth first.
    pub fn references(&self) -> Vec<&Reference> {
        match self {
            Self::Literal(_) => Vec::new(),
            Self::Ref(r) => vec![r],
            Self::Join { parts, .. } => parts.iter().flat_map(Value::references).collect(),
            Self::JoinList { list, .. } => list.references(),
        }
    }

    /// Walk a serialized declaration and collect the references it embeds.
    ///
    /// Works on the serde form of any type containing `Value`s, which lets
    /// topology validation inspect every resource kind without a visitor per
    /// kind.
    pub fn scan(json: &serde_json::Value, out: &mut Vec<Reference>) {
        match json {
            serde_json::Value::Object(map) => {
                let as_ref = map
                    .get("ref")
                    .filter(|_| map.len() == 1)
                    .and_then(|inner| serde_json::from_value::<Reference>(inner.clone()).ok());
                if let Some(reference) = as_ref {
                    out.push(reference);
                    return;
                }
                map.values().for_each(|v| Self::scan(v, out));
            }
            serde_json::Value::Array(items) => items.iter().for_each(|v| Self::scan(v, out)),
            _ => {}
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::literal(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Literal(s)
    }
}

impl From<Reference> for Value {
    fn from(r: Reference) -> Self {
        Self::Ref(r)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(s) => f.write_str(s),
            Self::Ref(r) => write!(f, "{r}"),
            Self::Join { separator, parts } => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(separator)?;
                    }
                    write!(f, "{part}")?;
                }
                Ok(())
            }
            Self::JoinList { separator, list } => write!(f, "join({separator:?}, {list})"),
        }
    }
}

// ── RelativePath ─────────────────────────────────────────────────────────────

/// A path inside an output directory.
///
/// Invariant: never absolute and never escapes its root via `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath(PathBuf);

impl RelativePath {
    pub fn try_new(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if path.as_os_str().is_empty() || escapes {
            Err(DomainError::InvalidArtifactPath {
                path: path.display().to_string(),
            })
        } else {
            Ok(Self(path))
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(attr: &str) -> Reference {
        Reference::new(
            "AcmeBase",
            Region::cdn_home(),
            ResourceId::new("Vpc").unwrap(),
            attr,
        )
    }

    #[test]
    fn resource_id_rejects_separators() {
        assert!(ResourceId::new("PrivateSubnet1").is_ok());
        assert!(ResourceId::new("").is_err());
        assert!(ResourceId::new("Private-Subnet-1").is_err());
        assert!(ResourceId::new("a".repeat(256)).is_err());
    }

    #[test]
    fn sanitized_strips_every_separator() {
        let id = ResourceId::sanitized("Private-Subnet_1 a-b").unwrap();
        assert_eq!(id.as_str(), "PrivateSubnet1ab");
        assert!(ResourceId::sanitized("- _").is_err());
        assert!(ResourceId::sanitized("subnet/1").is_err());
    }

    #[test]
    fn value_display_renders_tokens() {
        let v = Value::concat(vec!["https://".into(), reference("DnsName").into()]);
        assert_eq!(v.to_string(), "https://${AcmeBase.Vpc.DnsName}");

        let joined = Value::join("\n", vec!["a".into(), "b".into()]);
        assert_eq!(joined.to_string(), "a\nb");
    }

    #[test]
    fn scan_finds_nested_references() {
        let v = Value::join(",", vec![reference("A").into(), reference("B").into()]);
        let json = serde_json::to_value(vec![v.clone(), Value::literal("x")]).unwrap();

        let mut found = Vec::new();
        Value::scan(&json, &mut found);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].attribute, "A");
        assert_eq!(v.references().len(), 2);
    }

    #[test]
    fn relative_path_stays_inside_root() {
        assert!(RelativePath::try_new("manifest.json").is_ok());
        assert!(RelativePath::try_new("../escape.json").is_err());
        assert!(RelativePath::try_new("/etc/passwd").is_err());
        assert!(RelativePath::try_new("").is_err());
    }
}
