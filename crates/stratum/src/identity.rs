//! Resource identities: the group/version/kind triple and the full
//! per-instance id used for cross-layer matching and lookup.

use serde::{Deserialize, Serialize};

/// Group, version, and kind of a resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gvk {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub kind: String,
}

impl Gvk {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Builds a Gvk from the `apiVersion` form: `group/version`, or a bare
    /// `version` for the core group.
    pub fn from_api_version(api_version: &str, kind: impl Into<String>) -> Self {
        match api_version.split_once('/') {
            Some((group, version)) => Self::new(group, version, kind),
            None => Self::new("", api_version, kind),
        }
    }

    /// Renders the `apiVersion` form back out.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_empty() && self.version.is_empty() && self.kind.is_empty()
    }
}

impl std::fmt::Display for Gvk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}/{}", self.version, self.kind)
        } else {
            write!(f, "{}/{}/{}", self.group, self.version, self.kind)
        }
    }
}

/// Identity of one resource instance within an output set.
///
/// Equality is full-field: two ids match iff group, version, kind, name,
/// and namespace all match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResId {
    pub gvk: Gvk,
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

impl ResId {
    pub fn new(gvk: Gvk, name: impl Into<String>) -> Self {
        Self {
            gvk,
            name: name.into(),
            namespace: String::new(),
        }
    }

    pub fn with_namespace(gvk: Gvk, name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            gvk,
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl std::fmt::Display for ResId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}:{}", self.gvk, self.name)
        } else {
            write!(f, "{}:{}/{}", self.gvk, self.namespace, self.name)
        }
    }
}
