//! Type information for Kubernetes resources, as seen by an admission controller.
use serde::{Deserialize, Serialize};

/// Identifies a Kubernetes resource type by API group, version, and kind.
///
/// `group` is the empty string for core API resources (e.g. `Pod`, `Secret`).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GroupVersionKind {
    /// API group, empty for the core API.
    #[serde(default)]
    pub group: String,
    /// API version.
    #[serde(default)]
    pub version: String,
    /// Resource kind, e.g. `Pod`.
    pub kind: String,
}

impl GroupVersionKind {
    /// Construct from explicit group, version, and kind.
    pub fn gvk(group: &str, version: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Construct a kind-only pattern, leaving group/version as wildcards.
    ///
    /// Used for binding declarations and ignore-list entries where only
    /// the kind is known to matter.
    pub fn kind_only(kind: &str) -> Self {
        Self {
            group: String::new(),
            version: String::new(),
            kind: kind.to_string(),
        }
    }

    /// Generate the `apiVersion` string used on the wire.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Whether `self`, used as a pattern, matches a concrete `other` GVK.
    ///
    /// An empty `group` or `version` on `self` wildcards that dimension;
    /// `kind` is always compared exactly.
    pub fn matches(&self, other: &GroupVersionKind) -> bool {
        let group_matches = self.group.is_empty() || self.group == other.group;
        let version_matches = self.version.is_empty() || self.version == other.version;
        group_matches && version_matches && self.kind == other.kind
    }
}
