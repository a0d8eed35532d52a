//! Module-wide configuration, set once at process start.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;

use admission_core::GroupVersionKind;

/// A global filter applied before any capability or binding is consulted.
///
/// Global ignore precedence is intentional: it lets a cluster operator
/// carve out a hard opt-out (e.g. never touch `kube-system`) that no
/// capability can override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlwaysIgnore {
    /// GVKs to ignore entirely. An entry with an empty `group`/`version`
    /// wildcards that dimension, per [`GroupVersionKind::matches`].
    #[serde(default)]
    pub kinds: Vec<GroupVersionKind>,
    /// Namespace names to ignore entirely.
    #[serde(default)]
    pub namespaces: Vec<String>,
    /// Label matchers; an object is ignored if any one matcher's key/value
    /// pairs are all present on it.
    #[serde(default)]
    pub labels: Vec<BTreeMap<String, String>>,
}

/// Process-wide configuration for a module's admission pipeline.
///
/// Read once at startup and passed by value into [`crate::processor::process`]
/// on every request; never mutated during processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConfig {
    /// Stable identifier for this module, used as the middle segment of
    /// stamped annotation keys (`pepr.dev/{id}/{capability}`).
    pub id: String,
    /// Human-readable description, not interpreted by the pipeline.
    #[serde(default)]
    pub description: String,
    /// Requests matching this filter skip every capability and binding.
    #[serde(default)]
    pub always_ignore: AlwaysIgnore,
    /// If true, a failed callback rejects the whole request instead of
    /// being recorded as a warning.
    #[serde(default)]
    pub reject_on_error: bool,
}

impl ModuleConfig {
    /// Start building a config with a fluent [`ModuleConfigBuilder`].
    pub fn builder(id: impl Into<String>) -> ModuleConfigBuilder {
        ModuleConfigBuilder::new(id)
    }

    /// Parse a `ModuleConfig` from a YAML document.
    ///
    /// The YAML shape mirrors this struct's serde representation 1:1, so
    /// this and [`ModuleConfig::builder`] produce identical values for
    /// equivalent input.
    pub fn from_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse a `ModuleConfig` from a YAML document read from `reader`.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_reader(reader)
    }
}

/// Fluent builder for a [`ModuleConfig`], mirroring the teacher crate's own
/// `Config`/client-builder idiom.
#[derive(Debug, Default)]
pub struct ModuleConfigBuilder {
    id: String,
    description: String,
    always_ignore: AlwaysIgnore,
    reject_on_error: bool,
}

impl ModuleConfigBuilder {
    /// Start a builder for a module with the given stable identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Set the human-readable description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a GVK to the global ignore list.
    #[must_use]
    pub fn ignore_kind(mut self, kind: GroupVersionKind) -> Self {
        self.always_ignore.kinds.push(kind);
        self
    }

    /// Add a namespace to the global ignore list.
    #[must_use]
    pub fn ignore_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.always_ignore.namespaces.push(namespace.into());
        self
    }

    /// Add a label matcher to the global ignore list.
    #[must_use]
    pub fn ignore_label(mut self, matcher: BTreeMap<String, String>) -> Self {
        self.always_ignore.labels.push(matcher);
        self
    }

    /// Set the reject-on-error policy.
    #[must_use]
    pub fn reject_on_error(mut self, reject: bool) -> Self {
        self.reject_on_error = reject;
        self
    }

    /// Freeze the builder into a [`ModuleConfig`].
    #[must_use]
    pub fn build(self) -> ModuleConfig {
        ModuleConfig {
            id: self.id,
            description: self.description,
            always_ignore: self.always_ignore,
            reject_on_error: self.reject_on_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_yaml_produce_identical_configs() {
        let built = ModuleConfig::builder("hello-pepr")
            .description("demo module")
            .ignore_kind(GroupVersionKind::kind_only("Secret"))
            .ignore_namespace("kube-system")
            .reject_on_error(true)
            .build();

        let yaml = r#"
id: hello-pepr
description: demo module
alwaysIgnore:
  kinds:
    - kind: Secret
  namespaces:
    - kube-system
rejectOnError: true
"#;
        let parsed = ModuleConfig::from_str(yaml).unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn defaults_are_permissive() {
        let parsed = ModuleConfig::from_str("id: minimal\n").unwrap();
        assert_eq!(parsed.reject_on_error, false);
        assert!(parsed.always_ignore.kinds.is_empty());
    }
}
