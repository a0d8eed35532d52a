//! The schemaless object model that flows through the admission pipeline.
use crate::{metadata::TypeMeta, resource::Resource};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// A dynamic, type-erased representation of a Kubernetes object.
///
/// The admission pipeline never knows the compile-time schema of the
/// resource it is mutating: a `Pod`, a CRD instance, and a `ConfigMap` all
/// arrive the same way. `DynamicObject` models this as `metadata` (typed,
/// since the filter and processor need `labels`/`annotations`) plus `data`
/// (an untyped tree of everything else, diffed verbatim by the patch
/// computation in [`crate::admission`]).
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Default)]
pub struct DynamicObject {
    /// The `apiVersion`/`kind` fields, flattened. Not always present (e.g.
    /// the API server omits them on some sub-objects).
    #[serde(flatten, default)]
    pub types: Option<TypeMeta>,
    /// Object metadata: name, namespace, labels, annotations, etc.
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Every other field of the resource, untouched.
    #[serde(flatten)]
    pub data: serde_json::Value,
}

impl DynamicObject {
    /// Create a `DynamicObject` with just a name set; useful for tests and
    /// for constructing synthetic objects in callbacks.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            types: None,
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            data: serde_json::Value::Null,
        }
    }

    /// Attach dynamic data.
    #[must_use]
    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Attach a namespace.
    #[must_use]
    pub fn within(mut self, ns: &str) -> Self {
        self.metadata.namespace = Some(ns.into());
        self
    }
}

impl Resource for DynamicObject {
    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

#[cfg(test)]
mod test {
    use super::DynamicObject;
    use crate::resource::ResourceExt;

    #[test]
    fn builder_methods_set_expected_fields() {
        let obj = DynamicObject::new("p1")
            .within("default")
            .data(serde_json::json!({"spec": {"containers": []}}));
        assert_eq!(obj.name_any(), "p1");
        assert_eq!(obj.namespace().as_deref(), Some("default"));
        assert_eq!(obj.data["spec"]["containers"], serde_json::json!([]));
    }

    #[test]
    fn round_trips_through_json_with_flattened_fields() {
        let input = serde_json::json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {"name": "p1", "namespace": "default"},
            "spec": {"containers": []},
        });
        let obj: DynamicObject = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(obj.types.as_ref().unwrap().kind, "Pod");
        let output = serde_json::to_value(&obj).unwrap();
        assert_eq!(output, input);
    }
}
