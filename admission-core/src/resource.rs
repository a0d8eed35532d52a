//! Accessor traits shared by objects that flow through the admission pipeline.
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::{collections::BTreeMap, sync::OnceLock};

/// An accessor trait for a Kubernetes-shaped object.
///
/// Every object the admission pipeline touches (today, just
/// [`DynamicObject`](crate::dynamic::DynamicObject)) has a `.metadata` with at
/// least a `name`. Unlike the full `kube` client's `Resource` trait, this
/// core makes no attempt to know each kind's plural/URL path: the processor
/// never issues requests back to the API server, so that machinery has no
/// use here.
pub trait Resource {
    /// Metadata that all persisted resources must have.
    fn meta(&self) -> &ObjectMeta;
    /// Mutable access to the same metadata.
    fn meta_mut(&mut self) -> &mut ObjectMeta;
}

/// Convenience accessors layered over [`Resource`].
///
/// `labels_mut`/`annotations_mut` lazily create the underlying map on first
/// write, so callbacks can assign a single key without a preceding
/// null-check.
pub trait ResourceExt: Resource {
    /// The name of the resource. Empty string if unset (e.g. `generateName`
    /// was used and the API server has not assigned a name yet).
    fn name_any(&self) -> String;
    /// The namespace the resource is in, if any.
    fn namespace(&self) -> Option<String>;
    /// Resource labels.
    fn labels(&self) -> &BTreeMap<String, String>;
    /// Mutable access to labels, creating the map if absent.
    fn labels_mut(&mut self) -> &mut BTreeMap<String, String>;
    /// Resource annotations.
    fn annotations(&self) -> &BTreeMap<String, String>;
    /// Mutable access to annotations, creating the map if absent.
    fn annotations_mut(&mut self) -> &mut BTreeMap<String, String>;
}

fn empty_map() -> &'static BTreeMap<String, String> {
    static EMPTY: OnceLock<BTreeMap<String, String>> = OnceLock::new();
    EMPTY.get_or_init(BTreeMap::new)
}

impl<K: Resource> ResourceExt for K {
    fn name_any(&self) -> String {
        self.meta().name.clone().unwrap_or_default()
    }

    fn namespace(&self) -> Option<String> {
        self.meta().namespace.clone()
    }

    fn labels(&self) -> &BTreeMap<String, String> {
        self.meta().labels.as_ref().unwrap_or_else(|| empty_map())
    }

    fn labels_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.meta_mut().labels.get_or_insert_with(BTreeMap::new)
    }

    fn annotations(&self) -> &BTreeMap<String, String> {
        self.meta().annotations.as_ref().unwrap_or_else(|| empty_map())
    }

    fn annotations_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.meta_mut().annotations.get_or_insert_with(BTreeMap::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::DynamicObject;

    #[test]
    fn labels_mut_lazily_creates_the_map() {
        let mut obj = DynamicObject::new("pod-1");
        assert!(obj.meta().labels.is_none());
        obj.labels_mut().insert("x".into(), "y".into());
        assert_eq!(obj.labels().get("x"), Some(&"y".to_string()));
    }
}
