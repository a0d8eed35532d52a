//! A per-request view over the inbound object exposed to binding callbacks.
use admission_core::{DynamicObject, ResourceExt};
use std::collections::BTreeMap;

/// Holds the untouched inbound object alongside the mutable copy that
/// callbacks operate on.
///
/// `original` is never exposed mutably: it is the baseline the processor
/// diffs `raw` against to produce the response patch. Created fresh for
/// each request and owned exclusively by that request's processing call.
pub struct RequestWrapper {
    original: DynamicObject,
    /// The working copy. Callbacks mutate this directly, the same way the
    /// teacher crate's `kube` objects are mutated in place before a
    /// client `.replace()` call.
    pub raw: DynamicObject,
}

impl RequestWrapper {
    pub(crate) fn new(object: DynamicObject) -> Self {
        Self {
            raw: object.clone(),
            original: object,
        }
    }

    /// The immutable object as it arrived in the request.
    pub fn original(&self) -> &DynamicObject {
        &self.original
    }

    /// Labels on the working copy.
    pub fn labels(&self) -> &BTreeMap<String, String> {
        self.raw.labels()
    }

    /// Mutable labels on the working copy, creating the map if absent.
    pub fn labels_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.raw.labels_mut()
    }

    /// Annotations on the working copy.
    pub fn annotations(&self) -> &BTreeMap<String, String> {
        self.raw.annotations()
    }

    /// Mutable annotations on the working copy, creating the map if absent.
    pub fn annotations_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.raw.annotations_mut()
    }

    /// The name of the working copy.
    pub fn name(&self) -> String {
        self.raw.name_any()
    }

    /// The namespace of the working copy, if any.
    pub fn namespace(&self) -> Option<String> {
        self.raw.namespace()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutating_raw_leaves_original_untouched() {
        let obj = DynamicObject::new("p1").within("default");
        let mut wrapper = RequestWrapper::new(obj);
        wrapper.labels_mut().insert("x".into(), "y".into());

        assert_eq!(wrapper.labels().get("x"), Some(&"y".to_string()));
        assert!(wrapper.original().labels().is_empty());
    }
}
