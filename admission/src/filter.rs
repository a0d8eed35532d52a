//! Decides whether a single binding should run for a given request.
use admission_core::{admission::AdmissionRequest, DynamicObject, ResourceExt};

use crate::binding::Binding;
use crate::config::ModuleConfig;

/// Returns `true` when `binding` must NOT run against `request`.
///
/// Conditions are checked in the order the framework's invariants rely on
/// for short-circuit clarity: an event mismatch never even looks at
/// labels, and a global ignore always wins over a binding-level match.
pub fn should_skip(
    binding: &Binding,
    config: &ModuleConfig,
    request: &AdmissionRequest<DynamicObject>,
) -> bool {
    if !binding.event.matches(request.operation) {
        return true;
    }

    if config
        .always_ignore
        .kinds
        .iter()
        .any(|ignored| ignored.matches(&request.kind))
    {
        return true;
    }

    if !request.namespace.is_empty()
        && config
            .always_ignore
            .namespaces
            .iter()
            .any(|ns| ns == &request.namespace)
    {
        return true;
    }

    let inspected = request.inspected_object();
    let empty_labels = std::collections::BTreeMap::new();
    let labels = inspected.map(ResourceExt::labels).unwrap_or(&empty_labels);
    let empty_annotations = std::collections::BTreeMap::new();
    let annotations = inspected
        .map(ResourceExt::annotations)
        .unwrap_or(&empty_annotations);

    if config.always_ignore.labels.iter().any(|matcher| {
        matcher
            .iter()
            .all(|(k, v)| labels.get(k).is_some_and(|stored| stored == v))
    }) {
        return true;
    }

    if !binding.kind.matches(&request.kind) {
        return true;
    }

    if !binding.filters.namespaces.is_empty()
        && !binding
            .filters
            .namespaces
            .iter()
            .any(|ns| ns == &request.namespace)
    {
        return true;
    }

    if selector_mismatch(&binding.filters.labels, labels) {
        return true;
    }

    if selector_mismatch(&binding.filters.annotations, annotations) {
        return true;
    }

    false
}

fn selector_mismatch(
    required: &std::collections::BTreeMap<String, String>,
    actual: &std::collections::BTreeMap<String, String>,
) -> bool {
    required.iter().any(|(k, v)| match actual.get(k) {
        None => true,
        Some(stored) => !v.is_empty() && stored != v,
    })
}
