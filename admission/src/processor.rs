//! Iterates capabilities and bindings for one request, invokes callbacks,
//! computes the resulting patch, and applies the failure policy.
use admission_core::{
    admission::{AdmissionRequest, AdmissionResponse, Operation},
    DynamicObject,
};
use tracing::{info, warn};

use crate::capability::Capability;
use crate::config::ModuleConfig;
use crate::error::ProcessorError;
use crate::filter::should_skip;
use crate::wrapper::RequestWrapper;

const ANNOTATION_PREFIX: &str = "pepr.dev";

fn annotation_key(module_id: &str, capability_name: &str) -> String {
    format!("{ANNOTATION_PREFIX}/{module_id}/{capability_name}")
}

/// Run every matching binding against `request` and return the resulting
/// admission response.
///
/// A pure function of its arguments: no global mutable state is touched,
/// and `config`/`capabilities` may be shared (typically behind an `Arc`)
/// across concurrently processed requests without locking.
///
/// Returns [`ProcessorError::MalformedRequest`] when `request.object` is
/// missing on an operation other than `DELETE` (where no object is ever
/// carried and [`AdmissionRequest::inspected_object`] falls back to
/// `oldObject`). A `DELETE` that also lacks `oldObject` is not malformed:
/// there is nothing to mutate or diff, so it passes through with the
/// empty patch.
pub fn process(
    config: &ModuleConfig,
    capabilities: &[Capability],
    request: AdmissionRequest<DynamicObject>,
) -> Result<AdmissionResponse, ProcessorError> {
    let uid = request.uid.clone();

    let inspected = match request.inspected_object() {
        Some(object) => object.clone(),
        None if request.operation == Operation::Delete => DynamicObject::default(),
        None => {
            return Err(ProcessorError::MalformedRequest(format!(
                "{:?} request for {} carried no object",
                request.operation, request.kind.kind
            )));
        }
    };

    let mut wrapper = RequestWrapper::new(inspected);
    let mut warnings = Vec::new();

    for capability in capabilities {
        if let Some(namespaces) = &capability.namespaces {
            if !namespaces.iter().any(|ns| ns == &request.namespace) {
                continue;
            }
        }

        for binding in capability.bindings() {
            if should_skip(binding, config, &request) {
                continue;
            }

            let key = annotation_key(&config.id, &capability.name);
            wrapper
                .annotations_mut()
                .insert(key.clone(), "started".to_string());

            match (binding.callback)(&mut wrapper) {
                Ok(()) => {
                    wrapper
                        .annotations_mut()
                        .insert(key, "succeeded".to_string());
                    info!(capability = %capability.name, "binding succeeded");
                }
                Err(err) => {
                    warn!(capability = %capability.name, error = %err, "binding failed");

                    if config.reject_on_error {
                        return Ok(AdmissionResponse {
                            uid,
                            allowed: false,
                            result: Some(admission_core::Status::failure(
                                "module configured to reject on error",
                                "CallbackFailure",
                            )),
                            patch: None,
                            patch_type: None,
                            warnings: vec![format!("Action failed: {err}")],
                        });
                    }

                    wrapper
                        .annotations_mut()
                        .insert(key, "warning".to_string());
                    warnings.push(format!("Action failed: {err}"));
                }
            }
        }
    }

    Ok(build_response(uid, &wrapper, warnings))
}

fn build_response(uid: String, wrapper: &RequestWrapper, warnings: Vec<String>) -> AdmissionResponse {
    let original_value = serde_json::to_value(wrapper.original()).unwrap_or(serde_json::Value::Null);
    let mutated_value = serde_json::to_value(&wrapper.raw).unwrap_or(serde_json::Value::Null);
    let patch = json_patch::diff(&original_value, &mutated_value);

    let base = AdmissionResponse {
        uid: uid.clone(),
        allowed: true,
        result: None,
        patch: None,
        patch_type: None,
        warnings,
    };

    match base.with_patch(patch) {
        Ok(response) => response,
        Err(err) => {
            let err = ProcessorError::from(err);
            AdmissionResponse {
                uid,
                allowed: false,
                result: Some(admission_core::Status::failure(
                    &err.to_string(),
                    "PatchComputationFailure",
                )),
                patch: None,
                patch_type: None,
                warnings: Vec::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admission_core::admission::Operation;
    use admission_core::{DynamicObject, GroupVersionKind, ResourceExt};

    fn pod_create_request(namespace: &str) -> AdmissionRequest<DynamicObject> {
        AdmissionRequest {
            uid: "u1".into(),
            kind: GroupVersionKind::gvk("", "v1", "Pod"),
            name: "p1".into(),
            namespace: namespace.into(),
            operation: Operation::Create,
            user_info: Default::default(),
            object: Some(DynamicObject::new("p1").within(namespace)),
            old_object: None,
            dry_run: false,
        }
    }

    #[test]
    fn pass_through_with_no_capabilities_produces_empty_patch() {
        let config = ModuleConfig::builder("m").build();
        let response = process(&config, &[], pod_create_request("default")).unwrap();
        assert!(response.allowed);
        assert_eq!(response.patch.as_deref(), Some(&b"[]"[..]));
        assert!(response.warnings.is_empty());
    }

    #[test]
    fn single_label_mutation_stamps_succeeded_annotation() {
        let config = ModuleConfig::builder("hello-pepr").build();
        let mut capability = Capability::new("addLabel");
        capability
            .when(GroupVersionKind::kind_only("Pod"))
            .is_created()
            .then(|w| {
                w.labels_mut().insert("x".into(), "y".into());
                Ok(())
            });

        let response = process(&config, std::slice::from_ref(&capability), pod_create_request("default")).unwrap();
        assert!(response.allowed);
        let patch_bytes = response.patch.expect("patch present");
        let patch_text = String::from_utf8(patch_bytes).unwrap();
        assert!(patch_text.contains("/metadata/labels"));
        assert!(patch_text.contains("pepr.dev/hello-pepr/addLabel"));
        assert!(patch_text.contains("succeeded"));
    }

    #[test]
    fn namespace_filter_miss_leaves_object_untouched() {
        let config = ModuleConfig::builder("m").build();
        let mut capability = Capability::new("addLabel");
        capability
            .when(GroupVersionKind::kind_only("Pod"))
            .is_created()
            .in_namespace("kube-system")
            .then(|w| {
                w.labels_mut().insert("x".into(), "y".into());
                Ok(())
            });

        let response = process(&config, std::slice::from_ref(&capability), pod_create_request("default")).unwrap();
        assert!(response.allowed);
        assert_eq!(response.patch.as_deref(), Some(&b"[]"[..]));
    }

    #[test]
    fn callback_failure_with_reject_on_error_false_records_warning() {
        let config = ModuleConfig::builder("m").reject_on_error(false).build();
        let mut capability = Capability::new("broken");
        capability
            .when(GroupVersionKind::kind_only("Pod"))
            .is_created()
            .then(|_w| Err("boom".into()));

        let response = process(&config, std::slice::from_ref(&capability), pod_create_request("default")).unwrap();
        assert!(response.allowed);
        assert_eq!(response.warnings.len(), 1);
        assert!(response.warnings[0].contains("Action failed"));
    }

    #[test]
    fn callback_failure_with_reject_on_error_true_stops_processing() {
        let config = ModuleConfig::builder("m").reject_on_error(true).build();
        let mut first = Capability::new("broken");
        first
            .when(GroupVersionKind::kind_only("Pod"))
            .is_created()
            .then(|_w| Err("boom".into()));

        let mut second = Capability::new("never-runs");
        second
            .when(GroupVersionKind::kind_only("Pod"))
            .is_created()
            .then(|w| {
                w.labels_mut().insert("sentinel".into(), "1".into());
                Ok(())
            });

        let response = process(
            &config,
            &[first, second],
            pod_create_request("default"),
        )
        .unwrap();
        assert!(!response.allowed);
        assert!(response.result.is_some());
        assert!(response.patch.is_none());
    }

    #[test]
    fn global_kind_ignore_skips_all_bindings() {
        let config = ModuleConfig::builder("m")
            .ignore_kind(GroupVersionKind::kind_only("Pod"))
            .build();
        let mut capability = Capability::new("addLabel");
        capability
            .when(GroupVersionKind::kind_only("Pod"))
            .is_created()
            .then(|w| {
                w.labels_mut().insert("x".into(), "y".into());
                Ok(())
            });

        let response = process(&config, std::slice::from_ref(&capability), pod_create_request("default")).unwrap();
        assert!(response.allowed);
        assert_eq!(response.patch.as_deref(), Some(&b"[]"[..]));
    }

    #[test]
    fn create_request_without_object_is_malformed() {
        let config = ModuleConfig::builder("m").build();
        let mut request = pod_create_request("default");
        request.object = None;

        let err = process(&config, &[], request).unwrap_err();
        assert!(matches!(err, ProcessorError::MalformedRequest(_)));
    }

    #[test]
    fn delete_request_without_old_object_passes_through_empty() {
        let config = ModuleConfig::builder("m").build();
        let mut request = pod_create_request("default");
        request.operation = Operation::Delete;
        request.object = None;
        request.old_object = None;

        let response = process(&config, &[], request).unwrap();
        assert!(response.allowed);
        assert_eq!(response.patch.as_deref(), Some(&b"[]"[..]));
    }
}
