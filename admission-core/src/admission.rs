//! Types for implementing Kubernetes admission controllers.
//!
//! For background, see:
//! <https://kubernetes.io/docs/reference/access-authn-authz/extensible-admission-controllers/>
//! <https://github.com/kubernetes/api/blob/master/admission/v1/types.go>

use crate::{
    dynamic::DynamicObject,
    error::ConvertAdmissionReviewError,
    gvk::GroupVersionKind,
    metadata::TypeMeta,
    response::Status,
};

use k8s_openapi::api::authentication::v1::UserInfo;
use serde::{Deserialize, Serialize};

/// The `kind` field in [`TypeMeta`] for an admission review.
pub const META_KIND: &str = "AdmissionReview";
/// The `apiVersion` field in [`TypeMeta`], v1.
pub const META_API_VERSION_V1: &str = "admission.k8s.io/v1";

/// The top-level wire type for `AdmissionReview` requests and responses.
///
/// This is both the type the webhook transport decodes from the API server,
/// and the type it re-serializes as a reply. An admission controller should
/// start by converting the inbound review into an [`AdmissionRequest`].
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReview<T = DynamicObject> {
    /// The API version and kind of this document; always
    /// `admission.k8s.io/v1`/`AdmissionReview`.
    #[serde(flatten)]
    pub types: TypeMeta,
    /// Present on inbound reviews.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<AdmissionRequest<T>>,
    /// Present on outbound reviews.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub response: Option<AdmissionResponse>,
}

impl<T> TryFrom<AdmissionReview<T>> for AdmissionRequest<T> {
    type Error = ConvertAdmissionReviewError;

    fn try_from(review: AdmissionReview<T>) -> Result<Self, Self::Error> {
        review.request.ok_or(ConvertAdmissionReviewError)
    }
}

/// An incoming admission request, extracted from an [`AdmissionReview`].
///
/// ```
/// use admission_core::{admission::{AdmissionRequest, AdmissionReview}, dynamic::DynamicObject};
///
/// fn handle(body: AdmissionReview<DynamicObject>) -> Result<(), admission_core::error::ConvertAdmissionReviewError> {
///     let req: AdmissionRequest<_> = body.try_into()?;
///     println!("{:?} on {:?}", req.operation, req.kind);
///     Ok(())
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest<T = DynamicObject> {
    /// Identifies this request/response round trip. Echoed verbatim on the
    /// [`AdmissionResponse`].
    pub uid: String,
    /// The fully-qualified type of the object being submitted.
    pub kind: GroupVersionKind,
    /// Name of the object. Empty on `CREATE` if the API server has not yet
    /// generated one.
    #[serde(default)]
    pub name: String,
    /// Namespace of the object, if any. Empty for cluster-scoped resources.
    #[serde(default)]
    pub namespace: String,
    /// The admission operation being performed.
    pub operation: Operation,
    /// Information about the requesting user.
    pub user_info: UserInfo,
    /// The object from the incoming request. Absent for `DELETE`.
    #[serde(default)]
    pub object: Option<T>,
    /// The previous object. Present for `UPDATE` and `DELETE`.
    #[serde(default)]
    pub old_object: Option<T>,
    /// Whether this request is a dry run (no changes will be persisted).
    #[serde(default)]
    pub dry_run: bool,
}

impl<T> AdmissionRequest<T> {
    /// The object this request's filters and callbacks should inspect:
    /// `object` for every operation except `DELETE`, where it is `oldObject`.
    pub fn inspected_object(&self) -> Option<&T> {
        match self.operation {
            Operation::Delete => self.old_object.as_ref(),
            _ => self.object.as_ref(),
        }
    }
}

/// The operation specified in an [`AdmissionRequest`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    /// An operation that creates a resource.
    Create,
    /// An operation that updates a resource.
    Update,
    /// An operation that deletes a resource.
    Delete,
    /// An operation that connects to a resource (e.g. `kubectl exec`).
    Connect,
}

/// An outgoing [`AdmissionReview`] response, constructed from the
/// corresponding [`AdmissionRequest`].
///
/// ```
/// use admission_core::admission::{AdmissionRequest, AdmissionResponse};
/// # fn example(req: &AdmissionRequest) {
/// // The happy path, with no side effects.
/// let res = AdmissionResponse::from(req);
///
/// // Rejecting the request with a reason.
/// let res = AdmissionResponse::from(req).deny("not allowed here");
/// # }
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    /// Echoed from the corresponding [`AdmissionRequest`].
    pub uid: String,
    /// Whether the request was permitted.
    pub allowed: bool,
    /// Populated when `allowed` is false; ignored otherwise.
    #[serde(rename = "status", skip_serializing_if = "Option::is_none")]
    pub result: Option<Status>,
    /// Base64-friendly JSON Patch bytes. `None` is equivalent to the empty
    /// patch `[]` on the wire, but the processor always sets this when
    /// `allowed` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Vec<u8>>,
    /// Always `"JSONPatch"` when `patch` is set; this is the only patch type
    /// this framework implements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch_type: Option<PatchType>,
    /// Warnings surfaced verbatim to the requesting client.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl<T> From<&AdmissionRequest<T>> for AdmissionResponse {
    fn from(req: &AdmissionRequest<T>) -> Self {
        Self {
            uid: req.uid.clone(),
            allowed: true,
            result: None,
            patch: None,
            patch_type: None,
            warnings: Vec::new(),
        }
    }
}

impl AdmissionResponse {
    /// Build a response for a request that could not even be decoded.
    ///
    /// Since there is no request to copy a `uid` from, this should only be
    /// used when the inbound body itself failed to parse.
    pub fn invalid(reason: impl ToString) -> Self {
        Self {
            uid: String::new(),
            allowed: false,
            result: Some(Status::failure(&reason.to_string(), "InvalidRequest")),
            patch: None,
            patch_type: None,
            warnings: Vec::new(),
        }
    }

    /// Deny the request with a reason, sent back to the original caller.
    #[must_use]
    pub fn deny(mut self, reason: impl ToString) -> Self {
        self.allowed = false;
        self.result = Some(Status::failure(&reason.to_string(), "PolicyViolation"));
        self
    }

    /// Attach a JSON Patch document, marking it as the `JSONPatch` type.
    pub fn with_patch(mut self, patch: json_patch::Patch) -> Result<Self, crate::error::SerializePatchError> {
        self.patch = Some(
            serde_json::to_vec(&patch).map_err(crate::error::SerializePatchError)?,
        );
        self.patch_type = Some(PatchType::JsonPatch);
        Ok(self)
    }

    /// Wrap this response back into an [`AdmissionReview`] ready to serialize
    /// on the wire.
    pub fn into_review(self) -> AdmissionReview<DynamicObject> {
        AdmissionReview {
            types: TypeMeta {
                kind: META_KIND.to_owned(),
                api_version: META_API_VERSION_V1.to_owned(),
            },
            request: None,
            response: Some(self),
        }
    }
}

/// The type of patch returned in an [`AdmissionResponse`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatchType {
    /// RFC 6902 JSON Patch. The only type this framework produces.
    #[serde(rename = "JSONPatch")]
    JsonPatch,
}

#[cfg(test)]
mod test {
    use super::*;

    const WEBHOOK_BODY: &str = r#"{"kind":"AdmissionReview","apiVersion":"admission.k8s.io/v1","request":{"uid":"0c9a8d74-9cb7-44dd-b98e-09fd62def2f4","kind":{"group":"","version":"v1","kind":"Pod"},"name":"echo-pod","namespace":"colin-coder","operation":"CREATE","userInfo":{"username":"colin@coder.com","groups":["system:authenticated"]},"object":{"kind":"Pod","apiVersion":"v1","metadata":{"name":"echo-pod","namespace":"colin-coder","labels":{"app":"echo-server"}},"spec":{"containers":[]}},"oldObject":null,"dryRun":false}}"#;

    #[test]
    fn v1_webhook_unmarshals() {
        serde_json::from_str::<AdmissionReview<DynamicObject>>(WEBHOOK_BODY).unwrap();
    }

    #[test]
    fn request_conversion_preserves_uid() -> Result<(), ConvertAdmissionReviewError> {
        let review = serde_json::from_str::<AdmissionReview<DynamicObject>>(WEBHOOK_BODY).unwrap();
        let req: AdmissionRequest<_> = review.try_into()?;
        let res = AdmissionResponse::from(&req);
        assert_eq!(res.uid, "0c9a8d74-9cb7-44dd-b98e-09fd62def2f4");
        Ok(())
    }

    #[test]
    fn delete_request_inspects_old_object() {
        let mut req: AdmissionRequest<DynamicObject> =
            serde_json::from_str::<AdmissionReview<DynamicObject>>(WEBHOOK_BODY)
                .unwrap()
                .try_into()
                .unwrap();
        req.operation = Operation::Delete;
        req.old_object = req.object.take();
        assert!(req.inspected_object().is_some());
        assert!(req.object.is_none());
    }

    #[test]
    fn invalid_response_has_no_uid_to_copy() {
        let res = AdmissionResponse::invalid("bad json");
        assert!(!res.allowed);
        assert_eq!(res.uid, "");
        assert_eq!(res.result.unwrap().reason, "InvalidRequest");
    }

    #[test]
    fn with_patch_sets_patch_type() {
        let req: AdmissionRequest<DynamicObject> =
            serde_json::from_str::<AdmissionReview<DynamicObject>>(WEBHOOK_BODY)
                .unwrap()
                .try_into()
                .unwrap();
        let patch = json_patch::Patch(vec![json_patch::PatchOperation::Add(
            json_patch::AddOperation {
                path: json_patch::jsonptr::PointerBuf::from_tokens(["metadata", "labels", "x"]),
                value: serde_json::json!("y"),
            },
        )]);
        let res = AdmissionResponse::from(&req).with_patch(patch).unwrap();
        assert_eq!(res.patch_type, Some(PatchType::JsonPatch));
        assert!(res.patch.is_some());
    }
}
