//! Errors produced while decoding or constructing admission wire types.
use thiserror::Error;

/// Failed to serialize a computed JSON patch.
#[derive(Debug, Error)]
#[error("failed to serialize patch")]
pub struct SerializePatchError(#[source] pub(crate) serde_json::Error);

/// An [`AdmissionReview`](crate::admission::AdmissionReview) was missing its
/// `request` field.
///
/// Only raised when converting a review received *from* the API server; a
/// review we construct ourselves always carries exactly one of
/// `request`/`response`.
#[derive(Debug, Error)]
#[error("admission review did not carry a request")]
pub struct ConvertAdmissionReviewError;
