//! Error taxonomy for the admission processing pipeline.
use thiserror::Error;

/// The error type a binding callback may return.
///
/// Boxed so callbacks can propagate any error type (including ones from
/// crates the callback author pulls in) without the pipeline needing to
/// know about it.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the processor or the transport wrapping it.
///
/// Callback failures themselves are not a variant here: the processor
/// handles them inline per [`ModuleConfig::reject_on_error`](crate::config::ModuleConfig::reject_on_error),
/// folding them into `response.warnings` or the terminal rejection. This
/// enum covers the failures that short-circuit before a response can be
/// produced at all.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The inbound `AdmissionReview` did not carry a usable request: no
    /// `request` field, or a `request` missing `uid`/`kind`/`object` where
    /// the operation requires one.
    #[error("malformed admission request: {0}")]
    MalformedRequest(String),

    /// The JSON Patch diff between the original and mutated object could
    /// not be serialized onto the response.
    #[error("patch computation failed: {0}")]
    PatchComputationFailure(#[from] admission_core::error::SerializePatchError),
}
