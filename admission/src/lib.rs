//! A framework for building Kubernetes mutating admission webhooks.
//!
//! A module declares one or more [`Capability`](capability::Capability)
//! values, each an ordered set of [`Binding`](binding::Binding)s built
//! through the fluent chain on [`Capability::when`](capability::Capability::when).
//! A transport layer (see the `demos` binary in this workspace) decodes
//! an inbound `AdmissionReview`, calls [`processor::process`] with the
//! registered capabilities, and replies with the resulting
//! `AdmissionReview`.
//!
//! The wire types this crate builds on — `GroupVersionKind`,
//! `DynamicObject`, `AdmissionRequest`/`AdmissionResponse` — live in
//! [`admission_core`] and are re-exported here under [`core`] for
//! convenience, mirroring the way the teacher crate's facade re-exports
//! `kube_core` as `kube::core`.

pub mod binding;
pub mod capability;
pub mod config;
pub mod error;
pub mod filter;
pub mod processor;
pub mod wrapper;

/// Re-export of the wire types this framework is built on.
pub mod core {
    pub use admission_core::*;
}

pub use binding::{Binding, BindingFilters, Event};
pub use capability::Capability;
pub use config::{AlwaysIgnore, ModuleConfig, ModuleConfigBuilder};
pub use error::{CallbackError, ProcessorError};
pub use processor::process;
pub use wrapper::RequestWrapper;
