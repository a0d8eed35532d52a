//! Shared types for Kubernetes admission controllers.
//!
//! This crate is the client-less, pipeline-less half of the story: GVKs,
//! the dynamic (schemaless) object model, and the `AdmissionReview` wire
//! format. The request matching, mutation dispatch, and patch computation
//! built on top of these types live in the `admission` crate.

pub mod admission;
pub mod dynamic;
pub mod error;
pub mod gvk;
pub mod metadata;
pub mod resource;
pub mod response;

pub use dynamic::DynamicObject;
pub use gvk::GroupVersionKind;
pub use metadata::TypeMeta;
pub use resource::{Resource, ResourceExt};
pub use response::Status;
