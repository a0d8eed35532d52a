//! A single rule within a capability: what to match, and what to run.
use std::collections::BTreeMap;

use admission_core::{admission::Operation, GroupVersionKind};

use crate::error::CallbackError;
use crate::wrapper::RequestWrapper;

/// The callback a matched binding invokes against the request wrapper.
pub type Callback = Box<dyn Fn(&mut RequestWrapper) -> Result<(), CallbackError> + Send + Sync>;

/// The admission operation(s) a binding reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Matches `CREATE` only.
    Create,
    /// Matches `UPDATE` only.
    Update,
    /// Matches `DELETE` only.
    Delete,
    /// Matches both `CREATE` and `UPDATE`, but not `DELETE` or `CONNECT`.
    CreateOrUpdate,
}

impl Event {
    pub(crate) fn matches(self, operation: Operation) -> bool {
        matches!(
            (self, operation),
            (Event::Create, Operation::Create)
                | (Event::Update, Operation::Update)
                | (Event::Delete, Operation::Delete)
                | (Event::CreateOrUpdate, Operation::Create)
                | (Event::CreateOrUpdate, Operation::Update)
        )
    }
}

/// Selectors narrowing which requests a binding matches, beyond `event`
/// and `kind`. All conjunctive: every populated field must agree.
///
/// A label/annotation value of `""` means "key present, any value" — the
/// result of calling `.with_label(key, None)` on the capability builder.
#[derive(Debug, Clone, Default)]
pub struct BindingFilters {
    /// Namespaces this binding applies in. Empty means any namespace,
    /// including cluster-scoped resources.
    pub namespaces: Vec<String>,
    /// Required labels on the inspected object.
    pub labels: BTreeMap<String, String>,
    /// Required annotations on the inspected object.
    pub annotations: BTreeMap<String, String>,
}

/// One rule: match this `kind` on this `event`, subject to `filters`, and
/// run `callback`.
///
/// Bindings are immutable after construction; the only way to produce one
/// is through [`crate::capability::Capability::when`]'s fluent chain.
pub struct Binding {
    pub(crate) event: Event,
    pub(crate) kind: GroupVersionKind,
    pub(crate) filters: BindingFilters,
    pub(crate) callback: Callback,
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("event", &self.event)
            .field("kind", &self.kind)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}
