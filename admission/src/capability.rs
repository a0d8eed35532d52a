//! Fluent registration of bindings: kind to event to selectors to callback.
use admission_core::GroupVersionKind;

use crate::binding::{Binding, BindingFilters, Event};
use crate::error::CallbackError;
use crate::wrapper::RequestWrapper;

/// A named, ordered group of bindings sharing a namespace restriction.
pub struct Capability {
    pub(crate) name: String,
    pub(crate) namespaces: Option<Vec<String>>,
    pub(crate) bindings: Vec<Binding>,
}

impl Capability {
    /// Start a new, empty capability with the given name.
    ///
    /// Names should be unique within a module: they appear verbatim as
    /// the last segment of the stamped `pepr.dev/{id}/{name}` annotation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespaces: None,
            bindings: Vec::new(),
        }
    }

    /// Restrict every binding in this capability to the given namespaces.
    /// A request outside this set skips the whole capability before any
    /// binding is consulted.
    #[must_use]
    pub fn in_one_of_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces
            .get_or_insert_with(Vec::new)
            .extend(namespaces.into_iter().map(Into::into));
        self
    }

    /// Begin a binding chain for resources of the given kind.
    pub fn when(&mut self, kind: GroupVersionKind) -> BindingBuilder<'_> {
        BindingBuilder {
            capability: self,
            kind,
            event: Event::Create,
            filters: BindingFilters::default(),
        }
    }

    /// The capability's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bindings registered so far, in registration order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }
}

/// The in-progress binding chain returned by [`Capability::when`].
///
/// Each method consumes and returns `Self`, so the chain reads like a
/// sentence: `capability.when(kind).is_created().in_namespace("default").then(cb)`.
/// Calling `.then` freezes the current `event`/`kind`/`filters` into a
/// [`Binding`] appended to the capability, then hands back a builder in
/// the same state so a further `.then` shares the filter (a second
/// binding with an identical match, a different callback). Calling a
/// filter mutator instead diverges the chain onto a new binding from that
/// point on.
pub struct BindingBuilder<'a> {
    capability: &'a mut Capability,
    kind: GroupVersionKind,
    event: Event,
    filters: BindingFilters,
}

impl<'a> BindingBuilder<'a> {
    /// Match `CREATE` only.
    #[must_use]
    pub fn is_created(mut self) -> Self {
        self.event = Event::Create;
        self
    }

    /// Match `UPDATE` only.
    #[must_use]
    pub fn is_updated(mut self) -> Self {
        self.event = Event::Update;
        self
    }

    /// Match `DELETE` only.
    #[must_use]
    pub fn is_deleted(mut self) -> Self {
        self.event = Event::Delete;
        self
    }

    /// Match `CREATE` or `UPDATE`.
    #[must_use]
    pub fn is_created_or_updated(mut self) -> Self {
        self.event = Event::CreateOrUpdate;
        self
    }

    /// Restrict to a single namespace. May be called more than once to
    /// accept any of several namespaces.
    #[must_use]
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.filters.namespaces.push(namespace.into());
        self
    }

    /// Restrict to any of the given namespaces.
    #[must_use]
    pub fn in_one_of_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters
            .namespaces
            .extend(namespaces.into_iter().map(Into::into));
        self
    }

    /// Require a label. `value = None` matches any value, so long as the
    /// key is present.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: Option<&str>) -> Self {
        self.filters
            .labels
            .insert(key.into(), value.unwrap_or("").to_string());
        self
    }

    /// Require an annotation. `value = None` matches any value, so long
    /// as the key is present.
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: Option<&str>) -> Self {
        self.filters
            .annotations
            .insert(key.into(), value.unwrap_or("").to_string());
        self
    }

    /// Finalize the current `event`/`kind`/`filters` into a binding and
    /// register it, returning a builder in the same state for further
    /// chaining.
    pub fn then<F>(self, callback: F) -> Self
    where
        F: Fn(&mut RequestWrapper) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        let Self {
            capability,
            kind,
            event,
            filters,
        } = self;
        capability.bindings.push(Binding {
            event,
            kind: kind.clone(),
            filters: filters.clone(),
            callback: Box::new(callback),
        });
        Self {
            capability,
            kind,
            event,
            filters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn then_without_mutators_shares_the_same_filter() {
        let mut capability = Capability::new("addLabel");
        capability
            .when(GroupVersionKind::kind_only("Pod"))
            .is_created()
            .in_namespace("default")
            .then(|w| {
                w.labels_mut().insert("first".into(), "1".into());
                Ok(())
            })
            .then(|w| {
                w.labels_mut().insert("second".into(), "1".into());
                Ok(())
            });

        assert_eq!(capability.bindings().len(), 2);
        assert_eq!(
            capability.bindings()[0].filters.namespaces,
            capability.bindings()[1].filters.namespaces
        );
    }

    #[test]
    fn mutator_after_then_diverges_onto_a_new_binding() {
        let mut capability = Capability::new("labelTwoWays");
        capability
            .when(GroupVersionKind::kind_only("Pod"))
            .is_created()
            .with_label("tier", Some("frontend"))
            .then(|_w| Ok(()))
            .with_label("tier", Some("backend"))
            .then(|_w| Ok(()));

        assert_eq!(capability.bindings().len(), 2);
        assert_eq!(
            capability.bindings()[0].filters.labels.get("tier"),
            Some(&"frontend".to_string())
        );
        assert_eq!(
            capability.bindings()[1].filters.labels.get("tier"),
            Some(&"backend".to_string())
        );
    }
}
