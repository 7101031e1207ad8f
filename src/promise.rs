//! Model promises.
//!
//! A promise states which types a node's value can be read as and mutated
//! as. It is available at every node state and never requires the value to
//! exist.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::model_type::ModelType;

/// Readability and writability contract of a model node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPromise {
    readable: IndexSet<ModelType>,
    writable: IndexSet<ModelType>,
}

impl ModelPromise {
    /// Creates a promise from readable and writable types.
    #[must_use]
    pub fn new(
        readable: impl IntoIterator<Item = ModelType>,
        writable: impl IntoIterator<Item = ModelType>,
    ) -> Self {
        Self {
            readable: readable.into_iter().collect(),
            writable: writable.into_iter().collect(),
        }
    }

    /// Creates a promise whose views can be read but not mutated.
    #[must_use]
    pub fn read_only(readable: impl IntoIterator<Item = ModelType>) -> Self {
        Self {
            readable: readable.into_iter().collect(),
            writable: IndexSet::new(),
        }
    }

    /// Adds readable views.
    pub fn add_readable(&mut self, types: impl IntoIterator<Item = ModelType>) {
        self.readable.extend(types);
    }

    /// Adds writable views.
    pub fn add_writable(&mut self, types: impl IntoIterator<Item = ModelType>) {
        self.writable.extend(types);
    }

    /// Returns true if some readable view is assignable to `target`.
    #[must_use]
    pub fn can_be_viewed_as_readable(&self, target: &ModelType) -> bool {
        self.readable.iter().any(|t| target.is_assignable_from(t))
    }

    /// Returns true if some writable view is assignable to `target`.
    #[must_use]
    pub fn can_be_viewed_as_writable(&self, target: &ModelType) -> bool {
        self.writable.iter().any(|t| target.is_assignable_from(t))
    }

    /// Readable views, in declaration order.
    pub fn readable_types(&self) -> impl Iterator<Item = &ModelType> {
        self.readable.iter()
    }

    /// Writable views, in declaration order.
    pub fn writable_types(&self) -> impl Iterator<Item = &ModelType> {
        self.writable.iter()
    }

    /// Display names of the readable views.
    #[must_use]
    pub fn readable_type_descriptions(&self) -> Vec<String> {
        self.readable.iter().map(ModelType::simple_name).collect()
    }

    /// Display names of the writable views.
    #[must_use]
    pub fn writable_type_descriptions(&self) -> Vec<String> {
        self.writable.iter().map(ModelType::simple_name).collect()
    }

    /// Returns true if the promise offers no views at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readable.is_empty() && self.writable.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_promise() {
        let spec = ModelType::named("ComponentSpec");
        let promise = ModelPromise::read_only([spec.clone()]);
        assert!(promise.can_be_viewed_as_readable(&spec));
        assert!(!promise.can_be_viewed_as_writable(&spec));
    }

    #[test]
    fn test_views_match_supertypes() {
        let base = ModelType::named("ComponentSpec");
        let library = ModelType::named("LibrarySpec").extending(&base);
        let promise = ModelPromise::new([library.clone()], [library]);
        assert!(promise.can_be_viewed_as_readable(&base));
        assert!(promise.can_be_viewed_as_writable(&base));
        assert!(!promise.can_be_viewed_as_readable(&ModelType::named("TaskContainer")));
    }

    #[test]
    fn test_duplicates_collapse_in_order() {
        let mut promise = ModelPromise::default();
        assert!(promise.is_empty());
        promise.add_readable([ModelType::named("B"), ModelType::named("A"), ModelType::named("B")]);
        assert_eq!(promise.readable_type_descriptions(), vec!["B", "A"]);
    }
}
