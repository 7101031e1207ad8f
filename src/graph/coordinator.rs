//! Binding coordinator.
//!
//! Holds unresolved path binders keyed by target path and delivers node
//! events to them. The state gate is checked here, before delivery, so a
//! listener never sees a node its gate rejects.

use std::collections::BTreeMap;

use crate::binding::{BindingId, CreationListener, ModelBinding, PathBinder};
use crate::error::{BindingError, ValidationError};
use crate::path::ModelPath;

use super::node::GraphNode;

/// Dispatches node events to waiting creation listeners.
#[derive(Debug, Default)]
pub struct BindingCoordinator {
    pending: BTreeMap<ModelPath, Vec<PathBinder>>,
    resolved: Vec<ModelBinding>,
}

impl BindingCoordinator {
    /// Creates an empty coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `binder` until a node at its target path is offered.
    ///
    /// # Errors
    /// - `PathRequired`: the binder's reference has no path. It is not queued.
    pub fn register(&mut self, binder: PathBinder) -> Result<BindingId, ValidationError> {
        let Some(path) = binder.target_path().cloned() else {
            let binding = binder.binding();
            return Err(ValidationError::PathRequired {
                reference: binding.predicate().reference().to_string(),
                referrer: binding.referrer().clone(),
            });
        };
        let id = binder.binding().id();
        self.pending.entry(path).or_default().push(binder);
        Ok(id)
    }

    /// Offers `node` to every binder waiting for its path whose gate accepts
    /// the node's state. Returns the number of bindings resolved.
    ///
    /// Binders are offered the node in registration order. On the first
    /// failure the failing binder is discarded, binders not yet offered stay
    /// queued, and the error is returned.
    ///
    /// # Errors
    /// - `IncompatibleType` or `AlreadyBound` from the failing listener.
    pub fn notify(&mut self, node: &dyn GraphNode) -> Result<usize, BindingError> {
        let Some(waiting) = self.pending.remove(node.path()) else {
            return Ok(0);
        };

        let state = node.state();
        let mut resolved = 0;
        let mut failure = None;
        let mut still_waiting = Vec::new();
        for mut binder in waiting {
            if failure.is_some() || !binder.can_bind_in_state(state) {
                still_waiting.push(binder);
                continue;
            }
            match binder.on_create(node) {
                Ok(()) => {
                    self.resolved.push(binder.into_binding());
                    resolved += 1;
                }
                Err(err) => failure = Some(err),
            }
        }

        if !still_waiting.is_empty() {
            self.pending.insert(node.path().clone(), still_waiting);
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(resolved),
        }
    }

    /// Looks up a binding, resolved or not.
    #[must_use]
    pub fn binding(&self, id: BindingId) -> Option<&ModelBinding> {
        self.resolved
            .iter()
            .find(|b| b.id() == id)
            .or_else(|| self.unbound().find(|b| b.id() == id))
    }

    /// Bindings still waiting for a node, ordered by target path.
    pub fn unbound(&self) -> impl Iterator<Item = &ModelBinding> {
        self.pending.values().flatten().map(PathBinder::binding)
    }

    /// Bindings resolved so far, in resolution order.
    #[must_use]
    pub fn resolved(&self) -> &[ModelBinding] {
        &self.resolved
    }

    /// Number of bindings still waiting.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{BindingPredicate, ModelReference};
    use crate::descriptor::RuleDescriptor;
    use crate::graph::ModelNode;
    use crate::model_type::ModelType;
    use crate::state::NodeState;

    fn binder(path: &ModelPath, ty: Option<&str>) -> PathBinder {
        let reference = match ty {
            Some(name) => ModelReference::of(path.clone(), ModelType::named(name)),
            None => ModelReference::of_path(path.clone()),
        };
        PathBinder::new(RuleDescriptor::simple("rule"), BindingPredicate::read(reference), Box::new(|_| {}))
    }

    #[test]
    fn test_gate_defers_typed_binders() {
        let path = ModelPath::parse("tasks").unwrap();
        let mut coordinator = BindingCoordinator::new();
        let typed = coordinator.register(binder(&path, Some("TaskContainer"))).unwrap();
        let untyped = coordinator.register(binder(&path, None)).unwrap();

        let mut node = ModelNode::new(path.clone(), None);
        node.declare_projections([ModelType::named("TaskContainer")], Vec::new())
            .unwrap();

        assert_eq!(coordinator.notify(&node).unwrap(), 1);
        assert!(coordinator.binding(untyped).unwrap().is_bound());
        assert!(!coordinator.binding(typed).unwrap().is_bound());
        assert_eq!(coordinator.pending_count(), 1);

        node.advance_to(NodeState::ProjectionsDefined).unwrap();
        assert_eq!(coordinator.notify(&node).unwrap(), 1);
        assert_eq!(coordinator.binding(typed).unwrap().bound_to(), Some(&path));
        assert_eq!(coordinator.pending_count(), 0);
        assert_eq!(coordinator.resolved().len(), 2);
    }

    #[test]
    fn test_other_paths_untouched() {
        let tasks = ModelPath::parse("tasks").unwrap();
        let components = ModelPath::parse("components").unwrap();
        let mut coordinator = BindingCoordinator::new();
        coordinator.register(binder(&components, None)).unwrap();

        let node = ModelNode::new(tasks, None);
        assert_eq!(coordinator.notify(&node).unwrap(), 0);
        assert_eq!(coordinator.pending_count(), 1);
    }

    #[test]
    fn test_failure_keeps_later_binders_queued() {
        let path = ModelPath::parse("tasks").unwrap();
        let mut coordinator = BindingCoordinator::new();
        let wrong = coordinator.register(binder(&path, Some("Wrong"))).unwrap();
        let later = coordinator.register(binder(&path, Some("TaskContainer"))).unwrap();

        let mut node = ModelNode::new(path, None);
        node.declare_projections([ModelType::named("TaskContainer")], Vec::new())
            .unwrap();
        node.advance_to(NodeState::ProjectionsDefined).unwrap();

        let err = coordinator.notify(&node).unwrap_err();
        assert!(matches!(err, BindingError::IncompatibleType(_)));
        assert!(coordinator.binding(wrong).is_none());
        assert!(!coordinator.binding(later).unwrap().is_bound());

        assert_eq!(coordinator.notify(&node).unwrap(), 1);
        assert!(coordinator.binding(later).unwrap().is_bound());
    }

    #[test]
    fn test_pathless_binder_is_rejected() {
        let mut coordinator = BindingCoordinator::new();
        let type_only = PathBinder::new(
            RuleDescriptor::simple("rule"),
            BindingPredicate::read(ModelReference::of_type(ModelType::named("Thing"))),
            Box::new(|_| {}),
        );
        let err = coordinator.register(type_only).unwrap_err();
        assert!(matches!(err, ValidationError::PathRequired { .. }));
        assert_eq!(coordinator.pending_count(), 0);

        let mut root = ModelNode::new(ModelPath::root(), None);
        root.declare_projections([ModelType::named("Thing")], Vec::new())
            .unwrap();
        root.advance_to(NodeState::ProjectionsDefined).unwrap();
        assert_eq!(coordinator.notify(&root).unwrap(), 0);
        assert!(coordinator.resolved().is_empty());
    }
}
