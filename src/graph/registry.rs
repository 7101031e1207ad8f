//! The model registry: path-addressed nodes plus their binding coordinator.

use std::collections::BTreeMap;

use tracing::debug;

use crate::binding::{BindAction, BindingId, BindingPredicate, ModelBinding, ModelReference, PathBinder};
use crate::descriptor::RuleDescriptor;
use crate::error::{GraphError, ModelResult};
use crate::factory::InstanceFactory;
use crate::model_type::ModelType;
use crate::path::ModelPath;
use crate::state::NodeState;

use super::coordinator::BindingCoordinator;
use super::node::{GraphNode, ModelNode};
use super::snapshot::{GraphSnapshot, NodeSnapshot, PendingBindingSnapshot};

/// Owns the model graph for one build configuration.
///
/// All mutation goes through `&mut self`: the registry is meant to be
/// driven from a single configuration thread, or wrapped in a
/// [`RegistryService`](crate::runtime::RegistryService).
#[derive(Debug, Default)]
pub struct ModelRegistry {
    nodes: BTreeMap<ModelPath, ModelNode>,
    coordinator: BindingCoordinator,
}

impl ModelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new node in the `Known` state.
    ///
    /// Waiting untyped references to `path` bind immediately.
    ///
    /// # Errors
    /// - `DuplicateNode`: a node already exists at `path`.
    /// - `MissingParent`: `path` is nested and its parent is not registered.
    /// - `IncompatibleType`: a waiting reference was rejected.
    pub fn register(&mut self, path: ModelPath, creator: Option<RuleDescriptor>) -> ModelResult<()> {
        if self.nodes.contains_key(&path) {
            return Err(GraphError::DuplicateNode { path }.into());
        }
        if let Some(parent) = path.parent() {
            if !parent.is_root() && !self.nodes.contains_key(&parent) {
                return Err(GraphError::MissingParent { path, parent }.into());
            }
        }

        debug!(
            path = %path,
            creator = ?creator.as_ref().map(ToString::to_string),
            "model element registered"
        );
        let node = ModelNode::new(path.clone(), creator);
        let node = self.nodes.entry(path).or_insert(node);
        self.coordinator.notify(node)?;
        Ok(())
    }

    /// Adds views to a node that has not yet reached `ProjectionsDefined`.
    ///
    /// # Errors
    /// - `NodeNotFound`, `ProjectionsClosed`.
    pub fn declare_projections(
        &mut self,
        path: &ModelPath,
        readable: impl IntoIterator<Item = ModelType>,
        writable: impl IntoIterator<Item = ModelType>,
    ) -> ModelResult<()> {
        let node = self.node_mut(path)?;
        node.declare_projections(readable, writable)?;
        Ok(())
    }

    /// Advances a node to `state` and offers it to waiting references.
    ///
    /// # Errors
    /// - `NodeNotFound`, `StateRegression`.
    /// - `IncompatibleType`: a waiting reference was rejected.
    pub fn transition(&mut self, path: &ModelPath, state: NodeState) -> ModelResult<()> {
        let Some(node) = self.nodes.get_mut(path) else {
            return Err(GraphError::NodeNotFound { path: path.clone() }.into());
        };
        if node.advance_to(state)? {
            self.coordinator.notify(node)?;
        }
        Ok(())
    }

    /// Declares a reference on behalf of `referrer`.
    ///
    /// If the target node already exists and its state passes the gate, the
    /// reference is resolved before this returns; otherwise it waits for
    /// the node. `on_bound` runs once, when the reference is resolved.
    ///
    /// # Errors
    /// - `PathRequired`: the predicate has no path.
    /// - `IncompatibleType`: the existing node does not satisfy the reference.
    pub fn bind(
        &mut self,
        referrer: RuleDescriptor,
        predicate: BindingPredicate,
        on_bound: BindAction,
    ) -> ModelResult<BindingId> {
        let path = predicate.path().cloned();
        let id = self
            .coordinator
            .register(PathBinder::new(referrer, predicate, on_bound))?;
        if let Some(node) = path.and_then(|path| self.nodes.get(&path)) {
            self.coordinator.notify(node)?;
        }
        Ok(id)
    }

    /// Looks up a binding declared through [`ModelRegistry::bind`].
    #[must_use]
    pub fn binding(&self, id: BindingId) -> Option<&ModelBinding> {
        self.coordinator.binding(id)
    }

    /// References that have not been resolved, with the rule that declared them.
    #[must_use]
    pub fn unbound_references(&self) -> Vec<(RuleDescriptor, ModelReference)> {
        self.coordinator
            .unbound()
            .map(|b| (b.referrer().clone(), b.predicate().reference().clone()))
            .collect()
    }

    /// Returns the node at `path`.
    #[must_use]
    pub fn node(&self, path: &ModelPath) -> Option<&ModelNode> {
        self.nodes.get(path)
    }

    /// Number of registered nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no node is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Registers a node for `model_type` and constructs its value.
    ///
    /// The factory is checked first: an unknown type fails before the graph
    /// is touched, so no node is registered and no reference is bound.
    ///
    /// The node's promise is `model_type` plus the factory's internal views
    /// for it, readable and writable. The node is advanced to
    /// `ProjectionsDefined` before construction and to `Created` after, so
    /// waiting references bind as soon as the views are known.
    ///
    /// # Errors
    /// - any error of [`ModelRegistry::register`] or [`ModelRegistry::transition`].
    /// - `UnknownType`: the factory has no registration for `model_type`.
    pub fn create_instance<T, P>(
        &mut self,
        path: ModelPath,
        creator: Option<RuleDescriptor>,
        model_type: &ModelType,
        factory: &dyn InstanceFactory<T, P>,
        payload: &P,
    ) -> ModelResult<T> {
        factory.check_supported(model_type)?;

        let views: Vec<ModelType> = std::iter::once(model_type.clone())
            .chain(factory.internal_views(model_type))
            .collect();

        self.register(path.clone(), creator)?;
        self.declare_projections(&path, views.clone(), views)?;
        self.transition(&path, NodeState::ProjectionsDefined)?;

        let instance = {
            let node = self.node_mut(&path)?;
            factory.create(model_type, node, payload)?
        };

        self.transition(&path, NodeState::Created)?;
        Ok(instance)
    }

    /// Captures a serializable view of the graph.
    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        let nodes = self
            .nodes
            .values()
            .map(|node| {
                let promise = node.promise_regardless_of_state();
                NodeSnapshot {
                    path: node.path().clone(),
                    state: node.state(),
                    creator: node.creator().cloned(),
                    readable: promise.readable_type_descriptions(),
                    writable: promise.writable_type_descriptions(),
                }
            })
            .collect();
        let pending_bindings = self
            .coordinator
            .unbound()
            .map(|b| PendingBindingSnapshot {
                id: b.id(),
                referrer: b.referrer().clone(),
                reference: b.predicate().reference().to_string(),
                access: b.predicate().access(),
            })
            .collect();
        GraphSnapshot {
            nodes,
            pending_bindings,
        }
    }

    fn node_mut(&mut self, path: &ModelPath) -> Result<&mut ModelNode, GraphError> {
        self.nodes
            .get_mut(path)
            .ok_or_else(|| GraphError::NodeNotFound { path: path.clone() })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::{BindingError, ModelError, RegistryError, ValidationError};
    use crate::factory::BaseInstanceFactory;

    fn path(p: &str) -> ModelPath {
        ModelPath::parse(p).unwrap()
    }

    fn recorder() -> (BindAction, Arc<Mutex<Vec<ModelPath>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let action: BindAction = Box::new(move |binding| {
            if let Some(p) = binding.bound_to() {
                sink.lock().unwrap().push(p.clone());
            }
        });
        (action, seen)
    }

    #[test]
    fn test_register_rejects_duplicates_and_orphans() {
        let mut registry = ModelRegistry::new();
        registry.register(path("components"), None).unwrap();

        let err = registry.register(path("components"), None).unwrap_err();
        assert!(matches!(err, ModelError::Graph(GraphError::DuplicateNode { .. })));

        let err = registry.register(path("tasks.build"), None).unwrap_err();
        assert!(matches!(err, ModelError::Graph(GraphError::MissingParent { .. })));

        registry.register(path("components.main"), None).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_bind_before_node_exists() {
        let mut registry = ModelRegistry::new();
        let (action, seen) = recorder();
        let id = registry
            .bind(
                RuleDescriptor::simple("rule"),
                BindingPredicate::read(ModelReference::of(path("tasks"), ModelType::named("TaskContainer"))),
                action,
            )
            .unwrap();
        assert_eq!(registry.unbound_references().len(), 1);

        registry.register(path("tasks"), None).unwrap();
        registry
            .declare_projections(&path("tasks"), [ModelType::named("TaskContainer")], Vec::new())
            .unwrap();
        assert!(!registry.binding(id).unwrap().is_bound());

        registry.transition(&path("tasks"), NodeState::ProjectionsDefined).unwrap();
        assert_eq!(registry.binding(id).unwrap().bound_to(), Some(&path("tasks")));
        assert_eq!(*seen.lock().unwrap(), vec![path("tasks")]);
        assert!(registry.unbound_references().is_empty());
    }

    #[test]
    fn test_bind_after_node_exists_resolves_immediately() {
        let mut registry = ModelRegistry::new();
        registry.register(path("tasks"), None).unwrap();

        let (action, seen) = recorder();
        let id = registry
            .bind(
                RuleDescriptor::simple("rule"),
                BindingPredicate::write(ModelReference::of_path(path("tasks"))),
                action,
            )
            .unwrap();
        assert!(registry.binding(id).unwrap().is_bound());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_pathless_reference_rejected() {
        let mut registry = ModelRegistry::new();
        let err = registry
            .bind(
                RuleDescriptor::simple("rule"),
                BindingPredicate::read(ModelReference::of_type(ModelType::named("TaskContainer"))),
                Box::new(|_| {}),
            )
            .unwrap_err();
        assert!(matches!(err, ModelError::Validation(ValidationError::PathRequired { .. })));
    }

    #[test]
    fn test_incompatible_reference_surfaces_on_transition() {
        let mut registry = ModelRegistry::new();
        registry
            .register(path("tasks"), Some(RuleDescriptor::simple("TaskRules#tasks")))
            .unwrap();
        registry
            .declare_projections(&path("tasks"), [ModelType::named("TaskContainer")], Vec::new())
            .unwrap();
        registry
            .bind(
                RuleDescriptor::simple("MyRules#mutate"),
                BindingPredicate::write(ModelReference::of(path("tasks"), ModelType::named("TaskContainer"))),
                Box::new(|_| {}),
            )
            .unwrap();

        let err = registry
            .transition(&path("tasks"), NodeState::ProjectionsDefined)
            .unwrap_err();
        let ModelError::Binding(BindingError::IncompatibleType(report)) = err else {
            panic!("expected incompatible type");
        };
        assert_eq!(report.creator, Some(RuleDescriptor::simple("TaskRules#tasks")));
        assert_eq!(report.referrer, RuleDescriptor::simple("MyRules#mutate"));
        assert_eq!(registry.node(&path("tasks")).unwrap().state(), NodeState::ProjectionsDefined);
    }

    #[test]
    fn test_create_instance_exposes_internal_views() {
        let spec = ModelType::named("LibrarySpec");
        let internal = ModelType::named("LibrarySpecInternal");
        let mut factory: BaseInstanceFactory<String, String> = BaseInstanceFactory::new("components");
        factory
            .register_factory(spec.clone(), None, Box::new(|name, node| format!("{name} at {}", node.path())))
            .unwrap();
        factory.register_internal_view(&spec, None, internal.clone());

        let mut registry = ModelRegistry::new();
        registry.register(path("components"), None).unwrap();
        let (action, seen) = recorder();
        registry
            .bind(
                RuleDescriptor::simple("internal rule"),
                BindingPredicate::write(ModelReference::of(path("components.main"), internal)),
                action,
            )
            .unwrap();

        let value = registry
            .create_instance(path("components.main"), None, &spec, &factory, &"main".to_string())
            .unwrap();
        assert_eq!(value, "main at components.main");
        assert_eq!(registry.node(&path("components.main")).unwrap().state(), NodeState::Created);
        assert_eq!(*seen.lock().unwrap(), vec![path("components.main")]);
    }

    #[test]
    fn test_create_instance_unknown_type() {
        let factory: BaseInstanceFactory<String, ()> = BaseInstanceFactory::new("components");
        let mut registry = ModelRegistry::new();
        let err = registry
            .create_instance(path("widget"), None, &ModelType::named("Widget"), &factory, &())
            .unwrap_err();
        assert!(err.is_registry());
        assert!(err.to_string().contains("(None)"));
    }

    #[test]
    fn test_unknown_type_leaves_graph_untouched() {
        let widget = ModelType::named("Widget");
        let mut registry = ModelRegistry::new();
        let (action, seen) = recorder();
        let id = registry
            .bind(
                RuleDescriptor::simple("reader"),
                BindingPredicate::read(ModelReference::of(path("widget"), widget.clone())),
                action,
            )
            .unwrap();

        let mut factory: BaseInstanceFactory<String, ()> = BaseInstanceFactory::new("widgets");
        let err = registry
            .create_instance(path("widget"), None, &widget, &factory, &())
            .unwrap_err();
        assert!(matches!(err, ModelError::Registry(RegistryError::UnknownType { .. })));
        assert!(registry.node(&path("widget")).is_none());
        assert!(seen.lock().unwrap().is_empty());
        assert!(!registry.binding(id).unwrap().is_bound());

        factory
            .register_factory(widget.clone(), None, Box::new(|_, _| "widget".to_string()))
            .unwrap();
        let value = registry
            .create_instance(path("widget"), None, &widget, &factory, &())
            .unwrap();
        assert_eq!(value, "widget");
        assert_eq!(*seen.lock().unwrap(), vec![path("widget")]);
    }

    #[test]
    fn test_snapshot_lists_nodes_and_pending() {
        let mut registry = ModelRegistry::new();
        registry.register(path("tasks"), None).unwrap();
        registry
            .bind(
                RuleDescriptor::simple("rule"),
                BindingPredicate::read(ModelReference::of_path(path("components"))),
                Box::new(|_| {}),
            )
            .unwrap();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.nodes.len(), 1);
        assert_eq!(snapshot.nodes[0].state, NodeState::Known);
        assert_eq!(snapshot.pending_bindings.len(), 1);
        assert_eq!(snapshot.pending_bindings[0].reference, "'components'");
    }
}
