//! Model graph nodes.

use tracing::debug;

use crate::descriptor::RuleDescriptor;
use crate::error::GraphError;
use crate::model_type::ModelType;
use crate::path::ModelPath;
use crate::promise::ModelPromise;
use crate::state::NodeState;

/// What binding needs to know about a node.
pub trait GraphNode {
    /// Address of the node.
    fn path(&self) -> &ModelPath;

    /// Current lifecycle state.
    fn state(&self) -> NodeState;

    /// The node's promise, whatever its state.
    fn promise_regardless_of_state(&self) -> &ModelPromise;

    /// The rule that registered the node, if known.
    fn creator(&self) -> Option<&RuleDescriptor>;
}

/// A node in the model graph.
#[derive(Debug, Clone)]
pub struct ModelNode {
    path: ModelPath,
    state: NodeState,
    creator: Option<RuleDescriptor>,
    promise: ModelPromise,
}

impl ModelNode {
    /// Creates a node in the `Known` state with no views.
    #[must_use]
    pub fn new(path: ModelPath, creator: Option<RuleDescriptor>) -> Self {
        Self {
            path,
            state: NodeState::Known,
            creator,
            promise: ModelPromise::default(),
        }
    }

    /// Adds views the node's value can be read and mutated as.
    ///
    /// # Errors
    /// - `ProjectionsClosed`: the node has reached `ProjectionsDefined`.
    pub fn declare_projections(
        &mut self,
        readable: impl IntoIterator<Item = ModelType>,
        writable: impl IntoIterator<Item = ModelType>,
    ) -> Result<(), GraphError> {
        if self.state.is_at_least(NodeState::ProjectionsDefined) {
            return Err(GraphError::ProjectionsClosed {
                path: self.path.clone(),
                state: self.state,
            });
        }
        self.promise.add_readable(readable);
        self.promise.add_writable(writable);
        Ok(())
    }

    /// Moves the node forward to `state`.
    ///
    /// Returns true if the state changed; advancing to the current state is
    /// a no-op.
    ///
    /// # Errors
    /// - `StateRegression`: `state` precedes the current state.
    pub fn advance_to(&mut self, state: NodeState) -> Result<bool, GraphError> {
        if state < self.state {
            return Err(GraphError::StateRegression {
                path: self.path.clone(),
                current: self.state,
                requested: state,
            });
        }
        if state == self.state {
            return Ok(false);
        }
        debug!(path = %self.path, from = %self.state, to = %state, "model node state advanced");
        self.state = state;
        Ok(true)
    }
}

impl GraphNode for ModelNode {
    fn path(&self) -> &ModelPath {
        &self.path
    }

    fn state(&self) -> NodeState {
        self.state
    }

    fn promise_regardless_of_state(&self) -> &ModelPromise {
        &self.promise
    }

    fn creator(&self) -> Option<&RuleDescriptor> {
        self.creator.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> ModelNode {
        ModelNode::new(ModelPath::parse("tasks").unwrap(), None)
    }

    #[test]
    fn test_state_only_moves_forward() {
        let mut n = node();
        assert!(n.advance_to(NodeState::Created).unwrap());
        assert!(!n.advance_to(NodeState::Created).unwrap());

        let err = n.advance_to(NodeState::Known).unwrap_err();
        assert!(matches!(
            err,
            GraphError::StateRegression { current: NodeState::Created, requested: NodeState::Known, .. }
        ));
        assert_eq!(n.state(), NodeState::Created);
    }

    #[test]
    fn test_projections_fixed_after_milestone() {
        let mut n = node();
        n.declare_projections([ModelType::named("TaskContainer")], Vec::new()).unwrap();
        n.advance_to(NodeState::ProjectionsDefined).unwrap();

        let err = n.declare_projections([ModelType::named("Other")], Vec::new()).unwrap_err();
        assert!(matches!(err, GraphError::ProjectionsClosed { .. }));
        assert_eq!(n.promise_regardless_of_state().readable_type_descriptions(), vec!["TaskContainer"]);
    }
}
