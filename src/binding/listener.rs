//! Creation listeners.
//!
//! The graph notifies listeners as nodes appear or advance. A listener is
//! only handed a node once its [`CreationListener::can_bind_in_state`] gate
//! accepts the node's state; the gate is evaluated by the dispatcher.

use tracing::{debug, warn};

use crate::descriptor::RuleDescriptor;
use crate::error::BindingError;
use crate::graph::GraphNode;
use crate::path::ModelPath;
use crate::state::NodeState;

use super::model_binding::ModelBinding;
use super::predicate::BindingPredicate;
use super::report::IncompatibleTypeReport;

/// Callback run once a binding has been sealed to its node.
pub type BindAction = Box<dyn FnMut(&ModelBinding) + Send>;

/// Observes node creation and state transitions.
pub trait CreationListener {
    /// Returns true if a node in `state` may be offered to this listener.
    fn can_bind_in_state(&self, state: NodeState) -> bool;

    /// Attempts to resolve against `node`.
    ///
    /// # Errors
    /// - `AlreadyBound`: the listener was resolved before.
    /// - `IncompatibleType`: the node's promise does not satisfy the reference.
    fn on_create(&mut self, node: &dyn GraphNode) -> Result<(), BindingError>;
}

/// Resolves a path reference against the node at that path.
pub struct PathBinder {
    binding: ModelBinding,
    bind_action: BindAction,
}

impl PathBinder {
    /// Creates a listener for a new, unbound binding.
    #[must_use]
    pub fn new(referrer: RuleDescriptor, predicate: BindingPredicate, bind_action: BindAction) -> Self {
        Self {
            binding: ModelBinding::new(referrer, predicate),
            bind_action,
        }
    }

    /// The binding this listener resolves.
    #[must_use]
    pub const fn binding(&self) -> &ModelBinding {
        &self.binding
    }

    /// Path this listener waits for.
    #[must_use]
    pub fn target_path(&self) -> Option<&ModelPath> {
        self.binding.predicate().path()
    }

    /// Consumes the listener, returning its binding.
    #[must_use]
    pub fn into_binding(self) -> ModelBinding {
        self.binding
    }
}

impl CreationListener for PathBinder {
    fn can_bind_in_state(&self, state: NodeState) -> bool {
        // Typed references must wait for the node's views to be final.
        if self.binding.predicate().is_untyped() {
            return true;
        }
        state.is_at_least(NodeState::ProjectionsDefined)
    }

    fn on_create(&mut self, node: &dyn GraphNode) -> Result<(), BindingError> {
        self.binding.check_unbound()?;

        let promise = node.promise_regardless_of_state();
        if !self.binding.is_type_compatible(promise) {
            let report = IncompatibleTypeReport::of(
                self.binding.referrer(),
                node.path(),
                node.creator(),
                promise,
                self.binding.predicate(),
            );
            warn!(
                referrer = %self.binding.referrer(),
                path = %node.path(),
                requested = %report.requested_type,
                writable = report.writable,
                "model reference rejected: incompatible types"
            );
            return Err(BindingError::IncompatibleType(Box::new(report)));
        }

        self.binding.bind_to(node.path())?;
        debug!(
            binding = %self.binding.id(),
            referrer = %self.binding.referrer(),
            path = %node.path(),
            state = %node.state(),
            "model reference bound"
        );
        (self.bind_action)(&self.binding);
        Ok(())
    }
}

impl std::fmt::Debug for PathBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathBinder")
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}
