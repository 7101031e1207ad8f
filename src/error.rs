//! Error types for rulegraph.
//!
//! Errors are grouped by the component that raises them and unified under
//! [`ModelError`]. Every error is raised synchronously at the point of
//! violation; nothing in this crate retries.

use thiserror::Error;

use crate::binding::IncompatibleTypeReport;
use crate::descriptor::RuleDescriptor;
use crate::path::ModelPath;
use crate::state::NodeState;

/// Validation errors for malformed input.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid model path '{path}': {reason}")]
    InvalidPath {
        path: String,
        reason: String,
    },

    #[error("Reference {reference} declared by {referrer} has no path; type-only references are not bound by path")]
    PathRequired {
        reference: String,
        referrer: RuleDescriptor,
    },

    #[error("Rule description cannot be empty")]
    EmptyDescription,

    #[error("Build lifecycle event {actual} cannot follow {previous}")]
    LifecycleOutOfOrder {
        previous: String,
        actual: String,
    },
}

/// Errors raised by an instance factory registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(
        "Cannot register a factory for type {type_name} because a factory for this type was already registered{}.",
        registered_by(.existing_rule)
    )]
    DuplicateRegistration {
        type_name: String,
        existing_rule: Option<RuleDescriptor>,
    },

    #[error(
        "Cannot create a {type_name} because this type is not known to {registry}. Known types are: {}",
        format_type_names(.supported)
    )]
    UnknownType {
        type_name: String,
        registry: String,
        /// Simple names of the supported types, sorted.
        supported: Vec<String>,
    },
}

/// Errors raised while resolving a rule reference.
#[derive(Debug, Error)]
pub enum BindingError {
    /// Internal consistency violation: a reference was resolved twice.
    #[error("Reference {reference} for {referrer} is already bound to {bound_to}.")]
    AlreadyBound {
        reference: String,
        referrer: RuleDescriptor,
        bound_to: ModelPath,
    },

    #[error("{0}")]
    IncompatibleType(Box<IncompatibleTypeReport>),
}

/// Errors raised by the model node graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Model element not found: '{path}'")]
    NodeNotFound {
        path: ModelPath,
    },

    #[error("Cannot register model element '{path}' because an element with this path already exists")]
    DuplicateNode {
        path: ModelPath,
    },

    #[error("Cannot register model element '{path}' because its parent '{parent}' does not exist")]
    MissingParent {
        path: ModelPath,
        parent: ModelPath,
    },

    #[error("Cannot move model element '{path}' from state {current} back to {requested}")]
    StateRegression {
        path: ModelPath,
        current: NodeState,
        requested: NodeState,
    },

    #[error("Cannot declare views for model element '{path}' in state {state}; views are fixed once projections are defined")]
    ProjectionsClosed {
        path: ModelPath,
        state: NodeState,
    },
}

/// Errors from the single-writer registry service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Registry service channel disconnected: {path}")]
    Disconnected {
        path: String,
    },

    #[error("Registry service queue full (capacity {capacity})")]
    QueueFull {
        capacity: usize,
    },

    #[error("Failed to spawn registry service thread: {reason}")]
    SpawnFailed {
        reason: String,
    },
}

/// Top-level error type for rulegraph.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Binding error: {0}")]
    Binding(#[from] BindingError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl ModelError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a registry error.
    #[must_use]
    pub const fn is_registry(&self) -> bool {
        matches!(self, Self::Registry(_))
    }

    /// Returns true if this is a binding error.
    #[must_use]
    pub const fn is_binding(&self) -> bool {
        matches!(self, Self::Binding(_))
    }

    /// Returns true if this is a graph error.
    #[must_use]
    pub const fn is_graph(&self) -> bool {
        matches!(self, Self::Graph(_))
    }

    /// Returns true if the error describes a mistake in build configuration
    /// that should be reported against the offending rule.
    ///
    /// `AlreadyBound`, service failures and internal errors are defects in
    /// the caller, not in the configuration.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Registry(_) | Self::Graph(_) => true,
            Self::Binding(e) => matches!(e, BindingError::IncompatibleType(_)),
            Self::Service(_) | Self::Serialization { .. } | Self::Internal { .. } => false,
        }
    }
}

/// Result type alias for rulegraph operations.
pub type ModelResult<T> = Result<T, ModelError>;

fn registered_by(rule: &Option<RuleDescriptor>) -> String {
    match rule {
        Some(rule) => format!(" by {rule}"),
        None => String::new(),
    }
}

pub(crate) fn format_type_names(names: &[String]) -> String {
    if names.is_empty() {
        "(None)".to_string()
    } else {
        names.join(", ")
    }
}
