//! # rulegraph - A rule-based model registry
//!
//! Build configuration is expressed as a graph of model elements created and
//! mutated by rules. Each element lives at a [`ModelPath`], advances through
//! [`NodeState`]s, and promises a set of readable and writable views. Rules
//! declare what they need as references; the registry binds each reference
//! to its element once the element has advanced far enough for the request
//! to be checked.
//!
//! ## Core Concepts
//!
//! - **Instance factory**: maps a declared [`ModelType`] to one construction function
//! - **Model promise**: the views an element will expose, known before it exists
//! - **Binding**: one rule's reference to one element, unbound until resolved
//! - **Creation listener**: waits on a path and binds when the node is ready
//!
//! ## Usage
//!
//! ```rust
//! use rulegraph::{
//!     BaseInstanceFactory, BindingPredicate, InstanceFactory, ModelPath, ModelReference,
//!     ModelRegistry, ModelType, RuleDescriptor,
//! };
//!
//! let container = ModelType::named("TaskContainer");
//! let mut factory: BaseInstanceFactory<Vec<String>, ()> = BaseInstanceFactory::new("tasks");
//! factory
//!     .register_factory(container.clone(), None, Box::new(|_, _| Vec::new()))
//!     .unwrap();
//!
//! let tasks = ModelPath::parse("tasks").unwrap();
//! let mut registry = ModelRegistry::new();
//! let id = registry
//!     .bind(
//!         RuleDescriptor::simple("MyRules#addTasks"),
//!         BindingPredicate::write(ModelReference::of(tasks.clone(), container.clone())),
//!         Box::new(|_| {}),
//!     )
//!     .unwrap();
//!
//! registry.create_instance(tasks.clone(), None, &container, &factory, &()).unwrap();
//! assert_eq!(registry.binding(id).unwrap().bound_to(), Some(&tasks));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod descriptor;
pub mod error;
pub mod model_type;
pub mod path;
pub mod promise;
pub mod state;

// Factories, bindings and the graph
pub mod binding;
pub mod factory;
pub mod graph;

// Build lifecycle and threading
pub mod lifecycle;
pub mod runtime;

pub use descriptor::RuleDescriptor;
pub use error::{
    BindingError, GraphError, ModelError, ModelResult, RegistryError, ServiceError,
    ValidationError,
};
pub use model_type::{ModelType, TypeKey};
pub use path::ModelPath;
pub use promise::ModelPromise;
pub use state::NodeState;

pub use binding::{
    AccessMode, BindAction, BindingId, BindingPredicate, BindingState, CreationListener,
    IncompatibleTypeReport, ModelBinding, ModelReference, PathBinder,
};
pub use factory::{BaseInstanceFactory, FactoryFn, InstanceFactory};
pub use graph::{
    BindingCoordinator, GraphNode, GraphSnapshot, ModelNode, ModelRegistry, NodeSnapshot,
    PendingBindingSnapshot,
};

pub use lifecycle::{BuildListener, BuildListenerBroadcast, BuildPhase, BuildResult};
pub use runtime::{RegistryService, RegistryServiceConfig};
