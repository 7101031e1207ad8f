//! The model node graph.
//!
//! Nodes are addressed by [`ModelPath`](crate::ModelPath) and move through
//! [`NodeState`](crate::NodeState) in order. The registry notifies the
//! binding coordinator whenever a node appears or advances.

/// Dispatch of node events to waiting references.
pub mod coordinator;
/// Graph nodes and the contract binding relies on.
pub mod node;
/// The registry owning nodes and bindings.
pub mod registry;
/// Serializable snapshots.
pub mod snapshot;

pub use coordinator::BindingCoordinator;
pub use node::{GraphNode, ModelNode};
pub use registry::ModelRegistry;
pub use snapshot::{GraphSnapshot, NodeSnapshot, PendingBindingSnapshot};
