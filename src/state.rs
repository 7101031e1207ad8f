//! Node lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Readiness of a model node.
///
/// States are totally ordered and a node only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    /// The node's path is known; nothing else is.
    Known,
    /// The views the node can be read and mutated as are final.
    ProjectionsDefined,
    /// The node's value has been constructed.
    Created,
    /// Default values have been applied.
    DefaultsApplied,
    /// Initialization rules have run.
    Initialized,
    /// Mutation rules have run.
    Mutated,
    /// Finalization rules have run.
    Finalized,
    /// The node itself accepts no more mutation.
    SelfClosed,
    /// The node and all its descendants accept no more mutation.
    GraphClosed,
}

impl NodeState {
    /// All states, in lifecycle order.
    pub const ALL: [NodeState; 9] = [
        Self::Known,
        Self::ProjectionsDefined,
        Self::Created,
        Self::DefaultsApplied,
        Self::Initialized,
        Self::Mutated,
        Self::Finalized,
        Self::SelfClosed,
        Self::GraphClosed,
    ];

    /// Returns the following state, or `None` for `GraphClosed`.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        let idx = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(idx + 1).copied()
    }

    /// Returns true if this state is `milestone` or later.
    #[must_use]
    pub fn is_at_least(self, milestone: Self) -> bool {
        self >= milestone
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Known => "Known",
            Self::ProjectionsDefined => "ProjectionsDefined",
            Self::Created => "Created",
            Self::DefaultsApplied => "DefaultsApplied",
            Self::Initialized => "Initialized",
            Self::Mutated => "Mutated",
            Self::Finalized => "Finalized",
            Self::SelfClosed => "SelfClosed",
            Self::GraphClosed => "GraphClosed",
        };
        f.write_str(name)
    }
}
