//! Serializable graph snapshots for reports and debugging.

use serde::{Deserialize, Serialize};

use crate::binding::{AccessMode, BindingId};
use crate::descriptor::RuleDescriptor;
use crate::error::{ModelError, ModelResult};
use crate::path::ModelPath;
use crate::state::NodeState;

/// One node in a [`GraphSnapshot`].
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub path: ModelPath,
    pub state: NodeState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<RuleDescriptor>,
    pub readable: Vec<String>,
    pub writable: Vec<String>,
}

/// A reference still waiting for its node.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBindingSnapshot {
    pub id: BindingId,
    pub referrer: RuleDescriptor,
    pub reference: String,
    pub access: AccessMode,
}

/// Point-in-time view of a [`ModelRegistry`](super::ModelRegistry).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Nodes ordered by path.
    pub nodes: Vec<NodeSnapshot>,
    /// Unresolved references ordered by target path.
    pub pending_bindings: Vec<PendingBindingSnapshot>,
}

impl GraphSnapshot {
    /// Renders the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> ModelResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ModelError::Serialization {
            message: e.to_string(),
        })
    }

    /// Parses a snapshot previously rendered by [`GraphSnapshot::to_json`].
    pub fn from_json(json: &str) -> ModelResult<Self> {
        serde_json::from_str(json).map_err(|e| ModelError::Serialization {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let snapshot = GraphSnapshot {
            nodes: vec![NodeSnapshot {
                path: ModelPath::parse("tasks").unwrap(),
                state: NodeState::ProjectionsDefined,
                creator: None,
                readable: vec!["TaskContainer".to_string()],
                writable: Vec::new(),
            }],
            pending_bindings: Vec::new(),
        };

        let json = snapshot.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["nodes"][0]["path"], "tasks");
        assert_eq!(value["nodes"][0]["state"], "projections_defined");
        assert!(value["nodes"][0].get("creator").is_none());

        assert_eq!(GraphSnapshot::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn test_from_json_rejects_invalid_path() {
        let json = r#"{"nodes":[{"path":"a..b","state":"known","readable":[],"writable":[]}],"pending_bindings":[]}"#;
        let err = GraphSnapshot::from_json(json).unwrap_err();
        assert!(matches!(err, ModelError::Serialization { .. }));
    }
}
