use thiserror::Error;

use crate::model::NodeId;

pub type Result<T> = std::result::Result<T, LayoutError>;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("node '{node}' references missing parent '{parent}'")]
    DanglingParent { node: NodeId, parent: NodeId },

    #[error("node id '{0}' appears more than once")]
    DuplicateNode(NodeId),

    #[error("parent chain of node '{0}' loops back on itself")]
    ParentCycle(NodeId),

    #[error("node '{0}' not found")]
    UnknownNode(NodeId),

    #[error("cannot rekey to '{0}': id already in use")]
    RekeyTargetExists(NodeId),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
