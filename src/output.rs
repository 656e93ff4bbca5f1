//! Output types for the display layer.
//!
//! These structs are serialized to JSON and handed to the front-end, which
//! turns positions and edges into pixels.

use serde::Serialize;

use crate::error::LayoutError;
use crate::model::{NodeId, PointI};

/// A positioned conversation node ready to draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeOutput {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub prompt: String,
    pub response: String,
    /// Top-left corner (locked anchor shifted left by half the node width)
    pub position: PointI,
    pub is_active: bool,
    /// On the root -> active node path
    pub on_active_path: bool,
}

/// A parent -> child edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeOutput {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    /// Highlighted when the target is the active node
    pub animated: bool,
}

/// Projection of one layout pass. Owns no state of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderGraph {
    pub nodes: Vec<NodeOutput>,
    pub edges: Vec<EdgeOutput>,
}

impl RenderGraph {
    pub fn node(&self, id: &str) -> Option<&NodeOutput> {
        self.nodes.iter().find(|n| n.id.as_str() == id)
    }
}

/// Error information for the display layer
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub message: String,
    /// Offending node id, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeId>,
}

impl From<&LayoutError> for ErrorInfo {
    fn from(e: &LayoutError) -> Self {
        let node = match e {
            LayoutError::DanglingParent { node, .. }
            | LayoutError::DuplicateNode(node)
            | LayoutError::ParentCycle(node)
            | LayoutError::UnknownNode(node)
            | LayoutError::RekeyTargetExists(node) => Some(node.clone()),
            LayoutError::Json(_) => None,
        };
        ErrorInfo { message: e.to_string(), node }
    }
}

/// The combined output sent to the front-end
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphOutput {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<EdgeOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl GraphOutput {
    pub fn from_result(result: Result<RenderGraph, LayoutError>) -> Self {
        match result {
            Ok(graph) => GraphOutput { nodes: graph.nodes, edges: graph.edges, error: None },
            Err(e) => GraphOutput { error: Some(ErrorInfo::from(&e)), ..GraphOutput::default() },
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!("{{\"error\":{{\"message\":{:?}}}}}", e.to_string())
        })
    }
}
