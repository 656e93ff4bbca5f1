//! Branch context: the conversation history seen by a node.
//!
//! The backend sends the model only the exchanges on the path from the root
//! to the node being branched from, so each branch keeps its own memory.

use serde::Serialize;

use super::{NodeId, TreeGraph, TreeSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextMessage {
    /// "user" or "model"
    pub role: &'static str,
    pub content: String,
}

/// User/model message pairs for every node from the root down to `id`.
/// Returns an empty history for unknown ids.
pub fn branch_context(snapshot: &TreeSnapshot, graph: &TreeGraph, id: &NodeId) -> Vec<ContextMessage> {
    let mut messages = Vec::new();
    for step in graph.path_to_root(id) {
        if let Some(node) = snapshot.get(&step) {
            messages.push(ContextMessage { role: "user", content: node.prompt.clone() });
            messages.push(ContextMessage { role: "model", content: node.response.clone() });
        }
    }
    messages
}
