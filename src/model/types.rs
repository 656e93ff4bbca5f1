use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a conversation node.
///
/// Freshly submitted prompts carry a temporary id until the backend answers;
/// the swap to the permanent id goes through `LayoutSession::rekey`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointI {
    pub x: i32,
    pub y: i32,
}

impl PointI {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn shifted(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x.saturating_add(dx), y: self.y.saturating_add(dy) }
    }
}

/// One prompt/response exchange in the conversation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatNode {
    pub id: NodeId,
    /// None => root of a conversation
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub response: String,
    /// Creation time in milliseconds. Only used to order placement.
    pub timestamp: i64,
}

impl ChatNode {
    pub fn new(id: impl Into<NodeId>, parent_id: Option<NodeId>, timestamp: i64) -> Self {
        Self {
            id: id.into(),
            parent_id,
            prompt: String::new(),
            response: String::new(),
            timestamp,
        }
    }

    pub fn with_content(mut self, prompt: impl Into<String>, response: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self.response = response.into();
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Full tree as delivered by the backend after every round-trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    #[serde(default)]
    pub nodes: Vec<ChatNode>,
    #[serde(default)]
    pub active_id: Option<NodeId>,
}

impl TreeSnapshot {
    pub fn new(nodes: Vec<ChatNode>, active_id: Option<NodeId>) -> Self {
        Self { nodes, active_id }
    }

    pub fn get(&self, id: &NodeId) -> Option<&ChatNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.iter().any(|n| &n.id == id)
    }

    /// Most recently created node, ties broken by id like the layout order.
    pub fn latest(&self) -> Option<&ChatNode> {
        self.nodes
            .iter()
            .max_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_backend_json() {
        let json = r#"{
            "nodes": [
                {"id": "1", "parent_id": null, "prompt": "hi", "response": "hello", "timestamp": 10},
                {"id": "2", "parent_id": "1", "prompt": "more", "response": "sure", "timestamp": 20}
            ],
            "active_id": "2"
        }"#;
        let snapshot: TreeSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes[1].parent_id, Some(NodeId::from("1")));
        assert_eq!(snapshot.active_id, Some(NodeId::from("2")));
    }

    #[test]
    fn test_latest_breaks_ties_by_id() {
        let snapshot = TreeSnapshot::new(
            vec![
                ChatNode::new("a", None, 5),
                ChatNode::new("c", Some("a".into()), 7),
                ChatNode::new("b", Some("a".into()), 7),
            ],
            None,
        );
        assert_eq!(snapshot.latest().map(|n| n.id.as_str()), Some("c"));
    }
}
