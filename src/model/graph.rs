// Graph derivation for conversation trees.
//
// Turns the flat node list of a snapshot into the structures the layout
// queries over and over:
// 1. Chronological order (placement order, ties broken by id)
// 2. Parent -> children adjacency, children in creation order
// 3. Root set (a forest is allowed)
// 4. Descendant / ancestor / active-path walks
//
// Building validates the snapshot. An inconsistent tree is rejected as a
// whole; nothing downstream ever sees a dangling parent or a cycle.

use std::collections::HashMap;

use super::{NodeId, TreeSnapshot};
use crate::error::{LayoutError, Result};

/// Read-only adjacency view of one snapshot.
#[derive(Debug, Clone)]
pub struct TreeGraph {
    /// All node ids, ascending (timestamp, id).
    order: Vec<NodeId>,
    /// Position of each id in `order`.
    rank: HashMap<NodeId, usize>,
    parent: HashMap<NodeId, Option<NodeId>>,
    /// Direct children per node, in creation order. Leaves have no entry.
    children: HashMap<NodeId, Vec<NodeId>>,
    roots: Vec<NodeId>,
}

impl TreeGraph {
    pub fn build(snapshot: &TreeSnapshot) -> Result<Self> {
        let mut sorted: Vec<_> = snapshot.nodes.iter().collect();
        sorted.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

        let mut order = Vec::with_capacity(sorted.len());
        let mut rank = HashMap::with_capacity(sorted.len());
        let mut parent = HashMap::with_capacity(sorted.len());

        for (i, node) in sorted.iter().enumerate() {
            if rank.insert(node.id.clone(), i).is_some() {
                return Err(LayoutError::DuplicateNode(node.id.clone()));
            }
            order.push(node.id.clone());
            parent.insert(node.id.clone(), node.parent_id.clone());
        }

        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut roots = Vec::new();

        // Iterating in chronological order keeps every child list sorted.
        for node in &sorted {
            match &node.parent_id {
                Some(p) if !rank.contains_key(p) => {
                    return Err(LayoutError::DanglingParent {
                        node: node.id.clone(),
                        parent: p.clone(),
                    });
                }
                Some(p) => children.entry(p.clone()).or_default().push(node.id.clone()),
                None => roots.push(node.id.clone()),
            }
        }

        let graph = Self { order, rank, parent, children, roots };
        graph.check_acyclic()?;

        if let Some(active) = &snapshot.active_id {
            if !graph.contains(active) {
                return Err(LayoutError::UnknownNode(active.clone()));
            }
        }

        Ok(graph)
    }

    /// Every parent chain must reach a root within `len` steps.
    fn check_acyclic(&self) -> Result<()> {
        let limit = self.order.len();
        for id in &self.order {
            let mut current = id;
            let mut steps = 0;
            while let Some(Some(p)) = self.parent.get(current) {
                steps += 1;
                if steps > limit {
                    return Err(LayoutError::ParentCycle(id.clone()));
                }
                current = p;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.rank.contains_key(id)
    }

    /// All ids in placement order.
    pub fn chronological(&self) -> &[NodeId] {
        &self.order
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn parent(&self, id: &NodeId) -> Option<&NodeId> {
        self.parent.get(id).and_then(|p| p.as_ref())
    }

    /// Direct children in creation order, or empty slice for leaves.
    pub fn children(&self, id: &NodeId) -> &[NodeId] {
        self.children.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Nodes sharing this node's parent, excluding the node itself.
    /// Roots count as siblings of each other.
    pub fn siblings(&self, id: &NodeId) -> Vec<NodeId> {
        let group = match self.parent(id) {
            Some(p) => self.children(p),
            None => self.roots.as_slice(),
        };
        group.iter().filter(|s| *s != id).cloned().collect()
    }

    /// Rank among siblings by creation order (0 = first child).
    pub fn sibling_index(&self, id: &NodeId) -> usize {
        let group = match self.parent(id) {
            Some(p) => self.children(p),
            None => self.roots.as_slice(),
        };
        group.iter().position(|s| s == id).unwrap_or(0)
    }

    /// Full descendant set, pre-order. Uses an explicit stack so deep
    /// conversations cannot exhaust the call stack.
    pub fn descendants(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<&NodeId> = self.children(id).iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next.clone());
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    /// Ancestors of a node, nearest first.
    pub fn ancestors(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent(current) {
            out.push(p.clone());
            current = p;
        }
        out
    }

    /// Ids from the root down to `id`, inclusive.
    pub fn path_to_root(&self, id: &NodeId) -> Vec<NodeId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut path = self.ancestors(id);
        path.reverse();
        path.push(id.clone());
        path
    }

    /// Whether `id` lies between a root and the active node (inclusive).
    pub fn is_on_active_path(&self, id: &NodeId, active: Option<&NodeId>) -> bool {
        let Some(mut current) = active else {
            return false;
        };
        loop {
            if current == id {
                return true;
            }
            match self.parent(current) {
                Some(p) => current = p,
                None => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChatNode;

    fn node(id: &str, parent: Option<&str>, ts: i64) -> ChatNode {
        ChatNode::new(id, parent.map(NodeId::from), ts)
    }

    fn make_test_tree() -> TreeSnapshot {
        // r -> a -> c
        //   -> b -> d
        //        -> e
        TreeSnapshot::new(
            vec![
                node("e", Some("b"), 6),
                node("r", None, 1),
                node("b", Some("r"), 3),
                node("a", Some("r"), 2),
                node("c", Some("a"), 4),
                node("d", Some("b"), 5),
            ],
            Some("d".into()),
        )
    }

    fn ids(v: &[NodeId]) -> Vec<&str> {
        v.iter().map(|id| id.as_str()).collect()
    }

    #[test]
    fn test_children_follow_creation_order() {
        let graph = TreeGraph::build(&make_test_tree()).unwrap();

        assert_eq!(ids(graph.chronological()), ["r", "a", "b", "c", "d", "e"]);
        assert_eq!(ids(graph.children(&"r".into())), ["a", "b"]);
        assert_eq!(ids(graph.children(&"b".into())), ["d", "e"]);
        assert!(graph.children(&"c".into()).is_empty());
        assert_eq!(ids(graph.roots()), ["r"]);
        assert_eq!(graph.sibling_index(&"e".into()), 1);
        assert_eq!(ids(&graph.siblings(&"a".into())), ["b"]);
    }

    #[test]
    fn test_descendants_and_ancestors() {
        let graph = TreeGraph::build(&make_test_tree()).unwrap();

        assert_eq!(ids(&graph.descendants(&"r".into())), ["a", "c", "b", "d", "e"]);
        assert_eq!(ids(&graph.descendants(&"b".into())), ["d", "e"]);
        assert!(graph.descendants(&"e".into()).is_empty());
        assert_eq!(ids(&graph.ancestors(&"e".into())), ["b", "r"]);
        assert_eq!(ids(&graph.path_to_root(&"e".into())), ["r", "b", "e"]);
    }

    #[test]
    fn test_active_path() {
        let snapshot = make_test_tree();
        let graph = TreeGraph::build(&snapshot).unwrap();
        let active = snapshot.active_id.as_ref();

        assert!(graph.is_on_active_path(&"r".into(), active));
        assert!(graph.is_on_active_path(&"b".into(), active));
        assert!(graph.is_on_active_path(&"d".into(), active));
        assert!(!graph.is_on_active_path(&"a".into(), active));
        assert!(!graph.is_on_active_path(&"e".into(), active));
        assert!(!graph.is_on_active_path(&"r".into(), None));
    }

    #[test]
    fn test_rejects_dangling_parent() {
        let snapshot = TreeSnapshot::new(vec![node("r", None, 1), node("x", Some("ghost"), 2)], None);
        let err = TreeGraph::build(&snapshot).unwrap_err();
        assert!(matches!(err, LayoutError::DanglingParent { .. }));
    }

    #[test]
    fn test_rejects_duplicate_and_cycle() {
        let dup = TreeSnapshot::new(vec![node("r", None, 1), node("r", None, 2)], None);
        assert!(matches!(TreeGraph::build(&dup), Err(LayoutError::DuplicateNode(_))));

        let cycle = TreeSnapshot::new(vec![node("a", Some("b"), 1), node("b", Some("a"), 2)], None);
        assert!(matches!(TreeGraph::build(&cycle), Err(LayoutError::ParentCycle(_))));
    }

    #[test]
    fn test_rejects_unknown_active() {
        let snapshot = TreeSnapshot::new(vec![node("r", None, 1)], Some("nope".into()));
        assert!(matches!(TreeGraph::build(&snapshot), Err(LayoutError::UnknownNode(_))));
    }

    #[test]
    fn test_forest_roots_are_siblings() {
        let snapshot = TreeSnapshot::new(vec![node("r1", None, 1), node("r2", None, 2)], None);
        let graph = TreeGraph::build(&snapshot).unwrap();
        assert_eq!(ids(&graph.siblings(&"r1".into())), ["r2"]);
        assert_eq!(graph.sibling_index(&"r2".into()), 1);
    }
}
