//! Layout session: the tree model plus its position memory.
//!
//! A session is the single writer of the position store. Every mutation the
//! display layer can trigger (new prompt, id swap after a response, delete,
//! activate, drag) goes through here, and `layout` brings the store up to
//! date before projecting the tree into a `RenderGraph`.

use std::collections::HashSet;

use crate::error::{LayoutError, Result};
use crate::layout::{self, LayoutConfig, PlacementReport, PositionStore};
use crate::model::{self, ChatNode, ContextMessage, NodeId, PointI, TreeGraph, TreeSnapshot};
use crate::output::RenderGraph;

#[derive(Debug, Clone, Default)]
pub struct LayoutSession {
    tree: TreeSnapshot,
    positions: PositionStore,
    config: LayoutConfig,
    /// Set by deletion: the next pass re-places everything except roots.
    relayout_pending: bool,
    /// Outcome of the most recent placement pass.
    last_report: PlacementReport,
}

impl LayoutSession {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &TreeSnapshot {
        &self.tree
    }

    pub fn positions(&self) -> &PositionStore {
        &self.positions
    }

    pub fn position_of(&self, id: &NodeId) -> Option<PointI> {
        self.positions.get(id)
    }

    pub fn last_report(&self) -> &PlacementReport {
        &self.last_report
    }

    /// Replace the tree with a full snapshot from the backend.
    /// Locked positions of nodes missing from the snapshot are dropped.
    pub fn sync_snapshot(&mut self, snapshot: TreeSnapshot) -> Result<()> {
        let graph = TreeGraph::build(&snapshot)?;
        self.positions.retain(|id| graph.contains(id));
        self.tree = snapshot;
        Ok(())
    }

    /// Append a freshly submitted node and make it the active one.
    pub fn add_node(&mut self, node: ChatNode) -> Result<()> {
        if self.tree.contains(&node.id) {
            return Err(LayoutError::DuplicateNode(node.id));
        }
        if let Some(parent) = &node.parent_id {
            if !self.tree.contains(parent) {
                return Err(LayoutError::DanglingParent { node: node.id, parent: parent.clone() });
            }
        }
        self.tree.active_id = Some(node.id.clone());
        self.tree.nodes.push(node);
        Ok(())
    }

    /// Swap a temporary id for its permanent one. The node keeps its locked
    /// position, its children and, if it was active, the active flag.
    pub fn rekey(&mut self, old: &NodeId, new: NodeId) -> Result<()> {
        if !self.tree.contains(old) {
            return Err(LayoutError::UnknownNode(old.clone()));
        }
        if old == &new {
            return Ok(());
        }
        if self.tree.contains(&new) {
            return Err(LayoutError::RekeyTargetExists(new));
        }

        for node in &mut self.tree.nodes {
            if &node.id == old {
                node.id = new.clone();
            }
            if node.parent_id.as_ref() == Some(old) {
                node.parent_id = Some(new.clone());
            }
        }
        if self.tree.active_id.as_ref() == Some(old) {
            self.tree.active_id = Some(new.clone());
        }
        self.positions.rekey(old, new);
        Ok(())
    }

    /// Remove a node with its whole subtree. Returns the removed ids, or an
    /// empty list when `id` is unknown.
    ///
    /// Surviving positions stay as they are until the next `layout`, which
    /// re-places every node except the roots.
    pub fn delete_node(&mut self, id: &NodeId) -> Vec<NodeId> {
        let graph = match TreeGraph::build(&self.tree) {
            Ok(graph) => graph,
            Err(e) => {
                tracing::warn!(error = %e, "session tree is inconsistent, delete skipped");
                return Vec::new();
            }
        };
        if !graph.contains(id) {
            return Vec::new();
        }

        let mut removed = vec![id.clone()];
        removed.extend(graph.descendants(id));
        let doomed: HashSet<&NodeId> = removed.iter().collect();

        self.tree.nodes.retain(|n| !doomed.contains(&n.id));
        self.positions.retain(|n| !doomed.contains(n));

        if self.tree.active_id.as_ref().is_some_and(|a| doomed.contains(a)) {
            self.tree.active_id = self.tree.latest().map(|n| n.id.clone());
        }
        self.relayout_pending = true;

        tracing::debug!(node = %id, removed = removed.len(), "deleted branch");
        removed
    }

    /// Change the active node. `None` clears it.
    pub fn set_active(&mut self, id: Option<NodeId>) -> Result<()> {
        if let Some(id) = &id {
            if !self.tree.contains(id) {
                return Err(LayoutError::UnknownNode(id.clone()));
            }
        }
        self.tree.active_id = id;
        Ok(())
    }

    /// User drag. `top_left` is the corner the display drew the node at.
    /// Overlap with other nodes is allowed here.
    pub fn move_node(&mut self, id: &NodeId, top_left: PointI) -> Result<()> {
        if !self.tree.contains(id) {
            return Err(LayoutError::UnknownNode(id.clone()));
        }
        // A reset still owed to an earlier delete must not swallow this drag.
        self.flush_pending_reset();
        let anchor = self.config.top_left_to_anchor(top_left);
        self.positions.lock(id.clone(), anchor);
        Ok(())
    }

    /// Lock positions for every unplaced node.
    pub fn place(&mut self) -> Result<PlacementReport> {
        let graph = TreeGraph::build(&self.tree)?;
        self.flush_pending_reset();

        let report = layout::place_unplaced(&graph, &mut self.positions, &self.config);
        self.last_report = report.clone();
        Ok(report)
    }

    /// Drop every non-root position if a deletion asked for a re-layout.
    fn flush_pending_reset(&mut self) {
        if !self.relayout_pending {
            return;
        }
        let roots: HashSet<&NodeId> = self.tree.nodes.iter().filter(|n| n.is_root()).map(|n| &n.id).collect();
        self.positions.retain(|id| roots.contains(id));
        self.relayout_pending = false;
    }

    /// Full pass: place new nodes, then project the tree for display.
    pub fn layout(&mut self) -> Result<RenderGraph> {
        self.place()?;
        let graph = TreeGraph::build(&self.tree)?;
        Ok(layout::build_render_graph(&self.tree, &graph, &self.positions, &self.config))
    }

    /// Conversation history the backend should see when branching from `id`.
    pub fn branch_context(&self, id: &NodeId) -> Result<Vec<ContextMessage>> {
        let graph = TreeGraph::build(&self.tree)?;
        if !graph.contains(id) {
            return Err(LayoutError::UnknownNode(id.clone()));
        }
        Ok(model::branch_context(&self.tree, &graph, id))
    }
}
