// Incremental conversation-tree layout.
//
// Goals:
// - Stable: a node's position is locked the first time it is placed; only a
//   drag or a deletion reset ever discards it
// - Incremental: each pass only places nodes without a locked position
// - No overlap between unrelated branches
// - Branches move rigidly: a shifted node drags all of its descendants along
//
// Submodules:
// - store: locked positions + branch mover
// - placement: candidate positions and ancestor-sibling displacement
// - collision: overlap detection and resolution
//
// Output:
// - RenderGraph with top-left node positions, active flags and edges.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{ChatNode, NodeId, PointI, TreeGraph, TreeSnapshot};
use crate::output::{EdgeOutput, NodeOutput, RenderGraph};

mod collision;
mod placement;
mod store;

#[cfg(test)]
mod layout_proptest;

pub use collision::{find_overlap, resolve_collisions, Resolution};
pub use placement::{candidate_position, displace_ancestor_siblings};
pub use store::PositionStore;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeI {
    pub w: i32,
    pub h: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Size of every node box.
    pub node_size: SizeI,
    /// Minimum horizontal clearance between two boxes.
    pub min_gap_x: i32,
    /// Minimum vertical clearance between two boxes.
    pub min_gap_y: i32,
    /// Step between sibling branches, also the shift applied to a blocker.
    pub horizontal_spacing: i32,
    /// Step between a parent and its children.
    pub vertical_spacing: i32,
    /// Anchor of the first root.
    pub origin: PointI,
    /// Collision passes per node before giving up with an overlap.
    pub max_collision_passes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_size: SizeI { w: 300, h: 150 },
            min_gap_x: 50,
            min_gap_y: 50,
            horizontal_spacing: 400,
            vertical_spacing: 250,
            origin: PointI { x: 0, y: 0 },
            max_collision_passes: 50,
        }
    }
}

impl LayoutConfig {
    /// Bounding boxes around two anchors come closer than the minimum gaps
    /// on both axes.
    pub fn overlaps(&self, a: PointI, b: PointI) -> bool {
        let reach_x = self.node_size.w.saturating_add(self.min_gap_x).max(0).unsigned_abs();
        let reach_y = self.node_size.h.saturating_add(self.min_gap_y).max(0).unsigned_abs();
        a.x.abs_diff(b.x) < reach_x && a.y.abs_diff(b.y) < reach_y
    }

    /// Convert a locked anchor to the top-left corner the display draws at.
    pub fn anchor_to_top_left(&self, anchor: PointI) -> PointI {
        PointI { x: anchor.x.saturating_sub(self.node_size.w / 2), y: anchor.y }
    }

    pub fn top_left_to_anchor(&self, top_left: PointI) -> PointI {
        PointI { x: top_left.x.saturating_add(self.node_size.w / 2), y: top_left.y }
    }
}

/// What one placement pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementReport {
    /// Newly locked nodes, in placement order.
    pub placed: Vec<NodeId>,
    /// Nodes locked while still overlapping something.
    pub degraded: Vec<NodeId>,
    /// Branch shifts from displacement and collision resolution.
    pub shifted_branches: usize,
}

/// Lock a position for every node of `graph` that has none yet.
pub fn place_unplaced(graph: &TreeGraph, store: &mut PositionStore, cfg: &LayoutConfig) -> PlacementReport {
    let mut report = PlacementReport::default();

    for id in graph.chronological() {
        if store.contains(id) {
            continue;
        }
        // A parent stamped later than its child still has to go first.
        let mut chain = vec![id.clone()];
        for ancestor in graph.ancestors(id) {
            if store.contains(&ancestor) {
                break;
            }
            chain.push(ancestor);
        }
        for node in chain.iter().rev() {
            place_node(node, graph, store, cfg, &mut report);
        }
    }

    if !report.placed.is_empty() {
        tracing::debug!(
            placed = report.placed.len(),
            shifted = report.shifted_branches,
            degraded = report.degraded.len(),
            "layout pass finished"
        );
    }
    report
}

fn place_node(
    id: &NodeId,
    graph: &TreeGraph,
    store: &mut PositionStore,
    cfg: &LayoutConfig,
    report: &mut PlacementReport,
) {
    let candidate = candidate_position(id, graph, store, cfg);

    if let Some(parent) = graph.parent(id) {
        if graph.sibling_index(id) > 0 {
            report.shifted_branches += displace_ancestor_siblings(parent, graph, store, cfg);
        }
    }

    let resolution = resolve_collisions(id, candidate, store, graph, cfg);
    report.shifted_branches += resolution.shifted.len();
    if !resolution.converged {
        report.degraded.push(id.clone());
    }

    store.lock(id.clone(), resolution.position);
    tracing::debug!(node = %id, x = resolution.position.x, y = resolution.position.y, "locked node");
    report.placed.push(id.clone());
}

/// Project the snapshot and the locked positions into drawable nodes/edges.
pub fn build_render_graph(
    snapshot: &TreeSnapshot,
    graph: &TreeGraph,
    store: &PositionStore,
    cfg: &LayoutConfig,
) -> RenderGraph {
    let by_id: HashMap<&NodeId, &ChatNode> = snapshot.nodes.iter().map(|n| (&n.id, n)).collect();
    let active = snapshot.active_id.as_ref();

    let mut nodes = Vec::with_capacity(graph.len());
    let mut edges = Vec::new();

    for id in graph.chronological() {
        let Some(node) = by_id.get(id) else {
            continue;
        };
        let anchor = store.get(id).unwrap_or(cfg.origin);

        nodes.push(NodeOutput {
            id: id.clone(),
            parent_id: node.parent_id.clone(),
            prompt: node.prompt.clone(),
            response: node.response.clone(),
            position: cfg.anchor_to_top_left(anchor),
            is_active: active == Some(id),
            on_active_path: graph.is_on_active_path(id, active),
        });

        if let Some(parent) = &node.parent_id {
            edges.push(EdgeOutput {
                id: format!("e{}-{}", parent, id),
                source: parent.clone(),
                target: id.clone(),
                animated: active == Some(id),
            });
        }
    }

    RenderGraph { nodes, edges }
}
