// Candidate placement for newly appearing nodes.
//
// Rules:
// - Root: the configured origin, or right of everything if another root owns it
// - First child: straight below its parent
// - Branch (later child): one spacing right of the parent's widest descendant
//
// Before a branch is locked, the siblings of its parent and of every ancestor
// that sit to the right of the parent are pushed one spacing further right.
// This reserves a lane for the new branch so it never interleaves with
// neighbouring subtrees as it grows.

use super::LayoutConfig;
use super::store::PositionStore;
use crate::model::{NodeId, PointI, TreeGraph};

/// Where `id` should go before collision resolution.
pub fn candidate_position(
    id: &NodeId,
    graph: &TreeGraph,
    store: &PositionStore,
    cfg: &LayoutConfig,
) -> PointI {
    let Some(parent) = graph.parent(id) else {
        return root_candidate(id, graph, store, cfg);
    };
    let Some(p) = store.get(parent) else {
        // Parents are always placed first; an unplaced one means the caller
        // skipped ordering, so fall back to the origin row.
        return cfg.origin;
    };

    let index = graph.sibling_index(id);
    let y = p.y.saturating_add(cfg.vertical_spacing);
    if index == 0 {
        return PointI { x: p.x, y };
    }

    let widest = store.rightmost_x(&graph.descendants(parent)).unwrap_or(p.x);
    let step = i32::try_from(index).unwrap_or(i32::MAX).saturating_mul(cfg.horizontal_spacing);
    let x = p.x.saturating_add(step).max(widest.saturating_add(cfg.horizontal_spacing));
    PointI { x, y }
}

fn root_candidate(id: &NodeId, graph: &TreeGraph, store: &PositionStore, cfg: &LayoutConfig) -> PointI {
    let origin_taken = graph
        .roots()
        .iter()
        .any(|r| r != id && store.get(r) == Some(cfg.origin));
    if !origin_taken {
        return cfg.origin;
    }

    let rightmost = store.iter().map(|(_, p)| p.x).max().unwrap_or(cfg.origin.x);
    PointI { x: rightmost.saturating_add(cfg.horizontal_spacing), y: cfg.origin.y }
}

/// Shift right every sibling branch of `parent` and of its ancestors whose
/// x is greater than `parent`'s. Returns the number of branches moved.
pub fn displace_ancestor_siblings(
    parent: &NodeId,
    graph: &TreeGraph,
    store: &mut PositionStore,
    cfg: &LayoutConfig,
) -> usize {
    // Threshold is the branch's own parent, not its grandparent: otherwise
    // left-hand siblings of `parent` would be pushed onto its column.
    let Some(threshold) = store.get(parent).map(|p| p.x) else {
        return 0;
    };

    let mut moved = 0;
    let lineage = std::iter::once(parent.clone()).chain(graph.ancestors(parent));
    for ancestor in lineage {
        for sibling in graph.siblings(&ancestor) {
            if store.get(&sibling).is_some_and(|p| p.x > threshold) {
                store.shift_branch(graph, &sibling, cfg.horizontal_spacing);
                moved += 1;
            }
        }
    }
    moved
}
