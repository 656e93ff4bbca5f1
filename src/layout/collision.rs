// Collision resolution for a single candidate position.
//
// A candidate is tested against every locked node. Each overlapping node is
// pushed right by one horizontal spacing together with its descendants, then
// the scan starts over against the same candidate since the shift may have
// uncovered or created other overlaps. The number of passes is capped; a
// candidate still overlapping after the cap is placed anyway.

use super::LayoutConfig;
use super::store::PositionStore;
use crate::model::{NodeId, PointI, TreeGraph};

/// Outcome of resolving one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub position: PointI,
    /// Branches shifted, in the order they were moved.
    pub shifted: Vec<NodeId>,
    /// False when the pass ceiling was hit with an overlap remaining.
    pub converged: bool,
}

/// First locked node (in creation order) overlapping `candidate`.
pub fn find_overlap(
    candidate: PointI,
    exclude: &NodeId,
    store: &PositionStore,
    graph: &TreeGraph,
    cfg: &LayoutConfig,
) -> Option<NodeId> {
    graph
        .chronological()
        .iter()
        .filter(|id| *id != exclude)
        .find(|id| store.get(id).is_some_and(|p| cfg.overlaps(candidate, p)))
        .cloned()
}

/// Clear `candidate` for node `id` by shifting overlapping branches right.
pub fn resolve_collisions(
    id: &NodeId,
    candidate: PointI,
    store: &mut PositionStore,
    graph: &TreeGraph,
    cfg: &LayoutConfig,
) -> Resolution {
    let mut shifted = Vec::new();

    for pass in 0..=cfg.max_collision_passes {
        let Some(blocker) = find_overlap(candidate, id, store, graph, cfg) else {
            return Resolution { position: candidate, shifted, converged: true };
        };
        if pass == cfg.max_collision_passes {
            break;
        }
        store.shift_branch(graph, &blocker, cfg.horizontal_spacing);
        shifted.push(blocker);
    }

    tracing::warn!(
        node = %id,
        x = candidate.x,
        y = candidate.y,
        passes = cfg.max_collision_passes,
        "collision pass ceiling reached, placing node with overlap"
    );
    Resolution { position: candidate, shifted, converged: false }
}
