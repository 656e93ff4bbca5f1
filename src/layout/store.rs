// Position store and branch mover.
//
// The store is the permanent memory of the layout: once a node has an entry
// the placement pass never recomputes it. Entries change only through drags,
// deletion, and rigid branch shifts while a new node is being placed.

use std::collections::HashMap;

use crate::model::{NodeId, PointI, TreeGraph};

/// Locked center-line anchor per node id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionStore {
    locked: HashMap<NodeId, PointI>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &NodeId) -> Option<PointI> {
        self.locked.get(id).copied()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.locked.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.locked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locked.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, PointI)> {
        self.locked.iter().map(|(id, p)| (id, *p))
    }

    /// Write a position, replacing any previous entry.
    pub fn lock(&mut self, id: NodeId, pos: PointI) {
        self.locked.insert(id, pos);
    }

    pub fn remove(&mut self, id: &NodeId) -> Option<PointI> {
        self.locked.remove(id)
    }

    /// Move an entry to a new id. Returns false if `old` had no entry.
    pub fn rekey(&mut self, old: &NodeId, new: NodeId) -> bool {
        match self.locked.remove(old) {
            Some(pos) => {
                self.locked.insert(new, pos);
                true
            }
            None => false,
        }
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&NodeId) -> bool) {
        self.locked.retain(|id, _| keep(id));
    }

    /// Largest locked x among `ids`, skipping unplaced ones.
    pub fn rightmost_x<'a>(&self, ids: impl IntoIterator<Item = &'a NodeId>) -> Option<i32> {
        ids.into_iter().filter_map(|id| self.get(id)).map(|p| p.x).max()
    }

    /// Translate a node and its whole descendant set by `dx`.
    /// Returns how many locked entries moved.
    pub fn shift_branch(&mut self, graph: &TreeGraph, id: &NodeId, dx: i32) -> usize {
        let mut moved = 0;
        for member in std::iter::once(id.clone()).chain(graph.descendants(id)) {
            if let Some(pos) = self.locked.get_mut(&member) {
                pos.x = pos.x.saturating_add(dx);
                moved += 1;
            }
        }
        moved
    }
}
