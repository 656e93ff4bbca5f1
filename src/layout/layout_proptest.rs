// Property tests for incremental placement.
//
// Trees are grown one node at a time, with a layout pass after every
// insertion, exactly like the display layer drives the engine.

use proptest::prelude::*;
use proptest::sample::Index;

use super::*;
use crate::session::LayoutSession;

/// Parent choice for every node after the root.
fn growth_strategy() -> impl Strategy<Value = Vec<Index>> {
    prop::collection::vec(any::<Index>(), 0..40)
}

fn node_id(i: usize) -> NodeId {
    NodeId(format!("n{i}"))
}

/// Grow a single-rooted tree, running a layout pass after each insertion.
fn grow(parents: &[Index]) -> LayoutSession {
    let mut session = LayoutSession::default();
    session.add_node(ChatNode::new(node_id(0), None, 0)).unwrap();
    session.layout().unwrap();

    for (i, pick) in parents.iter().enumerate() {
        let id = i + 1;
        let parent = node_id(pick.index(id));
        session.add_node(ChatNode::new(node_id(id), Some(parent), id as i64)).unwrap();
        session.layout().unwrap();
    }
    session
}

fn assert_no_overlap(session: &LayoutSession) -> Result<(), TestCaseError> {
    let cfg = session.config();
    let placed: Vec<(&NodeId, PointI)> = session.positions().iter().collect();
    for (i, (a, pa)) in placed.iter().enumerate() {
        for (b, pb) in &placed[i + 1..] {
            prop_assert!(!cfg.overlaps(*pa, *pb), "{} at {:?} overlaps {} at {:?}", a, pa, b, pb);
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn incremental_growth_never_overlaps(parents in growth_strategy()) {
        let session = grow(&parents);
        prop_assert_eq!(session.positions().len(), parents.len() + 1);
        assert_no_overlap(&session)?;
    }

    #[test]
    fn first_child_sits_straight_below_parent(parents in growth_strategy()) {
        let session = grow(&parents);
        let graph = TreeGraph::build(session.snapshot()).unwrap();
        let v = session.config().vertical_spacing;

        for id in graph.chronological() {
            if let Some(first) = graph.children(id).first() {
                let p = session.position_of(id).unwrap();
                prop_assert_eq!(session.position_of(first), Some(p.shifted(0, v)));
            }
        }
    }

    #[test]
    fn shifting_a_branch_is_rigid(parents in growth_strategy(), pick in any::<Index>(), dx in -800i32..800) {
        let session = grow(&parents);
        let graph = TreeGraph::build(session.snapshot()).unwrap();
        let moved = &graph.chronological()[pick.index(graph.len())];
        let before = session.positions().clone();

        let mut after = before.clone();
        after.shift_branch(&graph, moved, dx);

        let branch: Vec<NodeId> = std::iter::once(moved.clone()).chain(graph.descendants(moved)).collect();
        for id in graph.chronological() {
            let delta = after.get(id).unwrap().x - before.get(id).unwrap().x;
            let expected = if branch.contains(id) { dx } else { 0 };
            prop_assert_eq!(delta, expected);
            prop_assert_eq!(after.get(id).unwrap().y, before.get(id).unwrap().y);
        }
    }

    #[test]
    fn layout_is_idempotent(parents in growth_strategy()) {
        let mut session = grow(&parents);
        let first = session.layout().unwrap();
        let positions = session.positions().clone();
        let second = session.layout().unwrap();

        prop_assert_eq!(first, second);
        prop_assert_eq!(&positions, session.positions());
    }

    #[test]
    fn delete_removes_exactly_the_branch(parents in growth_strategy(), pick in any::<Index>()) {
        let mut session = grow(&parents);
        let graph = TreeGraph::build(session.snapshot()).unwrap();
        let target = graph.chronological()[pick.index(graph.len())].clone();
        let mut expected: Vec<NodeId> = std::iter::once(target.clone()).chain(graph.descendants(&target)).collect();
        expected.sort();
        let root = graph.roots()[0].clone();
        let root_pos = session.position_of(&root).unwrap();
        let before = session.positions().clone();

        let mut removed = session.delete_node(&target);
        removed.sort();
        prop_assert_eq!(&removed, &expected);

        // Survivors keep their entries until the next pass.
        for (id, pos) in before.iter() {
            if removed.contains(id) {
                prop_assert!(!session.snapshot().contains(id));
                prop_assert!(session.position_of(id).is_none());
            } else {
                prop_assert_eq!(session.position_of(id), Some(pos));
            }
        }

        session.layout().unwrap();
        prop_assert_eq!(session.positions().len(), session.snapshot().nodes.len());
        if target != root {
            prop_assert_eq!(session.position_of(&root), Some(root_pos));
        }
        assert_no_overlap(&session)?;
    }
}
