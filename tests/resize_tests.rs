//! Resize distribution tests for gridview
//!
//! Tests for hierarchical delta distribution, offset accumulation,
//! minimum-width clamping, and the drag move coalescer.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use gridview::layout::{
    distribute_resize, resolve_columns, ColumnArena, ColumnOffsets, MIN_LEAF_WIDTH,
};
use gridview::types::ColumnSpec;
use gridview::viewer::MoveCoalescer;
use test_case::test_case;

/// Two-level tree with an uneven child count (3-way split)
fn wide_tree() -> ColumnArena {
    ColumnArena::build(&[ColumnSpec::new("root", "Root", 0.0).with_children(vec![
        ColumnSpec::new("a", "A", 100.0),
        ColumnSpec::new("b", "B", 100.0),
        ColumnSpec::new("c", "C", 100.0),
    ])])
}

#[test_case(30.0; "grow")]
#[test_case(-30.0; "shrink")]
#[test_case(0.0; "noop drag")]
fn children_conserve_the_parent_delta(delta: f32) {
    let arena = wide_tree();
    let deltas = distribute_resize(&arena, "root", delta);
    let children_sum = deltas["a"] + deltas["b"] + deltas["c"];
    assert!((children_sum - deltas["root"]).abs() < 1e-3);
}

#[test]
fn deep_tree_conserves_at_every_level() {
    let arena = ColumnArena::build(&[ColumnSpec::new("l0", "L0", 0.0).with_children(vec![
        ColumnSpec::new("l1a", "L1a", 100.0),
        ColumnSpec::new("l1b", "L1b", 0.0).with_children(vec![
            ColumnSpec::new("l2a", "L2a", 100.0),
            ColumnSpec::new("l2b", "L2b", 0.0).with_children(vec![
                ColumnSpec::new("l3a", "L3a", 100.0),
                ColumnSpec::new("l3b", "L3b", 100.0),
            ]),
        ]),
    ])]);
    let deltas = distribute_resize(&arena, "l0", 64.0);
    assert!((deltas["l1a"] + deltas["l1b"] - deltas["l0"]).abs() < 1e-3);
    assert!((deltas["l2a"] + deltas["l2b"] - deltas["l1b"]).abs() < 1e-3);
    assert!((deltas["l3a"] + deltas["l3b"] - deltas["l2b"]).abs() < 1e-3);
}

#[test]
fn grabbing_a_mid_level_column_feeds_both_directions() {
    let arena = ColumnArena::build(&[ColumnSpec::new("top", "Top", 0.0).with_children(vec![
        ColumnSpec::new("mid", "Mid", 0.0).with_children(vec![
            ColumnSpec::new("x", "X", 100.0),
            ColumnSpec::new("y", "Y", 100.0),
        ]),
        ColumnSpec::new("side", "Side", 100.0),
    ])]);
    let deltas = distribute_resize(&arena, "mid", 24.0);
    // the grabbed column and every ancestor get the full delta
    assert_eq!(deltas["mid"], 24.0);
    assert_eq!(deltas["top"], 24.0);
    // its own subtree splits evenly
    assert_eq!(deltas["x"], 12.0);
    assert_eq!(deltas["y"], 12.0);
    // the sibling subtree is untouched
    assert!(!deltas.contains_key("side"));
}

#[test]
fn stale_column_id_is_a_noop() {
    let arena = wide_tree();
    let mut offsets = ColumnOffsets::default();
    offsets.merge(&distribute_resize(&arena, "b", 10.0));
    let before = offsets.get("b");

    // the column tree changed mid-drag; the latched id no longer resolves
    let rebuilt = ColumnArena::build(&[ColumnSpec::new("other", "Other", 100.0)]);
    let deltas = distribute_resize(&rebuilt, "b", 50.0);
    assert!(deltas.is_empty());
    offsets.merge(&deltas);
    assert_eq!(offsets.get("b"), before);
}

#[test]
fn scenario_flat_columns_drag_plus_thirty() {
    let arena = ColumnArena::build(&[
        ColumnSpec::new("a", "A", 100.0),
        ColumnSpec::new("b", "B", 100.0),
        ColumnSpec::new("c", "C", 100.0),
    ]);
    let mut offsets = ColumnOffsets::default();
    offsets.merge(&distribute_resize(&arena, "b", 30.0));

    let geo = resolve_columns(&arena, &offsets);
    let widths: Vec<f32> = ["a", "b", "c"]
        .iter()
        .map(|id| geo.width(arena.index_of(id).unwrap()))
        .collect();
    assert_eq!(widths, vec![100.0, 130.0, 100.0]);
    assert_eq!(geo.table_width, 330.0);
}

#[test]
fn width_never_drops_below_forty_per_leaf() {
    let arena = wide_tree();
    let mut offsets = ColumnOffsets::default();
    // far more negative than the declared widths can absorb
    for _ in 0..100 {
        offsets.merge(&distribute_resize(&arena, "root", -50.0));
    }
    let geo = resolve_columns(&arena, &offsets);
    for id in ["a", "b", "c"] {
        assert!(geo.width(arena.index_of(id).unwrap()) >= MIN_LEAF_WIDTH);
    }
    let root = arena.index_of("root").unwrap();
    assert!(geo.width(root) >= MIN_LEAF_WIDTH * arena.leaf_count("root") as f32);
}

#[test]
fn drag_session_commits_accumulate_like_one_big_drag() {
    let arena = wide_tree();

    // one 30px commit
    let mut single = ColumnOffsets::default();
    single.merge(&distribute_resize(&arena, "a", 30.0));

    // the same 30px as three coalesced commits
    let mut split = ColumnOffsets::default();
    for delta in [10.0, 15.0, 5.0] {
        split.merge(&distribute_resize(&arena, "a", delta));
    }

    let geo_single = resolve_columns(&arena, &single);
    let geo_split = resolve_columns(&arena, &split);
    let a = arena.index_of("a").unwrap();
    assert_eq!(geo_single.width(a), geo_split.width(a));
}

#[test]
fn coalescer_batches_a_move_burst_into_one_commit() {
    let mut coalescer = MoveCoalescer::default();
    // a 60Hz move burst over ~50ms
    let mut committed = Vec::new();
    for i in 0..4 {
        coalescer.push(f64::from(i) * 16.0, 2.5);
        if let Some(delta) = coalescer.poll(f64::from(i) * 16.0 + 1.0) {
            committed.push(delta);
        }
    }
    // nothing settles inside the burst
    assert!(committed.is_empty());
    // one commit once the pointer pauses
    assert_eq!(coalescer.poll(3.0 * 16.0 + 20.0), Some(10.0));
}

#[test]
fn coalescer_flush_closes_the_session() {
    let mut coalescer = MoveCoalescer::default();
    coalescer.push(0.0, 6.0);
    assert_eq!(coalescer.flush(1.0), Some(6.0));
    assert!(coalescer.is_idle());
    assert_eq!(coalescer.poll(100.0), None);
}
