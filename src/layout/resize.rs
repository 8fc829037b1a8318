//! Resize-offset distribution.
//!
//! A header drag produces raw horizontal deltas. Each committed delta is
//! distributed over the column hierarchy as a per-id delta map — children
//! split the delta evenly at every level, ancestors absorb it whole — and
//! merged additively into the running [`ColumnOffsets`] map. Distribution is
//! a pure function over arena ids; the offset map is the only state, owned
//! by the viewer and written nowhere else.

use std::collections::HashMap;

use super::columns::ColumnArena;

/// Accumulated per-column pixel deltas from user resize operations.
///
/// Monotonically accumulates across drag sessions; cleared only by an
/// external reset action.
#[derive(Debug, Clone, Default)]
pub struct ColumnOffsets {
    map: HashMap<String, f32>,
}

impl ColumnOffsets {
    /// Accumulated delta for a column id, 0 when untouched.
    pub fn get(&self, id: &str) -> f32 {
        self.map.get(id).copied().unwrap_or(0.0)
    }

    /// Add a single delta.
    pub fn add(&mut self, id: &str, delta: f32) {
        *self.map.entry(id.to_string()).or_insert(0.0) += delta;
    }

    /// Merge a distributed delta set additively.
    pub fn merge(&mut self, deltas: &HashMap<String, f32>) {
        for (id, delta) in deltas {
            self.add(id, *delta);
        }
    }

    /// Drop all accumulated offsets (the external "reset columns" action).
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// True when no column has been resized.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Distribute a drag delta for the grabbed column over the hierarchy.
///
/// The grabbed column receives the full delta; its subtree splits the delta
/// evenly by direct child count at every level (an explicit, simpler policy
/// than leaf-count weighting); every ancestor's aggregate span grew by the
/// same amount, so each receives the full, undivided delta.
///
/// A grabbed id absent from the arena (stale reference after the column
/// tree changed mid-drag) yields an empty delta set — merging it is a no-op.
pub fn distribute_resize(
    arena: &ColumnArena,
    grabbed_id: &str,
    delta: f32,
) -> HashMap<String, f32> {
    let mut deltas = HashMap::new();
    let Some(idx) = arena.index_of(grabbed_id) else {
        return deltas;
    };

    if let Some(node) = arena.get(idx) {
        deltas.insert(node.id.clone(), delta);
    }
    distribute_down(arena, idx, delta, &mut deltas);

    let mut parent = arena.get(idx).and_then(|n| n.parent);
    while let Some(p) = parent {
        let Some(node) = arena.get(p) else {
            break;
        };
        deltas.insert(node.id.clone(), delta);
        parent = node.parent;
    }

    deltas
}

fn distribute_down(
    arena: &ColumnArena,
    idx: usize,
    delta: f32,
    deltas: &mut HashMap<String, f32>,
) {
    let Some(node) = arena.get(idx) else {
        return;
    };
    if node.children.is_empty() {
        return;
    }
    let share = delta / node.children.len() as f32;
    for &child in &node.children {
        if let Some(child_node) = arena.get(child) {
            deltas.insert(child_node.id.clone(), share);
        }
        distribute_down(arena, child, share, deltas);
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::layout::columns::{resolve_columns, MIN_LEAF_WIDTH};
    use crate::types::ColumnSpec;

    fn nested_arena() -> ColumnArena {
        // g
        // ├── a
        // └── h
        //     ├── b
        //     └── c
        ColumnArena::build(&[ColumnSpec::new("g", "G", 0.0).with_children(vec![
            ColumnSpec::new("a", "A", 100.0),
            ColumnSpec::new("h", "H", 0.0).with_children(vec![
                ColumnSpec::new("b", "B", 100.0),
                ColumnSpec::new("c", "C", 100.0),
            ]),
        ])])
    }

    #[test]
    fn stale_id_yields_empty_delta_set() {
        let arena = nested_arena();
        let deltas = distribute_resize(&arena, "gone", 30.0);
        assert!(deltas.is_empty());

        let mut offsets = ColumnOffsets::default();
        offsets.merge(&deltas);
        assert!(offsets.is_empty());
    }

    #[test]
    fn children_split_evenly_at_each_level() {
        let arena = nested_arena();
        let deltas = distribute_resize(&arena, "g", 40.0);
        assert_eq!(deltas["g"], 40.0);
        assert_eq!(deltas["a"], 20.0);
        assert_eq!(deltas["h"], 20.0);
        assert_eq!(deltas["b"], 10.0);
        assert_eq!(deltas["c"], 10.0);
    }

    #[test]
    fn ancestors_receive_the_full_delta() {
        let arena = nested_arena();
        let deltas = distribute_resize(&arena, "b", 16.0);
        assert_eq!(deltas["b"], 16.0);
        assert_eq!(deltas["h"], 16.0);
        assert_eq!(deltas["g"], 16.0);
        // siblings of the grabbed column are untouched
        assert!(!deltas.contains_key("a"));
        assert!(!deltas.contains_key("c"));
    }

    #[test]
    fn conservation_holds_recursively() {
        let arena = nested_arena();
        let deltas = distribute_resize(&arena, "g", 30.0);
        // sum of direct children == node's own delta, at every level
        assert!((deltas["a"] + deltas["h"] - deltas["g"]).abs() < 1e-4);
        assert!((deltas["b"] + deltas["c"] - deltas["h"]).abs() < 1e-4);
    }

    #[test]
    fn offsets_accumulate_across_commits() {
        let arena = nested_arena();
        let mut offsets = ColumnOffsets::default();
        offsets.merge(&distribute_resize(&arena, "b", 10.0));
        offsets.merge(&distribute_resize(&arena, "b", -4.0));
        assert_eq!(offsets.get("b"), 6.0);
        assert_eq!(offsets.get("g"), 6.0);
    }

    #[test]
    fn clamp_bounds_any_negative_accumulation() {
        let arena = nested_arena();
        let mut offsets = ColumnOffsets::default();
        for _ in 0..50 {
            offsets.merge(&distribute_resize(&arena, "g", -100.0));
        }
        let geo = resolve_columns(&arena, &offsets);
        let g = arena.index_of("g").unwrap();
        let b = arena.index_of("b").unwrap();
        assert!(geo.width(b) >= MIN_LEAF_WIDTH);
        assert!(geo.width(g) >= MIN_LEAF_WIDTH * arena.leaf_count("g") as f32);
    }

    #[test]
    fn scenario_flat_drag_widens_only_the_grabbed_column() {
        let arena = ColumnArena::build(&[
            ColumnSpec::new("a", "A", 100.0),
            ColumnSpec::new("b", "B", 100.0),
            ColumnSpec::new("c", "C", 100.0),
        ]);
        let mut offsets = ColumnOffsets::default();
        offsets.merge(&distribute_resize(&arena, "b", 30.0));
        let geo = resolve_columns(&arena, &offsets);
        assert_eq!(geo.width(arena.index_of("a").unwrap()), 100.0);
        assert_eq!(geo.width(arena.index_of("b").unwrap()), 130.0);
        assert_eq!(geo.width(arena.index_of("c").unwrap()), 100.0);
        assert_eq!(geo.table_width, 330.0);
    }

    #[test]
    fn reset_clears_accumulation() {
        let arena = nested_arena();
        let mut offsets = ColumnOffsets::default();
        offsets.merge(&distribute_resize(&arena, "a", 25.0));
        offsets.clear();
        assert!(offsets.is_empty());
        assert_eq!(offsets.get("a"), 0.0);
    }
}
