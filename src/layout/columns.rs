//! Column layout resolution.
//!
//! The declarative column tree is first flattened into an id-indexed arena,
//! then resolved per render pass into an immutable [`ColumnGeometry`]
//! snapshot: partition order, effective widths with the resize offset map
//! applied, absolute offsets for sticky columns, shadow boundaries, and the
//! aggregate table width. Resolution is pure re-derivation — nothing here is
//! cached across passes.

use std::collections::HashMap;

use super::resize::ColumnOffsets;
use crate::types::{Align, ColumnSpec, FixedSide};

/// Minimum effective width per contained leaf column. The clamp floor always
/// wins over a more negative accumulated resize offset.
pub const MIN_LEAF_WIDTH: f32 = 40.0;

/// One column in the arena.
#[derive(Debug, Clone)]
pub struct ColumnNode {
    /// Stable column id (also the record field key for cell values).
    pub id: String,
    /// Header text.
    pub title: String,
    /// Width from the spec, before offsets and clamping.
    pub declared_width: f32,
    pub align: Align,
    pub fixed: FixedSide,
    /// Arena index of the parent, `None` for roots.
    pub parent: Option<usize>,
    /// Arena indices of direct children, in declaration order.
    pub children: Vec<usize>,
    /// Number of leaf descendants (1 for a leaf).
    pub leaf_count: usize,
}

impl ColumnNode {
    /// True when this column owns an effective width of its own.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Flat, id-indexed view of a column tree.
///
/// Offset propagation and width resolution operate over arena indices, so
/// they are pure functions over ids with no shared, aliasable tree objects.
#[derive(Debug, Clone, Default)]
pub struct ColumnArena {
    nodes: Vec<ColumnNode>,
    roots: Vec<usize>,
    by_id: HashMap<String, usize>,
}

impl ColumnArena {
    /// Flatten a column spec tree. On duplicate ids the first occurrence
    /// wins for id lookup; later duplicates still lay out normally.
    pub fn build(specs: &[ColumnSpec]) -> Self {
        let mut arena = ColumnArena::default();
        for spec in specs {
            let idx = arena.insert(spec, None);
            arena.roots.push(idx);
        }
        arena
    }

    fn insert(&mut self, spec: &ColumnSpec, parent: Option<usize>) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(ColumnNode {
            id: spec.id.clone(),
            title: spec.title.clone(),
            declared_width: spec.width,
            align: spec.align,
            fixed: spec.fixed,
            parent,
            children: Vec::new(),
            leaf_count: 1,
        });
        self.by_id.entry(spec.id.clone()).or_insert(idx);

        let mut children = Vec::with_capacity(spec.children.len());
        let mut leaf_count = 0;
        for child in &spec.children {
            let child_idx = self.insert(child, Some(idx));
            leaf_count += self.nodes.get(child_idx).map_or(0, |n| n.leaf_count);
            children.push(child_idx);
        }
        if let Some(node) = self.nodes.get_mut(idx) {
            if !children.is_empty() {
                node.leaf_count = leaf_count;
            }
            node.children = children;
        }
        idx
    }

    /// Node by arena index.
    pub fn get(&self, idx: usize) -> Option<&ColumnNode> {
        self.nodes.get(idx)
    }

    /// Arena index for a column id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Root columns in declaration order.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Total node count (roots and descendants).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the arena holds no columns.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of leaf descendants under a column id; 1 for a leaf and for
    /// unknown ids (the conservative fallback the width clamp expects).
    pub fn leaf_count(&self, id: &str) -> usize {
        self.index_of(id)
            .and_then(|idx| self.nodes.get(idx))
            .map_or(1, |n| n.leaf_count)
    }
}

/// Immutable column geometry for one render pass.
///
/// All per-node vectors are indexed by arena index, mirroring the arena's
/// layout the way the sheet-layout prefix-sum vectors mirror column indices.
#[derive(Debug, Clone)]
pub struct ColumnGeometry {
    /// Root columns in render order: left-fixed, center, right-fixed.
    pub root_order: Vec<usize>,
    /// Effective width per node. Leaves carry `declared + offset` floored at
    /// [`MIN_LEAF_WIDTH`]; a header group's width is the sum of its leaf
    /// descendants' widths, never its declared width.
    pub widths: Vec<f32>,
    /// Absolute left offset for left-fixed columns and their descendants.
    pub lefts: Vec<Option<f32>>,
    /// Absolute right offset for right-fixed columns and their descendants.
    pub rights: Vec<Option<f32>>,
    /// Side whose sticky shadow this column draws, if any.
    pub shadow: Vec<Option<FixedSide>>,
    /// Leaf columns in render order (the cells of one row).
    pub leaf_order: Vec<usize>,
    /// Aggregate table width: sum of all leaf widths.
    pub table_width: f32,
}

impl ColumnGeometry {
    /// Effective width of a node, 0 for out-of-range indices.
    pub fn width(&self, idx: usize) -> f32 {
        self.widths.get(idx).copied().unwrap_or(0.0)
    }

    /// Absolute left offset, if the node is left-pinned.
    pub fn left(&self, idx: usize) -> Option<f32> {
        self.lefts.get(idx).copied().flatten()
    }

    /// Absolute right offset, if the node is right-pinned.
    pub fn right(&self, idx: usize) -> Option<f32> {
        self.rights.get(idx).copied().flatten()
    }

    /// Shadow-boundary side for a node, if any.
    pub fn shadow_boundary(&self, idx: usize) -> Option<FixedSide> {
        self.shadow.get(idx).copied().flatten()
    }
}

/// Stable partition of the root columns into left-fixed, center, and
/// right-fixed, concatenated in that order. Relative order within each
/// partition is preserved. O(n).
pub fn sort_columns(arena: &ColumnArena) -> Vec<usize> {
    let mut left = Vec::new();
    let mut center = Vec::new();
    let mut right = Vec::new();
    for &idx in arena.roots() {
        match arena.get(idx).map_or(FixedSide::None, |n| n.fixed) {
            FixedSide::Left => left.push(idx),
            FixedSide::Right => right.push(idx),
            FixedSide::None => center.push(idx),
        }
    }
    left.extend(center);
    left.extend(right);
    left
}

/// Recursively sum leaf widths of a spec tree. A non-leaf column's own
/// declared width is ignored once it has children.
pub fn calc_table_width(columns: &[ColumnSpec]) -> f32 {
    columns
        .iter()
        .map(|c| {
            if c.children.is_empty() {
                c.width
            } else {
                calc_table_width(&c.children)
            }
        })
        .sum()
}

/// Resolve the arena against the accumulated offset map into a fresh
/// geometry snapshot.
pub fn resolve_columns(arena: &ColumnArena, offsets: &ColumnOffsets) -> ColumnGeometry {
    let widths = effective_widths(arena, offsets);
    let root_order = sort_columns(arena);

    let mut geometry = ColumnGeometry {
        root_order,
        widths,
        lefts: vec![None; arena.len()],
        rights: vec![None; arena.len()],
        shadow: vec![None; arena.len()],
        leaf_order: Vec::new(),
        table_width: 0.0,
    };

    calc_fixed_position(arena, &mut geometry);

    let mut leaf_order = Vec::new();
    for &root in &geometry.root_order {
        collect_leaves(arena, root, &mut leaf_order);
    }
    geometry.table_width = leaf_order.iter().map(|&leaf| geometry.width(leaf)).sum();
    geometry.leaf_order = leaf_order;

    geometry
}

/// Effective width per node: leaves get `declared + offset` clamped to the
/// [`MIN_LEAF_WIDTH`] floor, groups get the sum of their children. Computed
/// bottom-up so parents always reflect post-clamp leaf widths.
fn effective_widths(arena: &ColumnArena, offsets: &ColumnOffsets) -> Vec<f32> {
    let mut widths = vec![0.0f32; arena.len()];
    for &root in arena.roots() {
        fill_width(arena, offsets, root, &mut widths);
    }
    widths
}

fn fill_width(
    arena: &ColumnArena,
    offsets: &ColumnOffsets,
    idx: usize,
    widths: &mut [f32],
) -> f32 {
    let Some(node) = arena.get(idx) else {
        return 0.0;
    };
    let width = if node.is_leaf() {
        let proposed = node.declared_width + offsets.get(&node.id);
        proposed.max(MIN_LEAF_WIDTH * node.leaf_count as f32)
    } else {
        let mut sum = 0.0;
        for &child in &node.children {
            sum += fill_width(arena, offsets, child, widths);
        }
        sum
    };
    if let Some(slot) = widths.get_mut(idx) {
        *slot = width;
    }
    width
}

/// Assign absolute offsets to fixed columns.
///
/// A single forward pass gives each left-fixed root a left offset equal to
/// the cumulative width of the preceding left-fixed roots; a pass over the
/// reversed order gives each right-fixed root the cumulative width of the
/// following right-fixed roots. A final pass marks the column adjacent to
/// the scrollable center on each side as that side's shadow boundary —
/// only when the side's total fixed width is non-zero, so zero-width and
/// single-sided configurations carry the flag only where a shadow could
/// actually render. Fixed roots then push concrete offsets down to their
/// descendants so windowed row cells position without re-walking the tree.
fn calc_fixed_position(arena: &ColumnArena, geometry: &mut ColumnGeometry) {
    let order = geometry.root_order.clone();

    let mut left = 0.0f32;
    let mut last_left: Option<usize> = None;
    for &idx in &order {
        if arena.get(idx).map_or(FixedSide::None, |n| n.fixed) == FixedSide::Left {
            if let Some(slot) = geometry.lefts.get_mut(idx) {
                *slot = Some(left);
            }
            left += geometry.width(idx);
            last_left = Some(idx);
        }
    }

    let mut right = 0.0f32;
    let mut first_right: Option<usize> = None;
    for &idx in order.iter().rev() {
        if arena.get(idx).map_or(FixedSide::None, |n| n.fixed) == FixedSide::Right {
            if let Some(slot) = geometry.rights.get_mut(idx) {
                *slot = Some(right);
            }
            right += geometry.width(idx);
            first_right = Some(idx);
        }
    }

    if left > 0.0 {
        if let Some(idx) = last_left {
            if let Some(slot) = geometry.shadow.get_mut(idx) {
                *slot = Some(FixedSide::Left);
            }
        }
    }
    if right > 0.0 {
        if let Some(idx) = first_right {
            if let Some(slot) = geometry.shadow.get_mut(idx) {
                *slot = Some(FixedSide::Right);
            }
        }
    }

    for &idx in &order {
        if let Some(base) = geometry.left(idx) {
            assign_child_lefts(arena, geometry, idx, base);
        }
        if let Some(base) = geometry.right(idx) {
            assign_child_rights(arena, geometry, idx, base);
        }
    }
}

fn assign_child_lefts(arena: &ColumnArena, geometry: &mut ColumnGeometry, idx: usize, base: f32) {
    let Some(node) = arena.get(idx) else {
        return;
    };
    let mut acc = base;
    for &child in &node.children {
        if let Some(slot) = geometry.lefts.get_mut(child) {
            *slot = Some(acc);
        }
        assign_child_lefts(arena, geometry, child, acc);
        acc += geometry.width(child);
    }
}

fn assign_child_rights(arena: &ColumnArena, geometry: &mut ColumnGeometry, idx: usize, base: f32) {
    let Some(node) = arena.get(idx) else {
        return;
    };
    let mut acc = base;
    for &child in node.children.iter().rev() {
        if let Some(slot) = geometry.rights.get_mut(child) {
            *slot = Some(acc);
        }
        assign_child_rights(arena, geometry, child, acc);
        acc += geometry.width(child);
    }
}

fn collect_leaves(arena: &ColumnArena, idx: usize, out: &mut Vec<usize>) {
    let Some(node) = arena.get(idx) else {
        return;
    };
    if node.is_leaf() {
        out.push(idx);
        return;
    }
    for &child in &node.children {
        collect_leaves(arena, child, out);
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
    use crate::types::ColumnSpec;

    fn flat(ids: &[(&str, f32, FixedSide)]) -> Vec<ColumnSpec> {
        ids.iter()
            .map(|(id, w, fixed)| ColumnSpec::new(*id, id.to_uppercase(), *w).fixed(*fixed))
            .collect()
    }

    #[test]
    fn sort_is_a_stable_partition() {
        let specs = flat(&[
            ("a", 100.0, FixedSide::None),
            ("b", 100.0, FixedSide::Right),
            ("c", 100.0, FixedSide::Left),
            ("d", 100.0, FixedSide::None),
            ("e", 100.0, FixedSide::Left),
        ]);
        let arena = ColumnArena::build(&specs);
        let order: Vec<&str> = sort_columns(&arena)
            .iter()
            .map(|&i| arena.get(i).unwrap().id.as_str())
            .collect();
        assert_eq!(order, vec!["c", "e", "a", "d", "b"]);
    }

    #[test]
    fn left_fixed_offsets_accumulate_forward() {
        let specs = flat(&[
            ("a", 80.0, FixedSide::Left),
            ("b", 120.0, FixedSide::Left),
            ("c", 100.0, FixedSide::None),
        ]);
        let arena = ColumnArena::build(&specs);
        let geo = resolve_columns(&arena, &ColumnOffsets::default());
        let a = arena.index_of("a").unwrap();
        let b = arena.index_of("b").unwrap();
        assert_eq!(geo.left(a), Some(0.0));
        assert_eq!(geo.left(b), Some(80.0));
        assert_eq!(geo.left(b).unwrap(), geo.left(a).unwrap() + geo.width(a));
    }

    #[test]
    fn right_fixed_offsets_accumulate_backward() {
        let specs = flat(&[
            ("a", 100.0, FixedSide::None),
            ("b", 60.0, FixedSide::Right),
            ("c", 90.0, FixedSide::Right),
        ]);
        let arena = ColumnArena::build(&specs);
        let geo = resolve_columns(&arena, &ColumnOffsets::default());
        let b = arena.index_of("b").unwrap();
        let c = arena.index_of("c").unwrap();
        // c is the outermost right column, b sits inward of it
        assert_eq!(geo.right(c), Some(0.0));
        assert_eq!(geo.right(b), Some(90.0));
    }

    #[test]
    fn shadow_marks_columns_adjacent_to_center() {
        let specs = flat(&[
            ("a", 80.0, FixedSide::Left),
            ("b", 80.0, FixedSide::Left),
            ("c", 100.0, FixedSide::None),
            ("d", 60.0, FixedSide::Right),
            ("e", 60.0, FixedSide::Right),
        ]);
        let arena = ColumnArena::build(&specs);
        let geo = resolve_columns(&arena, &ColumnOffsets::default());
        assert_eq!(
            geo.shadow_boundary(arena.index_of("b").unwrap()),
            Some(FixedSide::Left)
        );
        assert_eq!(
            geo.shadow_boundary(arena.index_of("d").unwrap()),
            Some(FixedSide::Right)
        );
        assert_eq!(geo.shadow_boundary(arena.index_of("a").unwrap()), None);
        assert_eq!(geo.shadow_boundary(arena.index_of("e").unwrap()), None);
    }

    #[test]
    fn no_shadow_without_fixed_columns() {
        let specs = flat(&[("a", 80.0, FixedSide::None), ("b", 80.0, FixedSide::None)]);
        let arena = ColumnArena::build(&specs);
        let geo = resolve_columns(&arena, &ColumnOffsets::default());
        assert!(geo.shadow.iter().all(Option::is_none));
    }

    #[test]
    fn table_width_ignores_group_declared_widths() {
        let specs = vec![
            ColumnSpec::new("group", "Group", 9999.0).with_children(vec![
                ColumnSpec::new("x", "X", 70.0),
                ColumnSpec::new("y", "Y", 90.0),
            ]),
            ColumnSpec::new("z", "Z", 40.0),
        ];
        assert_eq!(calc_table_width(&specs), 200.0);
        let arena = ColumnArena::build(&specs);
        let geo = resolve_columns(&arena, &ColumnOffsets::default());
        assert_eq!(geo.table_width, 200.0);
        assert_eq!(geo.width(arena.index_of("group").unwrap()), 160.0);
    }

    #[test]
    fn leaf_counts() {
        let specs = vec![ColumnSpec::new("g", "G", 0.0).with_children(vec![
            ColumnSpec::new("a", "A", 50.0),
            ColumnSpec::new("h", "H", 0.0).with_children(vec![
                ColumnSpec::new("b", "B", 50.0),
                ColumnSpec::new("c", "C", 50.0),
            ]),
        ])];
        let arena = ColumnArena::build(&specs);
        assert_eq!(arena.leaf_count("g"), 3);
        assert_eq!(arena.leaf_count("h"), 2);
        assert_eq!(arena.leaf_count("a"), 1);
        assert_eq!(arena.leaf_count("missing"), 1);
    }

    #[test]
    fn width_clamp_floor_wins() {
        let specs = flat(&[("a", 100.0, FixedSide::None)]);
        let arena = ColumnArena::build(&specs);
        let mut offsets = ColumnOffsets::default();
        offsets.add("a", -500.0);
        let geo = resolve_columns(&arena, &offsets);
        assert_eq!(geo.width(arena.index_of("a").unwrap()), MIN_LEAF_WIDTH);
    }

    #[test]
    fn fixed_group_leaves_inherit_concrete_offsets() {
        let specs = vec![
            ColumnSpec::new("g", "G", 0.0)
                .fixed(FixedSide::Left)
                .with_children(vec![
                    ColumnSpec::new("a", "A", 60.0),
                    ColumnSpec::new("b", "B", 40.0),
                ]),
            ColumnSpec::new("c", "C", 100.0),
        ];
        let arena = ColumnArena::build(&specs);
        let geo = resolve_columns(&arena, &ColumnOffsets::default());
        assert_eq!(geo.left(arena.index_of("g").unwrap()), Some(0.0));
        assert_eq!(geo.left(arena.index_of("a").unwrap()), Some(0.0));
        assert_eq!(geo.left(arena.index_of("b").unwrap()), Some(60.0));
        assert_eq!(geo.left(arena.index_of("c").unwrap()), None);
    }

    #[test]
    fn leaf_order_follows_render_order() {
        let specs = vec![
            ColumnSpec::new("center", "Center", 100.0),
            ColumnSpec::new("pinned", "Pinned", 80.0).fixed(FixedSide::Left),
        ];
        let arena = ColumnArena::build(&specs);
        let geo = resolve_columns(&arena, &ColumnOffsets::default());
        let ids: Vec<&str> = geo
            .leaf_order
            .iter()
            .map(|&i| arena.get(i).unwrap().id.as_str())
            .collect();
        assert_eq!(ids, vec!["pinned", "center"]);
    }
}
