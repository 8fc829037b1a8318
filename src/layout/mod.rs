//! Layout engine: column geometry, resize distribution, row windowing,
//! grouping, and scroll shadows.
//!
//! Everything in this module is pure re-derivation from inputs — immutable
//! snapshots recomputed when inputs change, with no hidden caching. The two
//! pieces of state that survive across passes (the resize offset map and the
//! expanded-group key set) are additive maps keyed by stable ids, written
//! only by their owning component.

pub mod columns;
pub mod groups;
pub mod resize;
pub mod shadow;
pub mod window;

pub use columns::{
    calc_table_width, resolve_columns, sort_columns, ColumnArena, ColumnGeometry, ColumnNode,
    MIN_LEAF_WIDTH,
};
pub use groups::{
    group_row_top, is_culled, layout_groups, partition_rows, ExpandedGroups, GroupLayout,
    RowGroup, CULL_RESERVE, DEFAULT_HEADER_HEIGHT, GROUP_CHROME_HEIGHT, HEADER_GAP,
    UNDEFINED_GROUP_KEY,
};
pub use resize::{distribute_resize, ColumnOffsets};
pub use shadow::{ScrollMetrics, ShadowEdges, ShadowSync};
pub use window::{compute_window, WindowRange, BUFFER_ROWS};
