//! Shared data model: column specs, row records, selection configuration.

mod column;
mod row;

pub use column::{
    columns_with_selection, Align, ColumnSpec, FixedSide, GroupFieldOption, RowSelection,
    DEFAULT_SELECTION_WIDTH, SELECTION_COLUMN_ID,
};
pub use row::{check_state, json_key, row_key, CheckState, RowRecord};
