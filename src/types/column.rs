//! Column specifications and row-selection configuration.

use serde::{Deserialize, Serialize};

/// Edge a column is pinned to. Fixed columns are exempt from horizontal
/// scroll and receive absolute left/right offsets during layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixedSide {
    /// Scrolls with the table body (default).
    #[default]
    None,
    /// Pinned to the left edge.
    Left,
    /// Pinned to the right edge.
    Right,
}

impl FixedSide {
    /// True for either pinned side.
    pub fn is_fixed(self) -> bool {
        self != FixedSide::None
    }
}

/// Horizontal alignment of a column's cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Declarative column specification.
///
/// `id` is the stable identity used by the resize offset map and also the
/// record field read for cell values. A column with a non-empty `children`
/// list is a header group: its declared `width` is ignored and its rendered
/// span equals the sum of its leaf descendants' widths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    /// Stable column id; doubles as the record field key for cell values.
    pub id: String,
    /// Header text.
    pub title: String,
    /// Declared width in pixels (leaf columns only; ignored for groups).
    pub width: f32,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub fixed: FixedSide,
    /// Nested child columns (multi-level header support).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ColumnSpec>,
}

impl ColumnSpec {
    /// Create a leaf column with default alignment, not fixed.
    pub fn new(id: impl Into<String>, title: impl Into<String>, width: f32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            width,
            align: Align::default(),
            fixed: FixedSide::None,
            children: Vec::new(),
        }
    }

    /// Pin this column to an edge.
    #[must_use]
    pub fn fixed(mut self, side: FixedSide) -> Self {
        self.fixed = side;
        self
    }

    /// Attach child columns, turning this column into a header group.
    #[must_use]
    pub fn with_children(mut self, children: Vec<ColumnSpec>) -> Self {
        self.children = children;
        self
    }

    /// True when this spec has no child columns.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Reserved id of the injected selection-checkbox column.
pub const SELECTION_COLUMN_ID: &str = "row-selection";

/// Default width of the selection-checkbox column.
pub const DEFAULT_SELECTION_WIDTH: f32 = 52.0;

/// Row-selection configuration.
///
/// When present, a checkbox column is injected into the root column list
/// before layout: prepended, or appended when pinned right. The change
/// callback itself lives on the viewer and always receives the full new
/// key list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSelection {
    /// Width of the checkbox column.
    #[serde(default = "default_selection_width")]
    pub width: f32,
    /// Pin the checkbox column to an edge.
    #[serde(default)]
    pub fixed: FixedSide,
    /// Currently selected row keys.
    #[serde(default)]
    pub selected_keys: Vec<String>,
}

fn default_selection_width() -> f32 {
    DEFAULT_SELECTION_WIDTH
}

impl Default for RowSelection {
    fn default() -> Self {
        Self {
            width: DEFAULT_SELECTION_WIDTH,
            fixed: FixedSide::None,
            selected_keys: Vec::new(),
        }
    }
}

/// Build the root column list for layout, injecting the selection column
/// when configured. Prepended unless the selection column is fixed right,
/// in which case it trails the data columns.
pub fn columns_with_selection(
    columns: &[ColumnSpec],
    selection: Option<&RowSelection>,
) -> Vec<ColumnSpec> {
    let mut cols: Vec<ColumnSpec> = columns.to_vec();
    if let Some(sel) = selection {
        let checkbox = ColumnSpec {
            id: SELECTION_COLUMN_ID.to_string(),
            title: String::new(),
            width: sel.width,
            align: Align::Center,
            fixed: sel.fixed,
            children: Vec::new(),
        };
        if sel.fixed == FixedSide::Right {
            cols.push(checkbox);
        } else {
            cols.insert(0, checkbox);
        }
    }
    cols
}

/// Column-like choice produced by the external group-field options service.
/// The whole contract between that service and the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupFieldOption {
    pub title: String,
    pub data_index: String,
}
