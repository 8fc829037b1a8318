//! Main `GridView` struct - the primary entry point for the DOM viewer.
//!
//! This module provides the WASM-exported `GridView` that handles:
//! - Decoding grid options and row data from the embedding side
//! - Managing scroll/selection/expansion state
//! - Coordinating the pure layout pass with the DOM writer
//! - Handling user interactions (scroll, header drags, checkbox clicks)
//!
//! The layout pass itself is platform-independent and unit-tested natively;
//! only the DOM wiring is gated on `wasm32`.

mod coalesce;
#[cfg(target_arch = "wasm32")]
mod dom;
mod events;
mod scroll;

pub use coalesce::{MoveCoalescer, DEBOUNCE_MS, THROTTLE_MS};

use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::collections::HashMap;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use js_sys::Function;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::{Event, HtmlDivElement, MouseEvent};

use crate::layout::{
    compute_window, layout_groups, partition_rows, resolve_columns, ColumnArena, ColumnGeometry,
    ColumnOffsets, ExpandedGroups, GroupLayout, RowGroup, WindowRange, DEFAULT_HEADER_HEIGHT,
};
#[cfg(target_arch = "wasm32")]
use crate::layout::ShadowSync;
use crate::types::{
    check_state, columns_with_selection, row_key, CheckState, ColumnSpec, RowRecord, RowSelection,
};

/// Row-key extraction callback used by the layout pass.
pub type RowKeyFn<'a> = &'a dyn Fn(&RowRecord) -> Option<String>;

/// One dimension of the viewport box: a pixel count or a raw CSS extent
/// (e.g. `"100%"`), passed through to the container style untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Extent {
    Px(f32),
    Css(String),
}

/// Scrollable viewport box. Height is required and drives the windowing
/// math; width is optional and only constrains the container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollBox {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Extent>,
    pub y: f32,
}

/// Grid configuration decoded from the embedding side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOptions {
    /// Column spec tree.
    pub columns: Vec<ColumnSpec>,
    /// Fixed row height in pixels, constant for the table's lifetime.
    pub row_height: f32,
    /// Header height; defaults to [`DEFAULT_HEADER_HEIGHT`].
    #[serde(default)]
    pub header_height: Option<f32>,
    /// Keep the header pinned while the body scrolls.
    #[serde(default)]
    pub fixed_header: bool,
    /// Viewport box.
    pub scroll: ScrollBox,
    /// Active grouping field, if any.
    #[serde(default)]
    pub group_field: Option<String>,
    /// Row-selection configuration, if any.
    #[serde(default)]
    pub row_selection: Option<RowSelection>,
}

impl GridOptions {
    /// Header height with the default applied.
    pub fn header_height(&self) -> f32 {
        self.header_height.unwrap_or(DEFAULT_HEADER_HEIGHT)
    }

    /// Root columns for layout, with the selection column injected when
    /// configured.
    pub fn layout_columns(&self) -> Vec<ColumnSpec> {
        columns_with_selection(&self.columns, self.row_selection.as_ref())
    }
}

/// Body layout for one pass: a windowed flat list, or grouped boxes.
#[derive(Debug, Clone)]
pub enum BodyLayout {
    Windowed(WindowRange),
    Grouped {
        groups: Vec<RowGroup>,
        layout: GroupLayout,
    },
}

/// Immutable outcome of one recompute pass. Recomputed from inputs on every
/// pass — there is no hidden caching behind it.
#[derive(Debug, Clone)]
pub struct LayoutPass {
    pub arena: ColumnArena,
    pub geometry: ColumnGeometry,
    pub body: BodyLayout,
}

/// Run the full layout pass: resolve column geometry against the offset
/// map, then window or group the rows for the current scroll position.
pub fn run_layout_pass(
    options: &GridOptions,
    rows: &[RowRecord],
    offsets: &ColumnOffsets,
    expanded: &ExpandedGroups,
    scroll_top: f32,
) -> LayoutPass {
    let arena = ColumnArena::build(&options.layout_columns());
    let geometry = resolve_columns(&arena, offsets);

    let body = match options.group_field.as_deref() {
        Some(field) => {
            let groups = partition_rows(rows, field);
            let layout = layout_groups(&groups, expanded, options.row_height, options.header_height());
            BodyLayout::Grouped { groups, layout }
        }
        None => BodyLayout::Windowed(compute_window(
            rows.len(),
            options.row_height,
            options.scroll.y,
            scroll_top,
        )),
    };

    LayoutPass {
        arena,
        geometry,
        body,
    }
}

/// Toggle one row key in the selected set, returning the full new key list.
pub fn toggle_row_key(selected: &[String], key: &str) -> Vec<String> {
    if selected.iter().any(|k| k == key) {
        selected.iter().filter(|k| *k != key).cloned().collect()
    } else {
        let mut next = selected.to_vec();
        next.push(key.to_string());
        next
    }
}

/// Header checkbox click: select every row key, or clear when everything is
/// already selected.
pub fn toggle_all_keys(
    selected: &[String],
    rows: &[RowRecord],
    extractor: Option<RowKeyFn<'_>>,
) -> Vec<String> {
    match check_state(selected, rows, extractor) {
        CheckState::All => Vec::new(),
        CheckState::None | CheckState::Partial => rows
            .iter()
            .enumerate()
            .map(|(i, r)| row_key(r, i, extractor))
            .collect(),
    }
}

/// Shared state accessed by event handlers (wasm32 only).
#[cfg(target_arch = "wasm32")]
pub(crate) struct SharedState {
    pub(crate) options: GridOptions,
    pub(crate) rows: Vec<RowRecord>,
    /// Accumulated resize offsets; written only through drag commits.
    pub(crate) offsets: ColumnOffsets,
    /// Expanded-group keys; written only through group-header clicks.
    pub(crate) expanded: ExpandedGroups,
    pub(crate) selected: Vec<String>,
    pub(crate) shadow: ShadowSync,
    pub(crate) scroll_top: f32,
    pub(crate) scroll_left: f32,

    pub(crate) row_key_fn: Option<Function>,
    pub(crate) cell_renderers: HashMap<String, Function>,
    pub(crate) on_selection_change: Option<Function>,
    pub(crate) on_grouping_change: Option<Function>,

    // DOM skeleton
    pub(crate) container: HtmlDivElement,
    pub(crate) header_el: Option<HtmlDivElement>,
    pub(crate) fill_el: Option<HtmlDivElement>,
    pub(crate) viewport_el: Option<HtmlDivElement>,
    pub(crate) group_content_el: Option<HtmlDivElement>,
    /// Group body elements by group key, for scrollLeft mirroring.
    pub(crate) group_bodies: Vec<(String, HtmlDivElement)>,

    pub(crate) scroll_closure: Option<Closure<dyn FnMut(Event)>>,
    pub(crate) scroll_settle_timer: Option<i32>,
    pub(crate) scroll_settle_closure: Option<Closure<dyn FnMut()>>,
    pub(crate) last_scroll_ms: f64,
    /// Closures backing header handles and checkbox cells; kept alive for
    /// the lifetime of the rendered DOM they are attached to.
    pub(crate) cell_closures: Vec<Closure<dyn FnMut(MouseEvent)>>,
}

// Timing helper for WASM.
#[cfg(target_arch = "wasm32")]
pub(crate) fn now_ms() -> f64 {
    if let Some(window) = web_sys::window() {
        if let Some(perf) = window.performance() {
            return perf.now();
        }
    }
    js_sys::Date::now()
}

/// Resolve a row key through the configured JS extractor, if any.
#[cfg(target_arch = "wasm32")]
pub(crate) fn js_row_key(extractor: &Function, record: &RowRecord) -> Option<String> {
    let value = serde_wasm_bindgen::to_value(record).ok()?;
    extractor.call1(&JsValue::NULL, &value).ok()?.as_string()
}

/// The main viewer struct exported to JavaScript.
#[wasm_bindgen]
pub struct GridView {
    #[cfg(target_arch = "wasm32")]
    state: Rc<RefCell<SharedState>>,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl GridView {
    /// Create a viewer bound to a container element.
    ///
    /// `options` is a `GridOptions` object (camelCase keys). Fails on a
    /// non-positive row height or undecodable options.
    #[wasm_bindgen(constructor)]
    pub fn new(container: HtmlDivElement, options: JsValue) -> Result<GridView, JsValue> {
        console_error_panic_hook::set_once();

        let options: GridOptions = serde_wasm_bindgen::from_value(options)
            .map_err(|e| crate::error::GridError::Config(e.to_string()))?;
        if options.row_height <= 0.0 {
            return Err(crate::error::GridError::Config(
                "rowHeight must be positive".to_string(),
            )
            .into());
        }

        let state = Rc::new(RefCell::new(SharedState {
            options,
            rows: Vec::new(),
            offsets: ColumnOffsets::default(),
            expanded: ExpandedGroups::default(),
            selected: Vec::new(),
            shadow: ShadowSync::default(),
            scroll_top: 0.0,
            scroll_left: 0.0,
            row_key_fn: None,
            cell_renderers: HashMap::new(),
            on_selection_change: None,
            on_grouping_change: None,
            container,
            header_el: None,
            fill_el: None,
            viewport_el: None,
            group_content_el: None,
            group_bodies: Vec::new(),
            scroll_closure: None,
            scroll_settle_timer: None,
            scroll_settle_closure: None,
            last_scroll_ms: 0.0,
            cell_closures: Vec::new(),
        }));

        {
            let mut s = state.borrow_mut();
            if let Some(sel) = &s.options.row_selection {
                s.selected = sel.selected_keys.clone();
            }
            dom::build_skeleton(&mut s)?;
        }
        Self::attach_scroll_listener(&state)?;
        Self::render_pass(&state);

        Ok(GridView { state })
    }

    /// Replace the row data and re-render. Expansion and selection state
    /// survive the refresh (matched by key).
    pub fn load_rows(&self, rows: JsValue) -> Result<(), JsValue> {
        let rows: Vec<RowRecord> = serde_wasm_bindgen::from_value(rows)
            .map_err(|e| crate::error::GridError::Config(e.to_string()))?;
        self.state.borrow_mut().rows = rows;
        Self::render_pass(&self.state);
        Ok(())
    }

    /// Change the active grouping field (or clear it) and re-render.
    /// Emits the grouping change callback.
    pub fn set_group_field(&self, field: Option<String>) {
        let callback = {
            let mut s = self.state.borrow_mut();
            s.options.group_field = field.clone();
            s.on_grouping_change.clone()
        };
        if let Some(callback) = callback {
            let value = field.map_or(JsValue::UNDEFINED, |f| JsValue::from_str(&f));
            let _ = callback.call1(&JsValue::NULL, &value);
        }
        Self::render_pass(&self.state);
    }

    /// Replace the selected-key set from the embedding side (controlled
    /// usage). Does not emit the selection callback.
    pub fn set_selected_keys(&self, keys: JsValue) -> Result<(), JsValue> {
        let keys: Vec<String> = serde_wasm_bindgen::from_value(keys)
            .map_err(|e| crate::error::GridError::Config(e.to_string()))?;
        self.state.borrow_mut().selected = keys;
        Self::render_pass(&self.state);
        Ok(())
    }

    /// Toggle a group's expansion by key and re-render.
    pub fn toggle_group(&self, key: &str) {
        self.state.borrow_mut().expanded.toggle(key);
        Self::render_pass(&self.state);
    }

    /// Clear all accumulated resize offsets (the external "reset columns"
    /// action) and re-render.
    pub fn reset_columns(&self) {
        self.state.borrow_mut().offsets.clear();
        Self::render_pass(&self.state);
    }

    /// Register the selection change callback: `(newSelectedKeys) => void`.
    pub fn on_selection_change(&self, callback: Function) {
        self.state.borrow_mut().on_selection_change = Some(callback);
    }

    /// Register the grouping change callback:
    /// `(newGroupField | undefined) => void`.
    pub fn on_grouping_change(&self, callback: Function) {
        self.state.borrow_mut().on_grouping_change = Some(callback);
    }

    /// Register a per-column cell renderer:
    /// `(value, record, rowIndex) => string`. `rowIndex` is the row's index
    /// within the rendered window, not the global row index.
    pub fn set_cell_renderer(&self, column_id: &str, renderer: Function) {
        self.state
            .borrow_mut()
            .cell_renderers
            .insert(column_id.to_string(), renderer);
        Self::render_pass(&self.state);
    }

    /// Register the row-key extractor: `(record) => key`.
    pub fn set_row_key(&self, extractor: Function) {
        self.state.borrow_mut().row_key_fn = Some(extractor);
        Self::render_pass(&self.state);
    }

    /// Currently selected row keys.
    pub fn selected_keys(&self) -> Vec<String> {
        self.state.borrow().selected.clone()
    }
}

#[cfg(target_arch = "wasm32")]
impl GridView {
    /// Recompute layout from current inputs and rewrite the DOM.
    pub(crate) fn render_pass(state: &Rc<RefCell<SharedState>>) {
        let pass = {
            let s = state.borrow();
            run_layout_pass(
                &s.options,
                &s.rows,
                &s.offsets,
                &s.expanded,
                s.scroll_top,
            )
        };
        if let Err(e) = dom::render(state, &pass) {
            web_sys::console::warn_1(&JsValue::from_str(&e.to_string()));
        }
    }

    /// Toggle one row's selection and emit the callback.
    pub(crate) fn toggle_selection(state: &Rc<RefCell<SharedState>>, key: &str) {
        let (next, callback) = {
            let s = state.borrow();
            (toggle_row_key(&s.selected, key), s.on_selection_change.clone())
        };
        state.borrow_mut().selected = next.clone();
        Self::emit_selection(callback, &next);
        Self::render_pass(state);
    }

    /// Header checkbox: select all rows or clear, then emit the callback.
    pub(crate) fn toggle_select_all(state: &Rc<RefCell<SharedState>>) {
        let (next, callback) = {
            let s = state.borrow();
            let key_fn = s.row_key_fn.clone().map(move_extractor);
            let key_ref: Option<RowKeyFn<'_>> = match &key_fn {
                Some(f) => Some(f),
                None => None,
            };
            (
                toggle_all_keys(&s.selected, &s.rows, key_ref),
                s.on_selection_change.clone(),
            )
        };
        state.borrow_mut().selected = next.clone();
        Self::emit_selection(callback, &next);
        Self::render_pass(state);
    }

    fn emit_selection(callback: Option<Function>, keys: &[String]) {
        if let Some(callback) = callback {
            let array = js_sys::Array::new();
            for key in keys {
                array.push(&JsValue::from_str(key));
            }
            let _ = callback.call1(&JsValue::NULL, &array);
        }
    }
}

/// Adapt a JS extractor function into the layout-pass callback shape.
#[cfg(target_arch = "wasm32")]
fn move_extractor(f: Function) -> impl Fn(&RowRecord) -> Option<String> {
    move |record| js_row_key(&f, record)
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
    use serde_json::json;

    fn options(columns: Vec<ColumnSpec>, group_field: Option<&str>) -> GridOptions {
        GridOptions {
            columns,
            row_height: 40.0,
            header_height: None,
            fixed_header: true,
            scroll: ScrollBox {
                x: None,
                y: 400.0,
            },
            group_field: group_field.map(str::to_string),
            row_selection: None,
        }
    }

    fn rows(n: usize) -> Vec<RowRecord> {
        (0..n)
            .map(|i| {
                let mut rec = RowRecord::new();
                rec.insert("id".to_string(), json!(i));
                rec.insert(
                    "status".to_string(),
                    json!(if i % 2 == 0 { "even" } else { "odd" }),
                );
                rec
            })
            .collect()
    }

    #[test]
    fn pass_windows_when_no_group_field() {
        let opts = options(vec![ColumnSpec::new("a", "A", 100.0)], None);
        let pass = run_layout_pass(
            &opts,
            &rows(1000),
            &ColumnOffsets::default(),
            &ExpandedGroups::default(),
            80.0,
        );
        match pass.body {
            BodyLayout::Windowed(w) => {
                assert_eq!(w.render_start, 0);
                assert_eq!(w.render_end, 14);
            }
            BodyLayout::Grouped { .. } => panic!("expected a windowed body"),
        }
    }

    #[test]
    fn pass_groups_when_field_is_set() {
        let opts = options(vec![ColumnSpec::new("a", "A", 100.0)], Some("status"));
        let pass = run_layout_pass(
            &opts,
            &rows(10),
            &ColumnOffsets::default(),
            &ExpandedGroups::default(),
            0.0,
        );
        match pass.body {
            BodyLayout::Grouped { groups, layout } => {
                assert_eq!(groups.len(), 2);
                assert_eq!(layout.tops.len(), 2);
            }
            BodyLayout::Windowed(_) => panic!("expected a grouped body"),
        }
    }

    #[test]
    fn options_decode_from_camel_case_json() {
        let opts: GridOptions = serde_json::from_value(json!({
            "columns": [
                {"id": "name", "title": "Name", "width": 120.0, "fixed": "left"},
                {"id": "meta", "title": "Meta", "width": 0.0, "children": [
                    {"id": "a", "title": "A", "width": 80.0},
                    {"id": "b", "title": "B", "width": 80.0}
                ]}
            ],
            "rowHeight": 40.0,
            "fixedHeader": true,
            "scroll": {"x": "100%", "y": 400.0},
            "groupField": "status",
            "rowSelection": {"fixed": "left", "selectedKeys": ["1"]}
        }))
        .unwrap();
        assert_eq!(opts.row_height, 40.0);
        assert_eq!(opts.group_field.as_deref(), Some("status"));
        assert_eq!(opts.scroll.x, Some(Extent::Css("100%".to_string())));
        let layout_cols = opts.layout_columns();
        assert_eq!(layout_cols[0].id, crate::types::SELECTION_COLUMN_ID);
        assert_eq!(layout_cols.len(), 3);
    }

    #[test]
    fn toggle_row_key_round_trips() {
        let selected = vec!["a".to_string()];
        let added = toggle_row_key(&selected, "b");
        assert_eq!(added, vec!["a".to_string(), "b".to_string()]);
        let removed = toggle_row_key(&added, "a");
        assert_eq!(removed, vec!["b".to_string()]);
    }

    #[test]
    fn toggle_all_selects_then_clears() {
        let data = rows(3);
        let all = toggle_all_keys(&[], &data, None);
        assert_eq!(all, vec!["0", "1", "2"]);
        let cleared = toggle_all_keys(&all, &data, None);
        assert!(cleared.is_empty());
    }

    #[test]
    fn toggle_all_from_partial_selects_everything() {
        let data = rows(3);
        let partial = vec!["1".to_string()];
        let all = toggle_all_keys(&partial, &data, None);
        assert_eq!(all.len(), 3);
    }
}
