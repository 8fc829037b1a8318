//! DOM writer for `GridView`.
//!
//! Rebuilds the header and the windowed or grouped body from one layout
//! pass. Only structure and geometry are written here — widths, sticky
//! offsets, the window translation, shadow marker classes; all visual
//! styling lives in the embedding page's stylesheet.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlDivElement, MouseEvent};

use super::{js_row_key, BodyLayout, GridView, LayoutPass, SharedState};
use crate::error::{GridError, Result};
use crate::layout::{group_row_top, is_culled, ColumnGeometry, GroupLayout, RowGroup};
use crate::types::{
    check_state, row_key, CheckState, FixedSide, RowRecord, SELECTION_COLUMN_ID,
};

fn document() -> Result<Document> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| GridError::Dom("no document".to_string()))
}

fn div(document: &Document, class: &str) -> Result<HtmlDivElement> {
    let element = document
        .create_element("div")
        .map_err(|_| GridError::Dom("create element".to_string()))?;
    element.set_class_name(class);
    element
        .dyn_into::<HtmlDivElement>()
        .map_err(|_| GridError::Dom("element cast".to_string()))
}

fn set_style(element: &HtmlDivElement, property: &str, value: &str) {
    let _ = element.style().set_property(property, value);
}

fn px(value: f32) -> String {
    format!("{value}px")
}

/// Build the static container skeleton once, at construction.
pub(crate) fn build_skeleton(s: &mut SharedState) -> Result<()> {
    let doc = document()?;

    s.container.set_class_name("gridview-wrap");
    set_style(&s.container, "overflow", "auto");
    set_style(&s.container, "max-height", &px(s.options.scroll.y));
    match &s.options.scroll.x {
        Some(super::Extent::Px(x)) => set_style(&s.container, "max-width", &px(*x)),
        Some(super::Extent::Css(x)) => set_style(&s.container, "max-width", x),
        None => {}
    }

    let header = div(&doc, "gridview-header")?;
    set_style(&header, "height", &px(s.options.header_height()));
    if s.options.fixed_header {
        set_style(&header, "position", "sticky");
        set_style(&header, "top", "0");
    }
    s.container
        .append_child(&header)
        .map_err(|_| GridError::Dom("append header".to_string()))?;
    s.header_el = Some(header);
    Ok(())
}

/// Rewrite the DOM from a layout pass. Failures are reported to the console
/// by the caller; they never corrupt layout state.
pub(crate) fn render(state: &Rc<RefCell<SharedState>>, pass: &LayoutPass) -> Result<()> {
    let doc = document()?;
    {
        let mut s = state.borrow_mut();
        // Rendered cells from the previous pass are dropped wholesale, and
        // their closures with them.
        s.cell_closures.clear();
        s.group_bodies.clear();
    }

    render_header(state, &doc, pass)?;
    match &pass.body {
        BodyLayout::Windowed(window) => render_window(state, &doc, pass, *window),
        BodyLayout::Grouped { groups, layout } => {
            render_groups(state, &doc, pass, groups, layout)
        }
    }
}

fn render_header(
    state: &Rc<RefCell<SharedState>>,
    doc: &Document,
    pass: &LayoutPass,
) -> Result<()> {
    let header = {
        let s = state.borrow();
        s.header_el
            .clone()
            .ok_or_else(|| GridError::Dom("header not built".to_string()))?
    };
    header.set_inner_html("");

    let top_shadow = { state.borrow().shadow.current().top };
    if top_shadow {
        let _ = header.class_list().add_1("shadow");
    } else {
        let _ = header.class_list().remove_1("shadow");
    }

    let order = pass.geometry.root_order.clone();
    for idx in order {
        let cell = header_cell(state, doc, pass, idx)?;
        header
            .append_child(&cell)
            .map_err(|_| GridError::Dom("append header cell".to_string()))?;
    }
    Ok(())
}

/// One header cell, recursing into child columns.
fn header_cell(
    state: &Rc<RefCell<SharedState>>,
    doc: &Document,
    pass: &LayoutPass,
    idx: usize,
) -> Result<HtmlDivElement> {
    let Some(node) = pass.arena.get(idx) else {
        return Err(GridError::Render(format!("missing column node {idx}")));
    };
    let wrap = div(doc, "header-cell-wrap")?;
    apply_cell_geometry(&wrap, &pass.geometry, idx, node.fixed, state);

    // Resize handle: grabs a drag session for this column id.
    let handle = div(doc, "resize-handle")?;
    {
        let weak = Rc::downgrade(state);
        let column_id = node.id.clone();
        let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
            event.prevent_default();
            event.stop_propagation();
            if let Some(state) = weak.upgrade() {
                super::events::start_drag(&state, &column_id, event.client_x() as f32);
            }
        }) as Box<dyn FnMut(MouseEvent)>);
        handle
            .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())
            .map_err(|_| GridError::Dom("handle listener".to_string()))?;
        state.borrow_mut().cell_closures.push(closure);
    }
    wrap.append_child(&handle)
        .map_err(|_| GridError::Dom("append handle".to_string()))?;

    let title = div(doc, &format!("cell {}", align_class(node.align)))?;
    set_style(&title, "width", &px(pass.geometry.width(idx)));
    if node.id == SELECTION_COLUMN_ID {
        build_header_checkbox(state, doc, &title)?;
    } else {
        title.set_text_content(Some(&node.title));
    }
    wrap.append_child(&title)
        .map_err(|_| GridError::Dom("append title".to_string()))?;

    if !node.children.is_empty() {
        let children_wrap = div(doc, "children-cell-wrap")?;
        for &child in &node.children {
            let child_cell = header_cell(state, doc, pass, child)?;
            children_wrap
                .append_child(&child_cell)
                .map_err(|_| GridError::Dom("append child cell".to_string()))?;
        }
        wrap.append_child(&children_wrap)
            .map_err(|_| GridError::Dom("append children wrap".to_string()))?;
    }
    Ok(wrap)
}

/// Tri-state select-all checkbox in the header.
fn build_header_checkbox(
    state: &Rc<RefCell<SharedState>>,
    doc: &Document,
    parent: &HtmlDivElement,
) -> Result<()> {
    let checked = {
        let s = state.borrow();
        let key_fn = s.row_key_fn.clone().map(|f| move |r: &RowRecord| js_row_key(&f, r));
        let key_ref: Option<&dyn Fn(&RowRecord) -> Option<String>> = match &key_fn {
            Some(f) => Some(f),
            None => None,
        };
        check_state(&s.selected, &s.rows, key_ref)
    };
    let class = match checked {
        CheckState::All => "checkbox checked",
        CheckState::Partial => "checkbox indeterminate",
        CheckState::None => "checkbox",
    };
    let checkbox = div(doc, class)?;
    let weak = Rc::downgrade(state);
    let closure = Closure::wrap(Box::new(move |_: MouseEvent| {
        if let Some(state) = weak.upgrade() {
            GridView::toggle_select_all(&state);
        }
    }) as Box<dyn FnMut(MouseEvent)>);
    checkbox
        .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        .map_err(|_| GridError::Dom("checkbox listener".to_string()))?;
    state.borrow_mut().cell_closures.push(closure);
    parent
        .append_child(&checkbox)
        .map_err(|_| GridError::Dom("append checkbox".to_string()))?;
    Ok(())
}

/// Non-grouped body: one fill area sized to all rows, one viewport block
/// translated to the window start, window rows inside.
fn render_window(
    state: &Rc<RefCell<SharedState>>,
    doc: &Document,
    pass: &LayoutPass,
    window: crate::layout::WindowRange,
) -> Result<()> {
    // A grouping change may have left the grouped skeleton behind.
    {
        let mut s = state.borrow_mut();
        if let Some(group_content) = s.group_content_el.take() {
            group_content.remove();
        }
        if s.fill_el.is_none() {
            let fill = div(doc, "gridview-body")?;
            let viewport = div(doc, "gridview-viewport")?;
            set_style(&viewport, "position", "relative");
            fill.append_child(&viewport)
                .map_err(|_| GridError::Dom("append viewport".to_string()))?;
            s.container
                .append_child(&fill)
                .map_err(|_| GridError::Dom("append body".to_string()))?;
            s.fill_el = Some(fill);
            s.viewport_el = Some(viewport);
        }
    }

    let (fill, viewport) = {
        let s = state.borrow();
        (
            s.fill_el
                .clone()
                .ok_or_else(|| GridError::Dom("body not built".to_string()))?,
            s.viewport_el
                .clone()
                .ok_or_else(|| GridError::Dom("viewport not built".to_string()))?,
        )
    };

    set_style(&fill, "width", &px(pass.geometry.table_width));
    set_style(&fill, "height", &px(window.content_height));
    set_style(
        &viewport,
        "transform",
        &format!("translateY({})", px(window.translate_y)),
    );

    viewport.set_inner_html("");
    let (rows, row_height): (Vec<(usize, RowRecord)>, f32) = {
        let s = state.borrow();
        (
            s.rows
                .get(window.render_start..window.render_end)
                .unwrap_or_default()
                .iter()
                .cloned()
                .enumerate()
                .collect(),
            s.options.row_height,
        )
    };
    for (window_index, record) in rows {
        let row = table_row(state, doc, pass, &record, window_index)?;
        set_style(&row, "height", &px(row_height));
        viewport
            .append_child(&row)
            .map_err(|_| GridError::Dom("append row".to_string()))?;
    }
    Ok(())
}

/// Grouped body: absolutely-positioned group boxes below the header, each
/// with its own chrome and, when expanded, its member rows. Off-screen
/// groups and rows are culled.
fn render_groups(
    state: &Rc<RefCell<SharedState>>,
    doc: &Document,
    pass: &LayoutPass,
    groups: &[RowGroup],
    layout: &GroupLayout,
) -> Result<()> {
    {
        let mut s = state.borrow_mut();
        if let Some(fill) = s.fill_el.take() {
            fill.remove();
        }
        s.viewport_el = None;
        if s.group_content_el.is_none() {
            let content = div(doc, "group-content")?;
            set_style(&content, "position", "relative");
            s.container
                .append_child(&content)
                .map_err(|_| GridError::Dom("append group content".to_string()))?;
            s.group_content_el = Some(content);
        }
    }

    let content = {
        let s = state.borrow();
        s.group_content_el
            .clone()
            .ok_or_else(|| GridError::Dom("group content not built".to_string()))?
    };
    set_style(&content, "height", &px(layout.content_height));
    content.set_inner_html("");

    let (scroll_top, viewport_height, row_height, table_width, header_height) = {
        let s = state.borrow();
        (
            s.scroll_top,
            s.options.scroll.y,
            s.options.row_height,
            pass.geometry.table_width,
            s.options.header_height(),
        )
    };

    for (group_index, group) in groups.iter().enumerate() {
        let top = layout.top(group_index);
        let height = layout.height(group_index);
        if is_culled(top, height, scroll_top, viewport_height) {
            continue;
        }
        let expanded = { state.borrow().expanded.is_expanded(&group.key) };

        let class = if expanded { "group-box open" } else { "group-box" };
        let group_box = div(doc, class)?;
        set_style(&group_box, "position", "absolute");
        // Group tops are measured from the container's content origin; the
        // content element itself already sits below the header.
        set_style(&group_box, "top", &px(top - header_height));

        // Group chrome: toggles expansion on click.
        let group_header = div(doc, "group-header")?;
        let arrow = div(doc, "arrow-icon")?;
        group_header
            .append_child(&arrow)
            .map_err(|_| GridError::Dom("append arrow".to_string()))?;
        let tag = div(doc, "group-tag")?;
        tag.set_text_content(Some(&group.key));
        group_header
            .append_child(&tag)
            .map_err(|_| GridError::Dom("append tag".to_string()))?;
        let total = div(doc, "group-total")?;
        total.set_text_content(Some(&format!("{} rows", group.len())));
        group_header
            .append_child(&total)
            .map_err(|_| GridError::Dom("append total".to_string()))?;
        {
            let weak = Rc::downgrade(state);
            let key = group.key.clone();
            let closure = Closure::wrap(Box::new(move |_: MouseEvent| {
                if let Some(state) = weak.upgrade() {
                    state.borrow_mut().expanded.toggle(&key);
                    GridView::render_pass(&state);
                }
            }) as Box<dyn FnMut(MouseEvent)>);
            group_header
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
                .map_err(|_| GridError::Dom("group header listener".to_string()))?;
            state.borrow_mut().cell_closures.push(closure);
        }
        group_box
            .append_child(&group_header)
            .map_err(|_| GridError::Dom("append group header".to_string()))?;

        // Group body: horizontally scrollable, mirrored with the header.
        let body = div(doc, "group-body")?;
        let body_height = if expanded {
            group.len() as f32 * row_height
        } else {
            0.0
        };
        set_style(&body, "height", &px(body_height));
        set_style(&body, "overflow", "auto");
        set_style(&body, "position", "relative");

        let placeholder = div(doc, "group-placeholder")?;
        set_style(&placeholder, "width", &px(table_width));
        set_style(&placeholder, "height", "1px");
        body.append_child(&placeholder)
            .map_err(|_| GridError::Dom("append placeholder".to_string()))?;

        if expanded {
            let members: Vec<(usize, RowRecord)> = {
                let s = state.borrow();
                group
                    .rows
                    .iter()
                    .enumerate()
                    .filter_map(|(i, &row_idx)| s.rows.get(row_idx).cloned().map(|r| (i, r)))
                    .collect()
            };
            for (member_index, record) in members {
                let row_top = group_row_top(top, member_index, row_height);
                if is_culled(row_top, row_height, scroll_top, viewport_height) {
                    continue;
                }
                let row = table_row(state, doc, pass, &record, member_index)?;
                set_style(&row, "height", &px(row_height));
                set_style(&row, "position", "absolute");
                set_style(&row, "top", &px(member_index as f32 * row_height));
                body.append_child(&row)
                    .map_err(|_| GridError::Dom("append group row".to_string()))?;
            }
        }

        group_box
            .append_child(&body)
            .map_err(|_| GridError::Dom("append group body".to_string()))?;
        content
            .append_child(&group_box)
            .map_err(|_| GridError::Dom("append group box".to_string()))?;
        state
            .borrow_mut()
            .group_bodies
            .push((group.key.clone(), body));
    }
    Ok(())
}

/// One body row: a cell per leaf column, in render order.
fn table_row(
    state: &Rc<RefCell<SharedState>>,
    doc: &Document,
    pass: &LayoutPass,
    record: &RowRecord,
    window_index: usize,
) -> Result<HtmlDivElement> {
    let row = div(doc, "table-row")?;
    let leaf_order = pass.geometry.leaf_order.clone();
    for leaf in leaf_order {
        let cell = table_cell(state, doc, pass, leaf, record, window_index)?;
        row.append_child(&cell)
            .map_err(|_| GridError::Dom("append cell".to_string()))?;
    }
    Ok(row)
}

fn table_cell(
    state: &Rc<RefCell<SharedState>>,
    doc: &Document,
    pass: &LayoutPass,
    idx: usize,
    record: &RowRecord,
    window_index: usize,
) -> Result<HtmlDivElement> {
    let Some(node) = pass.arena.get(idx) else {
        return Err(GridError::Render(format!("missing column node {idx}")));
    };
    let cell = div(doc, &format!("cell {}", align_class(node.align)))?;
    apply_cell_geometry(&cell, &pass.geometry, idx, node.fixed, state);

    if node.id == SELECTION_COLUMN_ID {
        build_row_checkbox(state, doc, &cell, record, window_index)?;
        return Ok(cell);
    }

    let text = {
        let s = state.borrow();
        cell_content(&s, node, record, window_index)
    };
    cell.set_text_content(Some(&text));
    Ok(cell)
}

/// Cell content via the per-column renderer, invoked exactly once per
/// visible cell per render pass with `(value, record, windowRowIndex)`.
fn cell_content(
    s: &SharedState,
    node: &crate::layout::ColumnNode,
    record: &RowRecord,
    window_index: usize,
) -> String {
    let value = record.get(&node.id).cloned().unwrap_or(serde_json::Value::Null);
    if let Some(renderer) = s.cell_renderers.get(&node.id) {
        let js_value = serde_wasm_bindgen::to_value(&value).unwrap_or(JsValue::NULL);
        let js_record = serde_wasm_bindgen::to_value(record).unwrap_or(JsValue::NULL);
        if let Ok(out) = renderer.call3(
            &JsValue::NULL,
            &js_value,
            &js_record,
            &JsValue::from_f64(window_index as f64),
        ) {
            if let Some(text) = out.as_string() {
                return text;
            }
        }
    }
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Row checkbox cell: toggles this row's key in the selected set.
fn build_row_checkbox(
    state: &Rc<RefCell<SharedState>>,
    doc: &Document,
    parent: &HtmlDivElement,
    record: &RowRecord,
    window_index: usize,
) -> Result<()> {
    let key = {
        let s = state.borrow();
        match &s.row_key_fn {
            Some(f) => js_row_key(f, record)
                .unwrap_or_else(|| row_key(record, window_index, None)),
            None => row_key(record, window_index, None),
        }
    };
    let selected = { state.borrow().selected.iter().any(|k| *k == key) };
    let checkbox = div(doc, if selected { "checkbox checked" } else { "checkbox" })?;
    let weak = Rc::downgrade(state);
    let closure = Closure::wrap(Box::new(move |_: MouseEvent| {
        if let Some(state) = weak.upgrade() {
            GridView::toggle_selection(&state, &key);
        }
    }) as Box<dyn FnMut(MouseEvent)>);
    checkbox
        .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        .map_err(|_| GridError::Dom("row checkbox listener".to_string()))?;
    state.borrow_mut().cell_closures.push(closure);
    parent
        .append_child(&checkbox)
        .map_err(|_| GridError::Dom("append row checkbox".to_string()))?;
    Ok(())
}

/// Width, sticky offsets, and shadow marker classes shared by header and
/// body cells.
fn apply_cell_geometry(
    element: &HtmlDivElement,
    geometry: &ColumnGeometry,
    idx: usize,
    fixed: FixedSide,
    state: &Rc<RefCell<SharedState>>,
) {
    let width = geometry.width(idx);
    set_style(element, "width", &px(width));
    set_style(element, "min-width", &px(width));

    if fixed.is_fixed() {
        let _ = element.class_list().add_1("fixed");
        set_style(element, "position", "sticky");
    }
    if let Some(left) = geometry.left(idx) {
        set_style(element, "left", &px(left));
    }
    if let Some(right) = geometry.right(idx) {
        set_style(element, "right", &px(right));
    }
    match geometry.shadow_boundary(idx) {
        Some(FixedSide::Left) => {
            let _ = element.class_list().add_1("last-fixed-left");
        }
        Some(FixedSide::Right) => {
            let _ = element.class_list().add_1("last-fixed-right");
        }
        _ => {}
    }

    let edges = { state.borrow().shadow.current() };
    if edges.left {
        let _ = element.class_list().add_1("left-shadow");
    }
    if edges.right {
        let _ = element.class_list().add_1("right-shadow");
    }
}

fn align_class(align: crate::types::Align) -> &'static str {
    match align {
        crate::types::Align::Left => "align-left",
        crate::types::Align::Center => "align-center",
        crate::types::Align::Right => "align-right",
    }
}
