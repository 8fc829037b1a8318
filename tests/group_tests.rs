//! Grouping tests for gridview
//!
//! Tests for partition order, cumulative group tops, culling, expansion
//! persistence, and the grouped layout pass end to end.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use gridview::layout::{
    group_row_top, is_culled, layout_groups, partition_rows, ExpandedGroups, RowGroup,
    ScrollMetrics, ShadowEdges, ShadowSync, CULL_RESERVE, DEFAULT_HEADER_HEIGHT,
    GROUP_CHROME_HEIGHT, HEADER_GAP, UNDEFINED_GROUP_KEY,
};
use gridview::types::{ColumnSpec, RowRecord};
use gridview::viewer::{run_layout_pass, BodyLayout, Extent, GridOptions, ScrollBox};
use serde_json::json;

const ROW_HEIGHT: f32 = 40.0;

/// Build work-item rows cycling through the given status values
fn rows(statuses: &[&str], per_status: usize) -> Vec<RowRecord> {
    let mut out = Vec::new();
    for round in 0..per_status {
        for status in statuses {
            let mut rec = RowRecord::new();
            rec.insert(
                "id".to_string(),
                json!(format!("{status}-{round}")),
            );
            rec.insert("status".to_string(), json!(status));
            out.push(rec);
        }
    }
    out
}

fn grouped_options() -> GridOptions {
    GridOptions {
        columns: vec![
            ColumnSpec::new("id", "ID", 120.0),
            ColumnSpec::new("status", "Status", 100.0),
        ],
        row_height: ROW_HEIGHT,
        header_height: None,
        fixed_header: true,
        scroll: ScrollBox {
            x: Some(Extent::Px(800.0)),
            y: 400.0,
        },
        group_field: Some("status".to_string()),
        row_selection: None,
    }
}

#[test]
fn scenario_collapsed_then_expanded_group_tops() {
    // group A: 5 rows collapsed, group B: 3 rows expanded
    let mut data = rows(&["a"], 5);
    data.extend(rows(&["b"], 3));
    let groups = partition_rows(&data, "status");
    let mut expanded = ExpandedGroups::default();
    expanded.toggle("b");

    let layout = layout_groups(&groups, &expanded, ROW_HEIGHT, DEFAULT_HEADER_HEIGHT);
    // B's top == A's top + 54: the collapsed group contributes no body height
    assert_eq!(layout.top(1), layout.top(0) + GROUP_CHROME_HEIGHT);
    assert_eq!(GROUP_CHROME_HEIGHT, 54.0);
}

#[test]
fn all_expanded_renders_every_input_row() {
    let data = rows(&["open", "blocked", "done"], 7);
    let groups = partition_rows(&data, "status");
    let mut expanded = ExpandedGroups::default();
    for group in &groups {
        expanded.toggle(&group.key);
    }

    // no culling: every member of every group is renderable
    let rendered: usize = groups
        .iter()
        .filter(|g| expanded.is_expanded(&g.key))
        .map(RowGroup::len)
        .sum();
    assert_eq!(rendered, data.len());
}

#[test]
fn toggling_never_reorders_groups() {
    let data = rows(&["x", "y", "z"], 2);
    let groups = partition_rows(&data, "status");
    let keys: Vec<String> = groups.iter().map(|g| g.key.clone()).collect();

    let mut expanded = ExpandedGroups::default();
    expanded.toggle("y");
    let after_toggle = partition_rows(&data, "status");
    assert_eq!(
        after_toggle.iter().map(|g| g.key.clone()).collect::<Vec<_>>(),
        keys
    );

    // only tops below the toggled group move
    let collapsed = layout_groups(&groups, &ExpandedGroups::default(), ROW_HEIGHT, 60.0);
    let toggled = layout_groups(&groups, &expanded, ROW_HEIGHT, 60.0);
    assert_eq!(toggled.top(0), collapsed.top(0));
    assert_eq!(toggled.top(1), collapsed.top(1));
    assert_eq!(toggled.top(2), collapsed.top(2) + 2.0 * ROW_HEIGHT);
}

#[test]
fn missing_group_field_rows_are_kept() {
    let mut data = rows(&["known"], 2);
    let mut stray = RowRecord::new();
    stray.insert("id".to_string(), json!("stray"));
    data.push(stray);

    let groups = partition_rows(&data, "status");
    let undefined = groups
        .iter()
        .find(|g| g.key == UNDEFINED_GROUP_KEY)
        .unwrap();
    assert_eq!(undefined.len(), 1);
    let total: usize = groups.iter().map(RowGroup::len).sum();
    assert_eq!(total, data.len());
}

#[test]
fn off_screen_groups_are_culled_with_reserve() {
    let data = rows(&["a", "b", "c", "d", "e", "f", "g", "h"], 10);
    let groups = partition_rows(&data, "status");
    let mut expanded = ExpandedGroups::default();
    for group in &groups {
        expanded.toggle(&group.key);
    }
    let layout = layout_groups(&groups, &expanded, ROW_HEIGHT, DEFAULT_HEADER_HEIGHT);

    let viewport = 400.0;
    let scroll_top = layout.top(4); // looking at the middle of the list

    let visible: Vec<usize> = (0..groups.len())
        .filter(|&i| !is_culled(layout.top(i), layout.height(i), scroll_top, viewport))
        .collect();

    // the groups straddling the viewport survive
    assert!(visible.contains(&4));
    // far-away groups are culled
    assert!(!visible.contains(&0));
    assert!(!visible.contains(&7));

    // everything culled is genuinely outside the reserve band
    for i in 0..groups.len() {
        if !visible.contains(&i) {
            let top = layout.top(i);
            let bottom = top + layout.height(i);
            assert!(
                top > scroll_top + viewport + CULL_RESERVE || bottom < scroll_top - CULL_RESERVE
            );
        }
    }
}

#[test]
fn rows_inside_an_expanded_group_cull_independently() {
    let data = rows(&["big"], 200);
    let groups = partition_rows(&data, "status");
    let mut expanded = ExpandedGroups::default();
    expanded.toggle("big");
    let layout = layout_groups(&groups, &expanded, ROW_HEIGHT, DEFAULT_HEADER_HEIGHT);

    let viewport = 400.0;
    let scroll_top = 2000.0;
    let top = layout.top(0);

    let rendered: Vec<usize> = (0..200)
        .filter(|&i| {
            !is_culled(
                group_row_top(top, i, ROW_HEIGHT),
                ROW_HEIGHT,
                scroll_top,
                viewport,
            )
        })
        .collect();

    // a bounded slice of the group, not all 200 rows
    assert!(!rendered.is_empty());
    assert!(rendered.len() < 40);
    // the slice is contiguous
    for pair in rendered.windows(2) {
        assert_eq!(pair[1], pair[0] + 1);
    }
}

#[test]
fn expansion_state_survives_a_data_refresh() {
    let mut expanded = ExpandedGroups::default();
    expanded.toggle("blocked");

    // refreshed data arrives with the key at a different position
    let refreshed = rows(&["done", "blocked", "open"], 3);
    let groups = partition_rows(&refreshed, "status");
    let blocked_idx = groups.iter().position(|g| g.key == "blocked").unwrap();
    assert_eq!(blocked_idx, 1);
    assert!(expanded.is_expanded("blocked"));

    let layout = layout_groups(&groups, &expanded, ROW_HEIGHT, DEFAULT_HEADER_HEIGHT);
    assert_eq!(
        layout.height(blocked_idx),
        GROUP_CHROME_HEIGHT + 3.0 * ROW_HEIGHT
    );
}

#[test]
fn first_group_sits_below_the_header_gap() {
    let data = rows(&["only"], 1);
    let groups = partition_rows(&data, "status");
    let layout = layout_groups(&groups, &ExpandedGroups::default(), ROW_HEIGHT, 60.0);
    assert_eq!(layout.top(0), 60.0 + HEADER_GAP);
}

#[test]
fn grouped_layout_pass_produces_group_body() {
    let data = rows(&["open", "done"], 4);
    let pass = run_layout_pass(
        &grouped_options(),
        &data,
        &gridview::layout::ColumnOffsets::default(),
        &ExpandedGroups::default(),
        0.0,
    );
    match pass.body {
        BodyLayout::Grouped { groups, layout } => {
            assert_eq!(groups.len(), 2);
            assert_eq!(layout.content_height, 2.0 * GROUP_CHROME_HEIGHT);
        }
        BodyLayout::Windowed(_) => panic!("expected grouped body"),
    }
}

#[test]
fn grouped_shadow_uses_the_table_scroll_signal() {
    let mut sync = ShadowSync::default();
    let metrics = ScrollMetrics {
        scroll_left: 0.0,
        scroll_top: 500.0, // header element's own scrollTop
        scroll_width: 1600.0,
        client_width: 800.0,
    };

    // table not scrolled: no top shadow despite the header metric
    let edges = ShadowEdges::derive_grouped(&metrics, 0.0);
    assert_eq!(sync.update(edges), Some(edges));
    assert!(!sync.current().top);
    assert!(sync.current().right);

    // table scrolls down: top shadow appears, and the change is reported
    let edges = ShadowEdges::derive_grouped(&metrics, 64.0);
    let changed = sync.update(edges).unwrap();
    assert!(changed.top);

    // identical derivation afterwards is suppressed
    assert_eq!(sync.update(edges), None);
}
