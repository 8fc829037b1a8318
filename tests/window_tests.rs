//! Windowing tests for gridview
//!
//! Tests for scroll-to-window mapping, buffer behavior, and the coverage
//! guarantee: every row intersecting the viewport is always rendered.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use gridview::layout::{compute_window, BUFFER_ROWS};
use test_case::test_case;

#[test]
fn scenario_row_height_forty_viewport_four_hundred() {
    // H=40, V=400 (10 visible rows), S=80 -> start=2
    let w = compute_window(500, 40.0, 400.0, 80.0);
    assert_eq!(w.render_start, 0);
    assert_eq!(w.render_end, 14);
}

#[test]
fn scenario_clamps_to_short_datasets() {
    let w = compute_window(8, 40.0, 400.0, 80.0);
    assert_eq!(w.render_end, 8);
}

#[test]
fn window_length_is_viewport_plus_buffers() {
    let w = compute_window(10_000, 40.0, 400.0, 4000.0);
    // 10 visible + look-behind and look-ahead buffers
    assert_eq!(w.len(), 10 + 2 * BUFFER_ROWS);
}

#[test]
fn translation_replaces_per_row_positioning() {
    let w = compute_window(10_000, 40.0, 400.0, 4000.0);
    assert_eq!(w.translate_y, w.render_start as f32 * 40.0);
}

#[test]
fn placeholder_covers_the_full_dataset() {
    let w = compute_window(2500, 40.0, 400.0, 0.0);
    assert_eq!(w.content_height, 100_000.0);
}

#[test]
fn top_of_list_has_no_look_behind() {
    let w = compute_window(100, 40.0, 400.0, 0.0);
    assert_eq!(w.render_start, 0);
}

#[test]
fn fractional_scroll_positions_round_down() {
    // scrollTop 79.9 is still inside row 1
    let w = compute_window(100, 40.0, 400.0, 79.9);
    let start = 1usize; // floor(79.9 / 40)
    assert_eq!(w.render_start, start.saturating_sub(BUFFER_ROWS));
}

// The §coverage guarantee, swept across row heights, viewport sizes, and
// scroll positions including unaligned and out-of-range ones.
#[test_case(1000, 40.0, 400.0; "even grid")]
#[test_case(1000, 28.0, 300.0; "viewport not a multiple of row height")]
#[test_case(37, 40.0, 400.0; "viewport taller than the dataset")]
#[test_case(1000, 22.0, 613.0; "odd sizes")]
fn every_visible_row_is_rendered(rows: usize, h: f32, v: f32) {
    let max_scroll = (rows as f32 * h - v).max(0.0);
    let scroll_samples = [
        0.0,
        h / 2.0,
        h * 3.0 + 1.0,
        max_scroll / 2.0,
        max_scroll - 0.5,
        max_scroll,
        max_scroll + 250.0, // overscroll bounce
    ];
    for &s in &scroll_samples {
        let s = s.max(0.0);
        let w = compute_window(rows, h, v, s);
        for row in 0..rows {
            let top = row as f32 * h;
            let bottom = top + h;
            if bottom > s && top < s + v {
                assert!(
                    row >= w.render_start && row < w.render_end,
                    "rows={rows} H={h} V={v} S={s}: row {row} outside [{}, {})",
                    w.render_start,
                    w.render_end
                );
            }
        }
    }
}

#[test]
fn windowed_slice_indices_translate_to_global() {
    let w = compute_window(1000, 40.0, 400.0, 2000.0);
    // a cell renderer sees window-relative indices; callers combine with
    // render_start for the global row index
    for window_index in 0..w.len() {
        assert_eq!(w.global_index(window_index), w.render_start + window_index);
    }
}
