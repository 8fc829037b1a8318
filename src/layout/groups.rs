//! Row grouping: partition, vertical layout, and visibility culling.
//!
//! Rows are partitioned into ordered groups by a configured field value.
//! Group tops accumulate from prior groups' heights (expansion-aware), and
//! off-screen groups — or rows inside an expanded group — are culled
//! independently against the viewport with a fixed reserve. The expanded-key
//! set lives here and survives data refreshes: membership is matched by
//! group key, never by index.

use std::collections::HashSet;

use crate::types::{json_key, RowRecord};

/// Vertical space a group's header and gap occupy, regardless of expansion.
pub const GROUP_CHROME_HEIGHT: f32 = 54.0; // 42px header + 12px gap

/// Default table header height above the first group.
pub const DEFAULT_HEADER_HEIGHT: f32 = 60.0;

/// Fixed gap between the table header and the first group.
pub const HEADER_GAP: f32 = 12.0;

/// Extra height kept renderable beyond both viewport edges before a group
/// or row is culled.
pub const CULL_RESERVE: f32 = 100.0;

/// Bucket key for rows whose grouping field is absent. Such rows are kept,
/// not silently dropped.
pub const UNDEFINED_GROUP_KEY: &str = "undefined";

/// One group: its key and member rows (indices into the data source, in
/// source order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowGroup {
    pub key: String,
    pub rows: Vec<usize>,
}

impl RowGroup {
    /// Number of member rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True for a group with no member rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Partition rows by the configured field value.
///
/// Groups are ordered by first-seen key, not sorted by value; rows keep
/// their source order within each group.
pub fn partition_rows(rows: &[RowRecord], field: &str) -> Vec<RowGroup> {
    let mut groups: Vec<RowGroup> = Vec::new();
    let mut index_by_key: std::collections::HashMap<String, usize> =
        std::collections::HashMap::new();

    for (row_idx, record) in rows.iter().enumerate() {
        let key = record
            .get(field)
            .map_or_else(|| UNDEFINED_GROUP_KEY.to_string(), json_key);
        match index_by_key.get(&key) {
            Some(&group_idx) => {
                if let Some(group) = groups.get_mut(group_idx) {
                    group.rows.push(row_idx);
                }
            }
            None => {
                index_by_key.insert(key.clone(), groups.len());
                groups.push(RowGroup {
                    key,
                    rows: vec![row_idx],
                });
            }
        }
    }
    groups
}

/// Expanded-group keys, owned by the grouping engine.
///
/// Written only through [`ExpandedGroups::toggle`]; treated as read-only
/// everywhere else. Keys survive data refreshes until explicitly toggled.
#[derive(Debug, Clone, Default)]
pub struct ExpandedGroups {
    keys: HashSet<String>,
}

impl ExpandedGroups {
    /// Whether the group with this key is currently expanded.
    pub fn is_expanded(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Flip a group's expansion; returns the new state.
    pub fn toggle(&mut self, key: &str) -> bool {
        if self.keys.remove(key) {
            false
        } else {
            self.keys.insert(key.to_string());
            true
        }
    }
}

/// Vertical layout of all groups for one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupLayout {
    /// Absolute top offset per group, in the same frame as the container's
    /// scrollTop (the table header is part of the scroll content).
    pub tops: Vec<f32>,
    /// Full height per group: chrome plus the expanded body, if any.
    pub heights: Vec<f32>,
    /// Total height of the group content area (the scrollable placeholder
    /// below the header).
    pub content_height: f32,
}

impl GroupLayout {
    /// Top offset of a group, 0 for out-of-range indices.
    pub fn top(&self, idx: usize) -> f32 {
        self.tops.get(idx).copied().unwrap_or(0.0)
    }

    /// Height of a group, 0 for out-of-range indices.
    pub fn height(&self, idx: usize) -> f32 {
        self.heights.get(idx).copied().unwrap_or(0.0)
    }
}

/// Compute group tops and heights.
///
/// Group 0 sits below the header and its fixed gap; each later group's top
/// adds the previous group's expanded body (if any) plus the constant group
/// chrome. Toggling expansion changes only height contributions, never
/// group order.
pub fn layout_groups(
    groups: &[RowGroup],
    expanded: &ExpandedGroups,
    row_height: f32,
    header_height: f32,
) -> GroupLayout {
    let mut tops = Vec::with_capacity(groups.len());
    let mut heights = Vec::with_capacity(groups.len());
    let mut content_height = 0.0;

    let mut top = header_height + HEADER_GAP;
    for group in groups {
        let body = if expanded.is_expanded(&group.key) {
            group.len() as f32 * row_height
        } else {
            0.0
        };
        tops.push(top);
        heights.push(GROUP_CHROME_HEIGHT + body);
        content_height += GROUP_CHROME_HEIGHT + body;
        top += GROUP_CHROME_HEIGHT + body;
    }

    GroupLayout {
        tops,
        heights,
        content_height,
    }
}

/// Whether a vertical extent lies entirely outside the viewport plus the
/// cull reserve on both sides.
pub fn is_culled(top: f32, height: f32, scroll_top: f32, viewport_height: f32) -> bool {
    top > scroll_top + viewport_height + CULL_RESERVE || top + height < scroll_top - CULL_RESERVE
}

/// Top offset of a member row within an expanded group.
pub fn group_row_top(group_top: f32, row_index: usize, row_height: f32) -> f32 {
    group_top + row_index as f32 * row_height
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

    fn rows_with_status(statuses: &[Option<&str>]) -> Vec<RowRecord> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                let mut rec = RowRecord::new();
                rec.insert("id".to_string(), json!(i));
                if let Some(s) = status {
                    rec.insert("status".to_string(), json!(s));
                }
                rec
            })
            .collect()
    }

    #[test]
    fn partition_keeps_first_seen_order() {
        let rows = rows_with_status(&[
            Some("open"),
            Some("done"),
            Some("open"),
            Some("blocked"),
            Some("done"),
        ]);
        let groups = partition_rows(&rows, "status");
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["open", "done", "blocked"]);
        assert_eq!(groups[0].rows, vec![0, 2]);
        assert_eq!(groups[1].rows, vec![1, 4]);
    }

    #[test]
    fn missing_field_buckets_under_undefined() {
        let rows = rows_with_status(&[Some("open"), None, None]);
        let groups = partition_rows(&rows, "status");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].key, UNDEFINED_GROUP_KEY);
        assert_eq!(groups[1].rows, vec![1, 2]);
    }

    #[test]
    fn partition_is_complete() {
        let rows = rows_with_status(&[Some("a"), Some("b"), None, Some("a"), Some("c")]);
        let groups = partition_rows(&rows, "status");
        let total: usize = groups.iter().map(RowGroup::len).sum();
        assert_eq!(total, rows.len());
    }

    #[test]
    fn scenario_collapsed_group_contributes_only_chrome() {
        // group A: 5 rows collapsed, group B: 3 rows expanded, H=40
        let rows = rows_with_status(&[
            Some("a"),
            Some("a"),
            Some("a"),
            Some("a"),
            Some("a"),
            Some("b"),
            Some("b"),
            Some("b"),
        ]);
        let groups = partition_rows(&rows, "status");
        let mut expanded = ExpandedGroups::default();
        expanded.toggle("b");

        let layout = layout_groups(&groups, &expanded, 40.0, DEFAULT_HEADER_HEIGHT);
        assert_eq!(layout.top(0), DEFAULT_HEADER_HEIGHT + HEADER_GAP);
        assert_eq!(layout.top(1), layout.top(0) + GROUP_CHROME_HEIGHT);
        assert_eq!(layout.height(0), GROUP_CHROME_HEIGHT);
        assert_eq!(layout.height(1), GROUP_CHROME_HEIGHT + 3.0 * 40.0);
    }

    #[test]
    fn expanded_group_pushes_later_groups_down() {
        let rows = rows_with_status(&[Some("a"), Some("a"), Some("b")]);
        let groups = partition_rows(&rows, "status");
        let mut expanded = ExpandedGroups::default();
        expanded.toggle("a");

        let layout = layout_groups(&groups, &expanded, 40.0, DEFAULT_HEADER_HEIGHT);
        assert_eq!(
            layout.top(1),
            layout.top(0) + GROUP_CHROME_HEIGHT + 2.0 * 40.0
        );
    }

    #[test]
    fn content_height_sums_group_heights() {
        let rows = rows_with_status(&[Some("a"), Some("b"), Some("b")]);
        let groups = partition_rows(&rows, "status");
        let mut expanded = ExpandedGroups::default();
        expanded.toggle("b");

        let layout = layout_groups(&groups, &expanded, 40.0, DEFAULT_HEADER_HEIGHT);
        assert_eq!(
            layout.content_height,
            2.0 * GROUP_CHROME_HEIGHT + 2.0 * 40.0
        );
    }

    #[test]
    fn toggle_round_trips() {
        let mut expanded = ExpandedGroups::default();
        assert!(!expanded.is_expanded("k"));
        assert!(expanded.toggle("k"));
        assert!(expanded.is_expanded("k"));
        assert!(!expanded.toggle("k"));
        assert!(!expanded.is_expanded("k"));
    }

    #[test]
    fn expansion_survives_data_refresh() {
        let mut expanded = ExpandedGroups::default();
        expanded.toggle("done");

        // refreshed data: same key, different rows and position
        let rows = rows_with_status(&[Some("new"), Some("done")]);
        let groups = partition_rows(&rows, "status");
        let done = groups.iter().find(|g| g.key == "done").unwrap();
        assert!(expanded.is_expanded(&done.key));
    }

    #[test]
    fn culling_is_symmetric_about_the_viewport() {
        let viewport = 400.0;
        let scroll = 1000.0;
        // entirely above (even with reserve)
        assert!(is_culled(500.0, 300.0, scroll, viewport));
        // entirely below
        assert!(is_culled(1600.0, 100.0, scroll, viewport));
        // straddles the top edge
        assert!(!is_culled(950.0, 100.0, scroll, viewport));
        // within the reserve band above
        assert!(!is_culled(850.0, 60.0, scroll, viewport));
        // within the reserve band below
        assert!(!is_culled(1450.0, 60.0, scroll, viewport));
    }

    #[test]
    fn row_tops_step_by_row_height() {
        assert_eq!(group_row_top(200.0, 0, 40.0), 200.0);
        assert_eq!(group_row_top(200.0, 3, 40.0), 320.0);
    }
}
