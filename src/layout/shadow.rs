//! Scroll-shadow derivation.
//!
//! A small edge-indicator set derived from scroll metrics, used to render
//! divider shadows. This listens to the same scroll source as the windowing
//! engine but is orthogonal to it — not in the critical data path.

use serde::Serialize;

/// Scroll metrics sampled from the scroll container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_left: f32,
    pub scroll_top: f32,
    pub scroll_width: f32,
    pub client_width: f32,
}

/// Which edges currently have scrollable content beyond them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowEdges {
    pub left: bool,
    pub right: bool,
    pub top: bool,
}

impl ShadowEdges {
    /// Derive the edge set for the non-grouped table, where the container's
    /// own scrollTop drives the header shadow.
    pub fn derive(metrics: &ScrollMetrics) -> Self {
        Self {
            left: metrics.scroll_left > 0.0,
            right: metrics.scroll_left < metrics.scroll_width - metrics.client_width,
            top: metrics.scroll_top > 0.0,
        }
    }

    /// Derive the edge set for the grouped table, which substitutes a
    /// table-level scrollTop signal for the `top` edge (its header scrolls
    /// horizontally in a separate element).
    pub fn derive_grouped(metrics: &ScrollMetrics, table_scroll_top: f32) -> Self {
        Self {
            left: metrics.scroll_left > 0.0,
            right: metrics.scroll_left < metrics.scroll_width - metrics.client_width,
            top: table_scroll_top > 0.0,
        }
    }
}

/// Change-suppressing holder for the current edge set.
///
/// Downstream updates are skipped unless the derived set differs from the
/// previous one, to avoid redundant re-renders on every scroll tick.
#[derive(Debug, Clone, Default)]
pub struct ShadowSync {
    current: ShadowEdges,
}

impl ShadowSync {
    /// Current edge set.
    pub fn current(&self) -> ShadowEdges {
        self.current
    }

    /// Absorb a freshly derived set; returns it only when it differs from
    /// the previous one.
    pub fn update(&mut self, next: ShadowEdges) -> Option<ShadowEdges> {
        if next == self.current {
            None
        } else {
            self.current = next;
            Some(next)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn at_origin_only_right_shadow() {
        let edges = ShadowEdges::derive(&ScrollMetrics {
            scroll_left: 0.0,
            scroll_top: 0.0,
            scroll_width: 1200.0,
            client_width: 800.0,
        });
        assert!(!edges.left);
        assert!(edges.right);
        assert!(!edges.top);
    }

    #[test]
    fn mid_scroll_shows_both_horizontal_shadows() {
        let edges = ShadowEdges::derive(&ScrollMetrics {
            scroll_left: 200.0,
            scroll_top: 50.0,
            scroll_width: 1200.0,
            client_width: 800.0,
        });
        assert!(edges.left);
        assert!(edges.right);
        assert!(edges.top);
    }

    #[test]
    fn fully_scrolled_right_drops_the_right_shadow() {
        let edges = ShadowEdges::derive(&ScrollMetrics {
            scroll_left: 400.0,
            scroll_top: 0.0,
            scroll_width: 1200.0,
            client_width: 800.0,
        });
        assert!(edges.left);
        assert!(!edges.right);
    }

    #[test]
    fn unscrollable_content_has_no_shadows() {
        let edges = ShadowEdges::derive(&ScrollMetrics {
            scroll_left: 0.0,
            scroll_top: 0.0,
            scroll_width: 800.0,
            client_width: 800.0,
        });
        assert_eq!(edges, ShadowEdges::default());
    }

    #[test]
    fn grouped_variant_takes_top_from_the_table_signal() {
        let metrics = ScrollMetrics {
            scroll_left: 0.0,
            scroll_top: 120.0, // header's own scrollTop is ignored
            scroll_width: 800.0,
            client_width: 800.0,
        };
        let edges = ShadowEdges::derive_grouped(&metrics, 0.0);
        assert!(!edges.top);
        let edges = ShadowEdges::derive_grouped(&metrics, 35.0);
        assert!(edges.top);
    }

    #[test]
    fn sync_suppresses_unchanged_sets() {
        let mut sync = ShadowSync::default();
        let metrics = ScrollMetrics {
            scroll_left: 10.0,
            scroll_top: 0.0,
            scroll_width: 1200.0,
            client_width: 800.0,
        };
        let first = sync.update(ShadowEdges::derive(&metrics));
        assert!(first.is_some());
        let second = sync.update(ShadowEdges::derive(&metrics));
        assert!(second.is_none());
        assert_eq!(sync.current(), first.unwrap());
    }
}
