//! Scroll-related logic for `GridView`.
//!
//! The scroll handler is the hot path: windowing recomputation stays
//! synchronous and unthrottled because it is O(1) index arithmetic plus
//! O(window) DOM writes. Shadow derivation and group scrollLeft mirroring
//! ride the same event; a settle timeout schedules one final render after
//! scrolling stops.

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::Event;

#[cfg(target_arch = "wasm32")]
use super::{now_ms, GridView, SharedState};
#[cfg(target_arch = "wasm32")]
use crate::layout::{ScrollMetrics, ShadowEdges};

/// Delay (ms) after scroll stops before triggering a settle render.
#[cfg(target_arch = "wasm32")]
const SCROLL_SETTLE_DELAY_MS: u32 = 100;

#[cfg(target_arch = "wasm32")]
impl GridView {
    pub(crate) fn attach_scroll_listener(state: &Rc<RefCell<SharedState>>) -> Result<(), JsValue> {
        let weak = Rc::downgrade(state);
        let closure = Closure::wrap(Box::new(move |event: Event| {
            if let Some(state) = weak.upgrade() {
                Self::handle_scroll(&state, &event);
            }
        }) as Box<dyn FnMut(Event)>);

        {
            let s = state.borrow();
            s.container
                .add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref())
                .map_err(|_| crate::error::GridError::Dom("scroll listener".to_string()))?;
        }
        state.borrow_mut().scroll_closure = Some(closure);
        Ok(())
    }

    fn handle_scroll(state: &Rc<RefCell<SharedState>>, event: &Event) {
        let Some(target) = event
            .target()
            .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        else {
            return;
        };
        let metrics = ScrollMetrics {
            scroll_left: target.scroll_left() as f32,
            scroll_top: target.scroll_top() as f32,
            scroll_width: target.scroll_width() as f32,
            client_width: target.client_width() as f32,
        };

        {
            let mut s = state.borrow_mut();
            s.scroll_top = metrics.scroll_top;
            s.scroll_left = metrics.scroll_left;
            s.last_scroll_ms = now_ms();

            // The grouped table's header scrolls in its own element, so its
            // top shadow follows the table-level scrollTop signal instead.
            let edges = if s.options.group_field.is_some() {
                ShadowEdges::derive_grouped(&metrics, metrics.scroll_top)
            } else {
                ShadowEdges::derive(&metrics)
            };
            let _ = s.shadow.update(edges);

            // Horizontal scroll is synchronized, not virtualized: mirror
            // scrollLeft across the shared header and every group body.
            #[allow(clippy::cast_possible_truncation)]
            let left = metrics.scroll_left as i32;
            if let Some(header) = &s.header_el {
                header.set_scroll_left(left);
            }
            for (_, body) in &s.group_bodies {
                body.set_scroll_left(left);
            }
        }

        Self::render_pass(state);
        Self::schedule_scroll_settle_timeout(state);
    }

    pub(crate) fn schedule_scroll_settle_timeout(state: &Rc<RefCell<SharedState>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut s = state.borrow_mut();
        // Cancel any existing timer
        if let Some(timer_id) = s.scroll_settle_timer.take() {
            window.clear_timeout_with_handle(timer_id);
        }
        if s.scroll_settle_closure.is_none() {
            let weak = Rc::downgrade(state);
            let closure = Closure::wrap(Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    GridView::handle_scroll_settle(&state);
                }
            }) as Box<dyn FnMut()>);
            s.scroll_settle_closure = Some(closure);
        }
        let Some(callback) = s.scroll_settle_closure.as_ref() else {
            return;
        };
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            SCROLL_SETTLE_DELAY_MS as i32,
        ) {
            Ok(id) => s.scroll_settle_timer = Some(id),
            Err(_) => s.scroll_settle_timer = None,
        }
    }

    pub(crate) fn handle_scroll_settle(state: &Rc<RefCell<SharedState>>) {
        {
            let mut s = state.borrow_mut();
            s.scroll_settle_timer = None;
            // Check if scroll is still ongoing
            let elapsed = now_ms() - s.last_scroll_ms;
            if elapsed < f64::from(SCROLL_SETTLE_DELAY_MS) {
                drop(s);
                Self::schedule_scroll_settle_timeout(state);
                return;
            }
        }
        Self::render_pass(state);
    }
}
