//! Header drag-session control for column resizing.
//!
//! One process-wide controller owns a single pair of document-scoped
//! mousemove/mouseup listeners with an explicit start/end lifecycle, so
//! mounting multiple grid instances never accumulates listeners. Exactly one
//! drag session is latched at a time; pointer-up tears it down regardless of
//! which element received the release, so no per-session listener can
//! dangle even when the pointer leaves the header.

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::{Rc, Weak};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::MouseEvent;

#[cfg(target_arch = "wasm32")]
use super::{now_ms, GridView, MoveCoalescer, SharedState, DEBOUNCE_MS};
#[cfg(target_arch = "wasm32")]
use crate::layout::{distribute_resize, ColumnArena};

/// The latched drag session. At most one exists at a time.
#[cfg(target_arch = "wasm32")]
struct DragSession {
    state: Weak<RefCell<SharedState>>,
    column_id: String,
    last_x: f32,
    coalescer: MoveCoalescer,
    poll_timer: Option<i32>,
}

#[cfg(target_arch = "wasm32")]
thread_local! {
    static SESSION: RefCell<Option<DragSession>> = const { RefCell::new(None) };
    /// Document listeners and the poll callback, installed once and kept
    /// alive for the process lifetime.
    static CONTROLLER: RefCell<Option<ControllerClosures>> = const { RefCell::new(None) };
}

#[cfg(target_arch = "wasm32")]
struct ControllerClosures {
    #[allow(dead_code)] // kept to hold the document listeners alive
    move_closure: Closure<dyn FnMut(MouseEvent)>,
    #[allow(dead_code)]
    up_closure: Closure<dyn FnMut(MouseEvent)>,
    poll_closure: Closure<dyn FnMut()>,
}

/// Latch a new drag session for the grabbed column. Installs the document
/// listeners on first use.
#[cfg(target_arch = "wasm32")]
pub(crate) fn start_drag(state: &Rc<RefCell<SharedState>>, column_id: &str, client_x: f32) {
    ensure_controller();
    SESSION.with(|cell| {
        *cell.borrow_mut() = Some(DragSession {
            state: Rc::downgrade(state),
            column_id: column_id.to_string(),
            last_x: client_x,
            coalescer: MoveCoalescer::default(),
            poll_timer: None,
        });
    });
}

#[cfg(target_arch = "wasm32")]
fn ensure_controller() {
    CONTROLLER.with(|cell| {
        let mut controller = cell.borrow_mut();
        if controller.is_some() {
            return;
        }
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let move_closure = Closure::wrap(Box::new(on_pointer_move) as Box<dyn FnMut(MouseEvent)>);
        let up_closure =
            Closure::wrap(Box::new(|_: MouseEvent| end_drag()) as Box<dyn FnMut(MouseEvent)>);
        let poll_closure = Closure::wrap(Box::new(on_poll) as Box<dyn FnMut()>);

        let _ = document.add_event_listener_with_callback(
            "mousemove",
            move_closure.as_ref().unchecked_ref(),
        );
        let _ = document
            .add_event_listener_with_callback("mouseup", up_closure.as_ref().unchecked_ref());

        *controller = Some(ControllerClosures {
            move_closure,
            up_closure,
            poll_closure,
        });
    });
}

/// Document-level pointer move. A move with no latched session is a no-op.
#[cfg(target_arch = "wasm32")]
fn on_pointer_move(event: MouseEvent) {
    let pushed = SESSION.with(|cell| {
        let mut session = cell.borrow_mut();
        let Some(session) = session.as_mut() else {
            return false;
        };
        event.prevent_default();
        event.stop_propagation();

        let x = event.client_x() as f32;
        let dx = x - session.last_x;
        session.last_x = x;
        session.coalescer.push(now_ms(), dx);
        session.poll_timer.is_none()
    });
    if pushed {
        schedule_poll();
    }
}

#[cfg(target_arch = "wasm32")]
#[allow(clippy::cast_possible_truncation)]
fn schedule_poll() {
    let Some(window) = web_sys::window() else {
        return;
    };
    CONTROLLER.with(|cell| {
        let controller = cell.borrow();
        let Some(controller) = controller.as_ref() else {
            return;
        };
        let timer = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                controller.poll_closure.as_ref().unchecked_ref(),
                DEBOUNCE_MS as i32,
            )
            .ok();
        SESSION.with(|cell| {
            if let Some(session) = cell.borrow_mut().as_mut() {
                session.poll_timer = timer;
            }
        });
    });
}

/// Poll the coalescer; commit a settled batch or wait out the throttle.
#[cfg(target_arch = "wasm32")]
fn on_poll() {
    let outcome = SESSION.with(|cell| {
        let mut session = cell.borrow_mut();
        let Some(session) = session.as_mut() else {
            return None;
        };
        session.poll_timer = None;
        match session.coalescer.poll(now_ms()) {
            Some(delta) => Some(Some((
                session.state.clone(),
                session.column_id.clone(),
                delta,
            ))),
            None if !session.coalescer.is_idle() => Some(None), // throttled; keep polling
            None => None,
        }
    });
    match outcome {
        Some(Some((state, column_id, delta))) => commit_delta(&state, &column_id, delta),
        Some(None) => schedule_poll(),
        None => {}
    }
}

/// Tear down the latched session. Called from the document-scope mouseup
/// regardless of target; also safe to call with no active session.
#[cfg(target_arch = "wasm32")]
pub(crate) fn end_drag() {
    let session = SESSION.with(|cell| cell.borrow_mut().take());
    let Some(mut session) = session else {
        return;
    };
    if let (Some(timer), Some(window)) = (session.poll_timer.take(), web_sys::window()) {
        window.clear_timeout_with_handle(timer);
    }
    if let Some(delta) = session.coalescer.flush(now_ms()) {
        commit_delta(&session.state, &session.column_id, delta);
    }
}

/// Distribute a committed delta into the offset map and re-render. A stale
/// column id distributes to an empty delta set and merges a no-op.
#[cfg(target_arch = "wasm32")]
fn commit_delta(state: &Weak<RefCell<SharedState>>, column_id: &str, delta: f32) {
    let Some(state) = state.upgrade() else {
        return;
    };
    if delta.abs() > f32::EPSILON {
        let mut s = state.borrow_mut();
        let arena = ColumnArena::build(&s.options.layout_columns());
        let deltas = distribute_resize(&arena, column_id, delta);
        s.offsets.merge(&deltas);
    }
    GridView::render_pass(&state);
}
