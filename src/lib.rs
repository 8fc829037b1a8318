//! gridview - virtualized data table for the web
//!
//! Renders large tabular datasets in the browser via WebAssembly and DOM:
//! - Windowed row rendering — DOM cost tracks visible rows, not total rows
//! - Nested multi-level headers with sticky left/right columns
//! - Drag-to-resize columns with hierarchical delta distribution
//! - Collapsible row groups with independent off-screen culling
//! - Thousands of rows inside a fixed viewport
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { GridView } from 'gridview';
//! await init();
//! const grid = new GridView(container, {
//!     columns, rowHeight: 40, scroll: { y: 400 },
//! });
//! grid.load_rows(rows);
//! ```

// Layout core (platform-independent, natively testable)
pub mod error;
pub mod layout;
pub mod types;

// Viewer shell (DOM wiring gated on wasm32)
pub mod viewer;

use wasm_bindgen::prelude::*;

// Re-export the main viewer struct
pub use viewer::GridView;

pub use types::*;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
