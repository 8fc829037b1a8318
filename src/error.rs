//! Structured error types for gridview.
//!
//! The layout core itself has no failure modes — bad inputs degrade to
//! documented fallbacks. These errors cover the viewer shell: DOM wiring
//! and configuration decoding.

/// All errors that can occur while wiring and driving a grid view.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// DOM element lookup or manipulation failure.
    #[error("DOM error: {0}")]
    Dom(String),

    /// Invalid or missing grid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON (de)serialization error for row records or options.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rendering error.
    #[error("Render error: {0}")]
    Render(String),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl From<String> for GridError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
