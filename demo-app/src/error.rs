//! Errors surfaced to JavaScript callers.

use thiserror::Error;
use wasm_bindgen::prelude::*;

/// Result type for host operations.
pub type AppResult<T> = Result<T, AppError>;

/// Failures while wiring demos into the page.
#[derive(Debug, Error)]
pub enum AppError {
    /// Not running in a window context.
    #[error("No window object")]
    NoWindow,

    /// The window has no document.
    #[error("No document object")]
    NoDocument,

    /// `bindAllWithConfig` received malformed JSON.
    #[error("Invalid binder config: {0}")]
    Config(#[from] serde_json::Error),

    /// A DOM call threw.
    #[error("DOM error: {0}")]
    Dom(String),
}

impl AppError {
    /// Wrap a value thrown by a DOM call.
    #[must_use]
    pub fn dom(thrown: &JsValue) -> Self {
        Self::Dom(describe(thrown))
    }
}

impl From<AppError> for JsValue {
    fn from(err: AppError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[wasm_bindgen(inline_js = "export function describe(value) { return String(value); }")]
extern "C" {
    /// `String(value)`, the way the page would print a thrown value.
    pub fn describe(value: &JsValue) -> String;
}
