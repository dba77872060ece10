//! # Demo App
//!
//! Browser host for lazily booted canvas demos. Canvases declare a module with
//! `data-module`; nothing is fetched until the visitor clicks or presses Enter
//! or Space on one.
//!
//! ## Usage
//!
//! Build for WASM:
//! ```bash
//! wasm-pack build --target web demo-app
//! ```
//!
//! Then bind the page:
//! ```javascript
//! import init, { bindDocument } from './pkg/demo_app.js';
//!
//! await init();
//! bindDocument();
//! ```
//!
//! ```html
//! <canvas data-module="/demos/plasma/plasma.js"
//!         data-poster="/demos/plasma/poster.png"
//!         width="640" height="360"></canvas>
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod dom;
pub mod error;
pub mod listeners;
pub mod module;

pub use dom::WebCanvas;
pub use error::{AppError, AppResult};
pub use listeners::{route_entries, WebBinding};
pub use module::{module_options, raised_from, JsModuleFactory, JsModuleHandle};

use demo_core::{BinderConfig, Dependencies};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;

/// Selector for canvases that declare a demo module.
pub const DEMO_SELECTOR: &str = "canvas[data-module]";

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init_wasm() {
    console_error_panic_hook::set_once();
    tracing::info!("Demo app WASM initialized (demo-core {})", demo_core::VERSION);
}

/// Bind every canvas in `elements` that declares a module.
///
/// Non-canvas values are ignored. Returns the number of bindings created.
///
/// # Errors
///
/// Returns an error string if there is no window or a listener cannot be
/// attached.
#[wasm_bindgen(js_name = bindAll)]
pub fn bind_all(elements: &js_sys::Array) -> Result<u32, JsValue> {
    Ok(bind_elements(elements.iter(), BinderConfig::default())?)
}

/// Like `bindAll`, with a JSON binder configuration. Missing fields keep their
/// defaults.
///
/// # Errors
///
/// Returns an error string if the configuration is malformed, there is no
/// window, or a listener cannot be attached.
#[wasm_bindgen(js_name = bindAllWithConfig)]
pub fn bind_all_with_config(elements: &js_sys::Array, config: &str) -> Result<u32, JsValue> {
    let config = BinderConfig::from_json(config).map_err(AppError::from)?;
    Ok(bind_elements(elements.iter(), config)?)
}

/// Bind every `canvas[data-module]` in the document.
///
/// # Errors
///
/// Returns an error string if there is no window or document, or a listener
/// cannot be attached.
#[wasm_bindgen(js_name = bindDocument)]
pub fn bind_document() -> Result<u32, JsValue> {
    let document = web_sys::window()
        .ok_or(AppError::NoWindow)?
        .document()
        .ok_or(AppError::NoDocument)?;
    let nodes = document
        .query_selector_all(DEMO_SELECTOR)
        .map_err(|err| AppError::dom(&err))?;
    let elements = (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .map(JsValue::from);
    Ok(bind_elements(elements, BinderConfig::default())?)
}

/// Bind canvases from `elements` with `config` and wire their listeners.
///
/// # Errors
///
/// Returns [`AppError::NoWindow`] outside a window, or [`AppError::Dom`] if a
/// listener or observer cannot be attached.
pub fn bind_elements<I>(elements: I, config: BinderConfig) -> AppResult<u32>
where
    I: IntoIterator<Item = JsValue>,
{
    let window = web_sys::window().ok_or(AppError::NoWindow)?;
    let canvases = elements
        .into_iter()
        .filter_map(|value| value.dyn_into::<HtmlCanvasElement>().ok())
        .map(|element| WebCanvas::new(element, window.clone()));

    let deps = Dependencies::new(JsModuleFactory::new()).with_config(config);
    let bindings = demo_core::bind_all(canvases, &deps);
    for binding in &bindings {
        listeners::attach(binding)?;
    }
    Ok(u32::try_from(bindings.len()).unwrap_or(u32::MAX))
}
