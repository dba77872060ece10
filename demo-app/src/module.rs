//! Emscripten-style ES modules as demo modules.
//!
//! A demo script's default export is a factory that takes a configuration
//! object and returns the module (or a promise of it). Exports are looked up on
//! the resulting object with `Reflect`.

use std::rc::Rc;

use async_trait::async_trait;
use demo_core::{
    DemoError, DemoResult, EntryPoint, ExportTable, ModuleConfig, ModuleFactory, ModuleHandle,
    Raised, RawExport, Signature, TableShape,
};
use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::dom::WebCanvas;
use crate::error::describe;

#[wasm_bindgen(inline_js = "export function import_module(url) { \
    return import(new URL(url, document.baseURI).href); }")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn import_module(url: &str) -> Result<Promise, JsValue>;
}

/// Read what a thrown value carries.
///
/// Plain strings keep their text. Error objects contribute `name` and
/// `message`; anything else is described the way `String(value)` would.
#[must_use]
pub fn raised_from(thrown: &JsValue) -> Raised {
    if let Some(text) = thrown.as_string() {
        return Raised::text(text);
    }
    let message = string_property(thrown, "message")
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| describe(thrown));
    match string_property(thrown, "name") {
        Some(name) => Raised::error(name, message),
        None => Raised::message(message),
    }
}

fn property(target: &JsValue, name: &str) -> Option<JsValue> {
    if !target.is_object() && !target.is_function() {
        return None;
    }
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

fn string_property(target: &JsValue, name: &str) -> Option<String> {
    property(target, name).and_then(|value| value.as_string())
}

fn function_property(target: &JsValue, name: &str) -> Option<Function> {
    property(target, name).and_then(|value| value.dyn_into().ok())
}

fn numeric_export(function: Function) -> RawExport {
    Rc::new(move |args: &[f64]| {
        let args: Array = args.iter().map(|arg| JsValue::from_f64(*arg)).collect();
        function
            .apply(&JsValue::UNDEFINED, &args)
            .map(drop)
            .map_err(|thrown| raised_from(&thrown))
    })
}

/// An export table hung somewhere on a module object.
struct JsExportTable(JsValue);

impl ExportTable for JsExportTable {
    fn function(&self, name: &str) -> Option<RawExport> {
        function_property(&self.0, name).map(numeric_export)
    }
}

/// A module object returned by a demo factory.
#[derive(Debug, Clone)]
pub struct JsModuleHandle {
    module: JsValue,
}

impl JsModuleHandle {
    /// Wrap a module object.
    #[must_use]
    pub fn new(module: JsValue) -> Self {
        Self { module }
    }

    /// The module object.
    #[must_use]
    pub fn as_js(&self) -> &JsValue {
        &self.module
    }
}

impl ExportTable for JsModuleHandle {
    fn function(&self, name: &str) -> Option<RawExport> {
        function_property(&self.module, name).map(numeric_export)
    }
}

impl ModuleHandle for JsModuleHandle {
    fn export_table(&self, shape: TableShape) -> Option<Box<dyn ExportTable>> {
        let table = match shape {
            TableShape::InstanceExports => {
                property(&self.module, "instance").and_then(|i| property(&i, "exports"))
            }
            TableShape::Asm => property(&self.module, "asm"),
            TableShape::Exports => property(&self.module, "exports"),
        }?;
        Some(Box::new(JsExportTable(table)))
    }

    fn can_wrap(&self) -> bool {
        function_property(&self.module, "cwrap").is_some()
    }

    fn wrap(&self, name: &str, signature: &Signature) -> Result<RawExport, Raised> {
        let cwrap = function_property(&self.module, "cwrap")
            .ok_or_else(|| Raised::message("Module has no cwrap"))?;
        let returns = signature.returns.map_or(JsValue::NULL, JsValue::from_str);
        let params: Array = signature
            .params
            .iter()
            .map(|param| JsValue::from_str(param))
            .collect();
        let wrapped = cwrap
            .call3(&self.module, &JsValue::from_str(name), &returns, &params)
            .map_err(|thrown| raised_from(&thrown))?
            .dyn_into::<Function>()
            .map_err(|_| Raised::message(format!("cwrap returned no function for {name}")))?;
        Ok(numeric_export(wrapped))
    }

    fn entry_point(&self) -> Option<EntryPoint> {
        if function_property(&self.module, "callMain").is_some() {
            Some(EntryPoint::CallMain)
        } else if function_property(&self.module, "_main").is_some() {
            Some(EntryPoint::Main)
        } else {
            None
        }
    }

    fn run_entry(&self, entry: EntryPoint) -> Result<(), Raised> {
        let (name, args) = match entry {
            EntryPoint::CallMain => ("callMain", Array::of1(&Array::new())),
            EntryPoint::Main => ("_main", Array::new()),
        };
        let routine = function_property(&self.module, name)
            .ok_or_else(|| Raised::message(format!("Module has no {name}")))?;
        routine
            .apply(&self.module, &args)
            .map(drop)
            .map_err(|thrown| raised_from(&thrown))
    }
}

/// Loads demo scripts with dynamic `import()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsModuleFactory;

impl JsModuleFactory {
    /// Create a factory.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    async fn import(location: &str) -> DemoResult<Function> {
        let import_error = |thrown: JsValue| DemoError::Import(raised_from(&thrown).message);
        let promise = import_module(location).map_err(import_error)?;
        let namespace = JsFuture::from(promise).await.map_err(import_error)?;
        function_property(&namespace, "default")
            .ok_or_else(|| DemoError::Import(format!("{location} has no default export")))
    }
}

/// The configuration object handed to a demo factory.
///
/// # Errors
///
/// Returns the thrown value if a property cannot be set.
pub fn module_options(canvas: &WebCanvas, config: &ModuleConfig) -> Result<Object, JsValue> {
    let options = Object::new();
    let set = |key: &str, value: &JsValue| Reflect::set(&options, &JsValue::from_str(key), value);

    set("canvas", canvas.element())?;
    set("__canvasSelector", &JsValue::from_str(&config.selector))?;
    set("__canvasId", &JsValue::from_str(&config.canvas_id))?;

    let assets = config.clone();
    let locate_file = Closure::<dyn Fn(String) -> String>::new(move |path: String| {
        assets.locate_file(&path)
    });
    set("locateFile", &locate_file.into_js_value())?;

    let out = config.clone();
    let print = Closure::<dyn Fn(JsValue)>::new(move |message: JsValue| {
        web_sys::console::log_1(&JsValue::from_str(&out.output_line(&describe(&message))));
    });
    set("print", &print.into_js_value())?;

    let err = config.clone();
    let print_err = Closure::<dyn Fn(JsValue)>::new(move |message: JsValue| {
        web_sys::console::error_1(&JsValue::from_str(&err.output_line(&describe(&message))));
    });
    set("printErr", &print_err.into_js_value())?;

    Ok(options)
}

#[async_trait(?Send)]
impl ModuleFactory<WebCanvas> for JsModuleFactory {
    type Handle = JsModuleHandle;

    async fn instantiate(
        &self,
        canvas: &WebCanvas,
        config: &ModuleConfig,
    ) -> DemoResult<JsModuleHandle> {
        let factory = Self::import(&config.location).await?;
        let instantiate_error = |thrown: JsValue| DemoError::Instantiate(raised_from(&thrown).message);

        let options = module_options(canvas, config)
            .map_err(|thrown| DemoError::Host(describe(&thrown)))?;
        let created = factory
            .call1(&JsValue::UNDEFINED, &options)
            .map_err(instantiate_error)?;
        let module = JsFuture::from(Promise::resolve(&created))
            .await
            .map_err(instantiate_error)?;

        tracing::debug!(module = %config.location, "Demo factory resolved");
        Ok(JsModuleHandle::new(module))
    }
}
