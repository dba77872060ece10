//! Event and intersection wiring for one binding.
//!
//! Listener closures are handed to the page and live as long as it does.

use std::rc::Rc;

use demo_core::DemoBinding;
use js_sys::Array;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, Event, EventTarget, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent, MouseEvent,
};

use crate::dom::WebCanvas;
use crate::error::{AppError, AppResult};
use crate::module::JsModuleFactory;

/// A binding as wired into the page.
pub type WebBinding = Rc<DemoBinding<WebCanvas, JsModuleFactory>>;

/// Attach input listeners and, when available, an intersection observer.
///
/// # Errors
///
/// Returns [`AppError::Dom`] if the browser rejects a listener or observer.
pub fn attach(binding: &WebBinding) -> AppResult<()> {
    let target: &EventTarget = binding.canvas().element().as_ref();

    let b = Rc::clone(binding);
    listen(target, "pointerdown", false, move |_event: Event| launch(&b))?;

    let b = Rc::clone(binding);
    listen(target, "keydown", false, move |event: Event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
            return;
        };
        if b.is_start_key(&key) {
            event.prevent_default();
            launch(&b);
        }
    })?;

    let b = Rc::clone(binding);
    listen(target, "pointermove", true, move |event: Event| {
        if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
            b.pointer_move(f64::from(mouse.client_x()), f64::from(mouse.client_y()));
        }
    })?;

    let b = Rc::clone(binding);
    listen(target, "pointerleave", true, move |_event: Event| b.pointer_leave())?;

    let b = Rc::clone(binding);
    listen(target, "blur", false, move |_event: Event| b.pointer_leave())?;

    if binding.observes_visibility() {
        observe(binding)?;
    }
    Ok(())
}

fn launch(binding: &WebBinding) {
    let binding = Rc::clone(binding);
    wasm_bindgen_futures::spawn_local(async move {
        let id = binding.id().to_string();
        if let Err(err) = binding.start().await {
            tracing::debug!(canvas = %id, "Start did not complete: {err}");
        }
    });
}

fn listen<F>(target: &EventTarget, kind: &str, passive: bool, handler: F) -> AppResult<()>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    let callback = closure.as_ref().unchecked_ref();
    let added = if passive {
        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind, callback, &options,
        )
    } else {
        target.add_event_listener_with_callback(kind, callback)
    };
    added.map_err(|err| AppError::dom(&err))?;
    closure.forget();
    Ok(())
}

/// Feed intersection entries to `binding`. Entries for other targets are
/// skipped.
pub fn route_entries(binding: &WebBinding, entries: &Array) {
    let canvas: &web_sys::Element = binding.canvas().element().as_ref();
    for entry in entries.iter() {
        let entry: IntersectionObserverEntry = entry.unchecked_into();
        if entry.target() != *canvas {
            continue;
        }
        binding.visibility_changed(entry.is_intersecting(), entry.intersection_ratio());
    }
}

fn observe(binding: &WebBinding) -> AppResult<()> {
    let b = Rc::clone(binding);
    let callback =
        Closure::<dyn FnMut(Array)>::new(move |entries: Array| route_entries(&b, &entries));

    let thresholds: Array = binding
        .config()
        .observer_thresholds
        .iter()
        .map(|t| JsValue::from_f64(*t))
        .collect();
    let init = IntersectionObserverInit::new();
    init.set_threshold(&thresholds);

    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
            .map_err(|err| AppError::dom(&err))?;
    observer.observe(binding.canvas().element());
    callback.forget();

    tracing::debug!(canvas = %binding.id(), "Observing demo visibility");
    Ok(())
}
