//! `DemoCanvas` over a real `<canvas>` element.

use demo_core::{DemoCanvas, ScreenRect, Viewport};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, Window};

use crate::error::describe;

/// A canvas element in the page.
#[derive(Debug, Clone)]
pub struct WebCanvas {
    element: HtmlCanvasElement,
    window: Window,
}

impl WebCanvas {
    /// Wrap `element`, measuring the viewport of `window`.
    #[must_use]
    pub fn new(element: HtmlCanvasElement, window: Window) -> Self {
        Self { element, window }
    }

    /// The wrapped element.
    #[must_use]
    pub fn element(&self) -> &HtmlCanvasElement {
        &self.element
    }

    fn style(&self, property: &str, value: &str) {
        if let Err(err) = self.element.style().set_property(property, value) {
            tracing::warn!("Failed to set {property}: {}", describe(&err));
        }
    }
}

/// A positive viewport dimension, if the host reported one.
fn dimension(value: Result<JsValue, JsValue>) -> Option<f64> {
    value.ok().and_then(|v| v.as_f64()).filter(|v| *v > 0.0)
}

impl DemoCanvas for WebCanvas {
    fn attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(name)
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.element.has_attribute(name)
    }

    fn id(&self) -> String {
        self.element.id()
    }

    fn set_id(&self, id: &str) {
        self.element.set_id(id);
    }

    fn set_tab_index(&self, index: i32) {
        self.element.set_tab_index(index);
    }

    fn backing_size(&self) -> (u32, u32) {
        (self.element.width(), self.element.height())
    }

    fn set_backing_width(&self, width: u32) {
        self.element.set_width(width);
    }

    fn set_backing_height(&self, height: u32) {
        self.element.set_height(height);
    }

    fn bounding_rect(&self) -> ScreenRect {
        let rect = self.element.get_bounding_client_rect();
        ScreenRect::new(rect.left(), rect.top(), rect.width(), rect.height())
    }

    fn viewport(&self) -> Viewport {
        let root = self
            .window
            .document()
            .and_then(|document| document.document_element());
        let fallback = |client: fn(&web_sys::Element) -> i32| {
            root.as_ref().map_or(0.0, |el| f64::from(client(el)))
        };
        Viewport::new(
            dimension(self.window.inner_width())
                .unwrap_or_else(|| fallback(web_sys::Element::client_width)),
            dimension(self.window.inner_height())
                .unwrap_or_else(|| fallback(web_sys::Element::client_height)),
        )
    }

    fn observes_intersection(&self) -> bool {
        js_sys::Reflect::has(&self.window, &JsValue::from_str("IntersectionObserver"))
            .unwrap_or(false)
    }

    fn show_poster(&self, url: &str, class: &str) {
        self.style("background-image", &format!("url({url})"));
        self.style("background-size", "cover");
        self.style("background-position", "center");
        self.style("background-repeat", "no-repeat");
        self.set_class(class, true);
    }

    fn hide_poster(&self, class: &str) {
        self.style("background-image", "none");
        self.set_class(class, false);
    }

    fn set_class(&self, class: &str, on: bool) {
        let classes = self.element.class_list();
        let result = if on {
            classes.add_1(class)
        } else {
            classes.remove_1(class)
        };
        if let Err(err) = result {
            tracing::warn!("Failed to toggle class {class}: {}", describe(&err));
        }
    }

    fn insert_warning(&self, class: &str, text: &str) {
        let Some(document) = self.element.owner_document() else {
            tracing::warn!("Canvas is detached, dropping warning: {text}");
            return;
        };
        let inserted = document.create_element("p").and_then(|paragraph| {
            paragraph.set_class_name(class);
            paragraph.set_text_content(Some(text));
            self.element.after_with_node_1(&paragraph)
        });
        if let Err(err) = inserted {
            tracing::warn!("Failed to insert warning: {}", describe(&err));
        }
    }

    fn focus(&self) {
        let options = js_sys::Object::new();
        let focused = js_sys::Reflect::set(
            &options,
            &JsValue::from_str("preventScroll"),
            &JsValue::TRUE,
        )
        .and_then(|_| js_sys::Reflect::get(&self.element, &JsValue::from_str("focus")))
        .and_then(|focus| focus.dyn_into::<js_sys::Function>())
        .and_then(|focus| focus.call1(&self.element, &options));
        if let Err(err) = focused {
            tracing::debug!("Focus failed: {}", describe(&err));
        }
    }
}
