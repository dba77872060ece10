//! Test doubles for binding integration tests.
//!
//! `FakeCanvas` records every DOM-side effect the binder asks for, and
//! `FakeFactory` hands out scripted module handles whose exports log into a
//! shared `ModuleLog`.

#![allow(dead_code)]

use std::cell::{Cell, Ref, RefCell};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;
use demo_core::{
    DemoCanvas, DemoError, DemoResult, EntryPoint, ExportTable, ModuleConfig, ModuleFactory,
    ModuleHandle, Raised, RawExport, ScreenRect, Signature, TableShape, Viewport,
};

/// Everything the binder did to a canvas.
#[derive(Debug, Default)]
pub struct CanvasState {
    pub attrs: HashMap<String, String>,
    pub id: String,
    pub tab_index: Option<i32>,
    pub width: u32,
    pub height: u32,
    pub rect: ScreenRect,
    pub viewport: Viewport,
    pub observes: bool,
    pub poster: Option<String>,
    pub classes: BTreeSet<String>,
    pub warnings: Vec<(String, String)>,
    pub focus_count: usize,
}

/// In-memory canvas. Clones share state.
#[derive(Debug, Clone)]
pub struct FakeCanvas(Rc<RefCell<CanvasState>>);

impl FakeCanvas {
    /// A 300x150 canvas rendered at 600x300 in the top-left of a 1024x768
    /// viewport, with intersection observation available.
    pub fn new(attrs: &[(&str, &str)]) -> Self {
        let attrs: HashMap<String, String> = attrs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let id = attrs.get("id").cloned().unwrap_or_default();
        Self(Rc::new(RefCell::new(CanvasState {
            attrs,
            id,
            width: 300,
            height: 150,
            rect: ScreenRect::new(0.0, 0.0, 600.0, 300.0),
            viewport: Viewport::new(1024.0, 768.0),
            observes: true,
            ..CanvasState::default()
        })))
    }

    /// A canvas declaring `module`.
    pub fn with_module(module: &str) -> Self {
        Self::new(&[("data-module", module)])
    }

    pub fn at(self, rect: ScreenRect) -> Self {
        self.0.borrow_mut().rect = rect;
        self
    }

    pub fn without_observer(self) -> Self {
        self.0.borrow_mut().observes = false;
        self
    }

    pub fn state(&self) -> Ref<'_, CanvasState> {
        self.0.borrow()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.state().classes.contains(class)
    }
}

impl DemoCanvas for FakeCanvas {
    fn attribute(&self, name: &str) -> Option<String> {
        self.state().attrs.get(name).cloned()
    }

    fn id(&self) -> String {
        self.state().id.clone()
    }

    fn set_id(&self, id: &str) {
        let mut state = self.0.borrow_mut();
        state.id = id.to_string();
        state.attrs.insert("id".to_string(), id.to_string());
    }

    fn set_tab_index(&self, index: i32) {
        let mut state = self.0.borrow_mut();
        state.tab_index = Some(index);
        state.attrs.insert("tabindex".to_string(), index.to_string());
    }

    fn backing_size(&self) -> (u32, u32) {
        let state = self.state();
        (state.width, state.height)
    }

    fn set_backing_width(&self, width: u32) {
        self.0.borrow_mut().width = width;
    }

    fn set_backing_height(&self, height: u32) {
        self.0.borrow_mut().height = height;
    }

    fn bounding_rect(&self) -> ScreenRect {
        self.state().rect
    }

    fn viewport(&self) -> Viewport {
        self.state().viewport
    }

    fn observes_intersection(&self) -> bool {
        self.state().observes
    }

    fn show_poster(&self, url: &str, class: &str) {
        let mut state = self.0.borrow_mut();
        state.poster = Some(url.to_string());
        state.classes.insert(class.to_string());
    }

    fn hide_poster(&self, class: &str) {
        let mut state = self.0.borrow_mut();
        state.poster = None;
        state.classes.remove(class);
    }

    fn set_class(&self, class: &str, on: bool) {
        let mut state = self.0.borrow_mut();
        if on {
            state.classes.insert(class.to_string());
        } else {
            state.classes.remove(class);
        }
    }

    fn insert_warning(&self, class: &str, text: &str) {
        self.0
            .borrow_mut()
            .warnings
            .push((class.to_string(), text.to_string()));
    }

    fn focus(&self) {
        self.0.borrow_mut().focus_count += 1;
    }
}

/// Calls a module received through its exports.
#[derive(Debug, Default)]
pub struct ModuleLog {
    pub set_active: Vec<i32>,
    pub update_mouse: Vec<(f64, f64, i32)>,
}

pub type SharedLog = Rc<RefCell<ModuleLog>>;

/// What the next instantiation does.
#[derive(Debug, Clone)]
pub enum Script {
    /// Exports both capabilities, entry returns normally.
    Ready,
    /// Exports both capabilities, entry raises `raised`.
    Entry(Raised),
    /// Factory fails with this message.
    Fail(String),
    /// Instantiates but exports nothing.
    Bare,
}

/// Scripted module factory.
pub struct FakeFactory {
    scripts: RefCell<VecDeque<Script>>,
    instantiations: Cell<usize>,
    configs: RefCell<Vec<ModuleConfig>>,
    log: SharedLog,
}

impl FakeFactory {
    /// Every instantiation succeeds with both exports.
    pub fn ready() -> Self {
        Self::scripted(Vec::new())
    }

    /// Instantiations follow `scripts` in order, then fall back to `Ready`.
    pub fn scripted(scripts: Vec<Script>) -> Self {
        Self {
            scripts: RefCell::new(scripts.into()),
            instantiations: Cell::new(0),
            configs: RefCell::new(Vec::new()),
            log: SharedLog::default(),
        }
    }

    pub fn instantiations(&self) -> usize {
        self.instantiations.get()
    }

    pub fn configs(&self) -> Vec<ModuleConfig> {
        self.configs.borrow().clone()
    }

    pub fn log(&self) -> Ref<'_, ModuleLog> {
        self.log.borrow()
    }

    pub fn clear_log(&self) {
        let mut log = self.log.borrow_mut();
        log.set_active.clear();
        log.update_mouse.clear();
    }
}

#[async_trait(?Send)]
impl ModuleFactory<FakeCanvas> for FakeFactory {
    type Handle = FakeHandle;

    async fn instantiate(
        &self,
        _canvas: &FakeCanvas,
        config: &ModuleConfig,
    ) -> DemoResult<FakeHandle> {
        self.instantiations.set(self.instantiations.get() + 1);
        self.configs.borrow_mut().push(config.clone());
        let script = self
            .scripts
            .borrow_mut()
            .pop_front()
            .unwrap_or(Script::Ready);

        // Give concurrent callers a chance to pile onto the in-flight load.
        tokio::task::yield_now().await;

        match script {
            Script::Ready => Ok(FakeHandle::new(Rc::clone(&self.log), true, Ok(()))),
            Script::Entry(raised) => Ok(FakeHandle::new(Rc::clone(&self.log), true, Err(raised))),
            Script::Fail(message) => Err(DemoError::Instantiate(message)),
            Script::Bare => Ok(FakeHandle::new(Rc::clone(&self.log), false, Ok(()))),
        }
    }
}

/// Module handle exporting `_set_active` and `_update_mouse` directly.
pub struct FakeHandle {
    log: SharedLog,
    exports: bool,
    entry: Result<(), Raised>,
}

impl FakeHandle {
    fn new(log: SharedLog, exports: bool, entry: Result<(), Raised>) -> Self {
        Self {
            log,
            exports,
            entry,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn flag(value: f64) -> i32 {
    value as i32
}

impl ExportTable for FakeHandle {
    fn function(&self, name: &str) -> Option<RawExport> {
        if !self.exports {
            return None;
        }
        let log = Rc::clone(&self.log);
        let export: RawExport = match name {
            "_set_active" => Rc::new(move |args: &[f64]| {
                log.borrow_mut().set_active.push(flag(args[0]));
                Ok(())
            }),
            "_update_mouse" => Rc::new(move |args: &[f64]| {
                log.borrow_mut()
                    .update_mouse
                    .push((args[0], args[1], flag(args[2])));
                Ok(())
            }),
            _ => return None,
        };
        Some(export)
    }
}

impl ModuleHandle for FakeHandle {
    fn export_table(&self, _shape: TableShape) -> Option<Box<dyn ExportTable>> {
        None
    }

    fn can_wrap(&self) -> bool {
        false
    }

    fn wrap(&self, name: &str, _signature: &Signature) -> Result<RawExport, Raised> {
        Err(Raised::message(format!("cannot wrap {name}")))
    }

    fn entry_point(&self) -> Option<EntryPoint> {
        Some(EntryPoint::CallMain)
    }

    fn run_entry(&self, _entry: EntryPoint) -> Result<(), Raised> {
        self.entry.clone()
    }
}
