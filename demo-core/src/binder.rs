//! # Demo binding
//!
//! One [`DemoBinding`] per canvas that declares a module. Bindings are created
//! eagerly by [`bind_all`]; the module itself is only loaded when the user
//! first starts the demo.
//!
//! ## Usage
//!
//! ```text
//! 1. bind_all(canvases, deps)      → bindings (canvases without a module are skipped)
//! 2. host wires listeners          → start / pointer_move / pointer_leave / visibility_changed
//! 3. first start                   → one shared load, exports resolved, activation applied
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{LocalBoxFuture, Shared};
use futures::FutureExt;

use crate::activation::{ActivationController, ActivationPhase};
use crate::config::{BinderConfig, DemoAttributes};
use crate::error::{DemoError, DemoResult};
use crate::exports::{ExportResolver, UpdateMouseFn};
use crate::loader::ModuleLoader;
use crate::module::ModuleFactory;
use crate::pointer::{PointerMapper, PointerSample, ScreenRect};
use crate::visibility::{Viewport, VisibilityWatcher};

/// The page element a demo renders into.
///
/// Methods take `&self`; hosts wrap reference-counted DOM handles.
pub trait DemoCanvas {
    /// Value of attribute `name`.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Whether attribute `name` is present.
    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Element id, empty when unset.
    fn id(&self) -> String;

    /// Set the element id.
    fn set_id(&self, id: &str);

    /// Make the element focusable at `index`.
    fn set_tab_index(&self, index: i32);

    /// Backing-store size in logical pixels.
    fn backing_size(&self) -> (u32, u32);

    /// Set the backing-store width.
    fn set_backing_width(&self, width: u32);

    /// Set the backing-store height.
    fn set_backing_height(&self, height: u32);

    /// Rendered position and size in the viewport.
    fn bounding_rect(&self) -> ScreenRect;

    /// Current viewport size.
    fn viewport(&self) -> Viewport;

    /// Whether the host can report viewport intersections for this element.
    fn observes_intersection(&self) -> bool;

    /// Show `url` as the poster and add `class`.
    fn show_poster(&self, url: &str, class: &str);

    /// Hide the poster and remove `class`.
    fn hide_poster(&self, class: &str);

    /// Add or remove a marker class.
    fn set_class(&self, class: &str, on: bool);

    /// Insert a warning paragraph with `class` right after the element.
    fn insert_warning(&self, class: &str, text: &str);

    /// Focus the element without scrolling.
    fn focus(&self);
}

/// Collaborators shared by every binding from one [`bind_all`] call.
pub struct Dependencies<F> {
    /// Module loader.
    pub loader: Rc<ModuleLoader<F>>,
    /// Export resolver.
    pub resolver: Rc<ExportResolver>,
    /// Binder configuration.
    pub config: Rc<BinderConfig>,
}

impl<F> Dependencies<F> {
    /// Dependencies over `factory` with the default resolver and config.
    #[must_use]
    pub fn new(factory: F) -> Self {
        Self {
            loader: Rc::new(ModuleLoader::new(factory)),
            resolver: Rc::new(ExportResolver::default()),
            config: Rc::new(BinderConfig::default()),
        }
    }

    /// Replace the export resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: ExportResolver) -> Self {
        self.resolver = Rc::new(resolver);
        self
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: BinderConfig) -> Self {
        self.config = Rc::new(config);
        self
    }
}

impl<F> Clone for Dependencies<F> {
    fn clone(&self) -> Self {
        Self {
            loader: Rc::clone(&self.loader),
            resolver: Rc::clone(&self.resolver),
            config: Rc::clone(&self.config),
        }
    }
}

/// Sequential element ids, scoped to one [`bind_all`] call.
#[derive(Debug, Clone)]
pub struct IdSequence {
    prefix: String,
    next: u64,
}

impl IdSequence {
    /// Start a sequence at 0.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// The next id.
    pub fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

type PendingLoad = Shared<LocalBoxFuture<'static, DemoResult<()>>>;

struct BindingState<H> {
    controller: ActivationController,
    update_mouse: Option<UpdateMouseFn>,
    module: Option<Rc<H>>,
    pending: Option<PendingLoad>,
}

/// Per-canvas demo state and behaviour.
pub struct DemoBinding<C, F>
where
    F: ModuleFactory<C>,
{
    canvas: C,
    id: String,
    attributes: DemoAttributes,
    watcher: VisibilityWatcher,
    deps: Dependencies<F>,
    state: RefCell<BindingState<F::Handle>>,
}

/// Create bindings for every element in `elements` that declares a module.
///
/// Elements without a module location are skipped and left untouched.
#[must_use]
pub fn bind_all<C, F, I>(elements: I, deps: &Dependencies<F>) -> Vec<Rc<DemoBinding<C, F>>>
where
    I: IntoIterator<Item = C>,
    C: DemoCanvas + 'static,
    F: ModuleFactory<C> + 'static,
{
    let mut ids = IdSequence::new(deps.config.id_prefix.clone());
    let bindings: Vec<_> = elements
        .into_iter()
        .filter_map(|canvas| DemoBinding::prepare(canvas, deps, &mut ids))
        .collect();
    tracing::info!(count = bindings.len(), "Bound demo canvases");
    bindings
}

impl<C, F> DemoBinding<C, F>
where
    C: DemoCanvas + 'static,
    F: ModuleFactory<C> + 'static,
{
    /// Prepare `canvas` for lazy activation.
    ///
    /// Applies declared sizing, assigns an id and tab index when missing and
    /// shows the poster. Returns `None`, touching nothing, when the canvas
    /// declares no module.
    #[must_use]
    pub fn prepare(canvas: C, deps: &Dependencies<F>, ids: &mut IdSequence) -> Option<Rc<Self>> {
        let attributes = DemoAttributes::read(|name| canvas.attribute(name))?;

        if let Some(width) = attributes.width {
            canvas.set_backing_width(width);
        }
        if let Some(height) = attributes.height {
            canvas.set_backing_height(height);
        }

        let mut id = canvas.id();
        if id.is_empty() {
            id = ids.next_id();
            canvas.set_id(&id);
        }
        if !canvas.has_attribute("tabindex") {
            canvas.set_tab_index(0);
        }

        let watcher = VisibilityWatcher::new(
            deps.config.visibility_threshold,
            canvas.observes_intersection(),
        );
        let visible = watcher.initial(&canvas.bounding_rect(), &canvas.viewport());

        tracing::debug!(canvas = %id, module = %attributes.module, visible, "Prepared demo canvas");

        let binding = Rc::new(Self {
            canvas,
            id,
            attributes,
            watcher,
            deps: deps.clone(),
            state: RefCell::new(BindingState {
                controller: ActivationController::new(visible),
                update_mouse: None,
                module: None,
                pending: None,
            }),
        });
        binding.show_poster();
        Some(binding)
    }

    /// The bound canvas.
    #[must_use]
    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    /// The canvas id, assigned if it had none.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Attributes read at bind time.
    #[must_use]
    pub fn attributes(&self) -> &DemoAttributes {
        &self.attributes
    }

    /// Binder configuration.
    #[must_use]
    pub fn config(&self) -> &BinderConfig {
        &self.deps.config
    }

    /// Whether visibility reports are expected for this canvas.
    #[must_use]
    pub fn observes_visibility(&self) -> bool {
        self.watcher.is_observing()
    }

    /// Current activation phase.
    #[must_use]
    pub fn phase(&self) -> ActivationPhase {
        self.state.borrow().controller.phase()
    }

    /// Whether the demo has been started.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.state.borrow().controller.is_started()
    }

    /// Whether the canvas is considered visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.state.borrow().controller.is_visible()
    }

    /// The loaded module handle.
    #[must_use]
    pub fn module(&self) -> Option<Rc<F::Handle>> {
        self.state.borrow().module.clone()
    }

    /// Whether `key` should start this demo. Only true before it starts.
    #[must_use]
    pub fn is_start_key(&self, key: &str) -> bool {
        !self.is_started() && self.deps.config.is_start_key(key)
    }

    /// Start the demo, loading its module on first use.
    ///
    /// Concurrent calls share one load. Once started, further calls return
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns the load error. The binding stays unstarted and a later call
    /// retries.
    pub async fn start(self: Rc<Self>) -> DemoResult<()> {
        let existing = {
            let state = self.state.borrow();
            if state.controller.is_started() {
                return Ok(());
            }
            state.pending.clone()
        };

        let pending = match existing {
            Some(pending) => pending,
            None => {
                self.hide_poster();
                self.canvas.set_class(&self.deps.config.activating_class, true);
                let load = Rc::clone(&self).activate().boxed_local().shared();
                let mut state = self.state.borrow_mut();
                state.controller.begin_activation();
                state.pending = Some(load.clone());
                load
            }
        };

        pending.await
    }

    async fn activate(self: Rc<Self>) -> DemoResult<()> {
        let result = self
            .deps
            .loader
            .load(&self.canvas, &self.attributes.module, &self.id)
            .await;
        self.canvas
            .set_class(&self.deps.config.activating_class, false);

        let handle = match result {
            Ok(handle) => handle,
            Err(err) => {
                self.fail(&err);
                return Err(err);
            }
        };

        let capabilities = self.deps.resolver.resolve(&handle);
        let transition = {
            let mut state = self.state.borrow_mut();
            state.pending = None;
            state.module = Some(Rc::new(handle));
            state.update_mouse = capabilities.update_mouse;
            state.controller.install(capabilities.set_active);
            state.controller.mark_started();
            state.controller.transition()
        };
        if let Some(transition) = transition {
            transition.dispatch();
        }

        let (width, height) = self.canvas.backing_size();
        self.send_pointer(PointerSample::resting(width, height));
        self.canvas.focus();
        Ok(())
    }

    fn fail(&self, err: &DemoError) {
        {
            let mut state = self.state.borrow_mut();
            state.pending = None;
            state.controller.abort_activation();
        }
        tracing::error!(module = %self.attributes.module, "Failed to launch demo: {err}");
        let config = &self.deps.config;
        self.canvas
            .insert_warning(&config.warning_class, &config.failure_text(&err.to_string()));
        self.show_poster();
    }

    /// Forward a pointer move at viewport position `(client_x, client_y)`.
    ///
    /// Dropped unless the demo is started and visible.
    pub fn pointer_move(&self, client_x: f64, client_y: f64) {
        {
            let state = self.state.borrow();
            if !state.controller.is_started() || !state.controller.is_visible() {
                return;
            }
            if state.update_mouse.is_none() {
                return;
            }
        }
        let (width, height) = self.canvas.backing_size();
        let rect = self.canvas.bounding_rect();
        if let Some(sample) = PointerMapper::map(client_x, client_y, &rect, width, height) {
            self.send_pointer(sample);
        }
    }

    /// The pointer left the canvas or the canvas lost focus.
    pub fn pointer_leave(&self) {
        if self.is_started() {
            self.send_pointer(PointerSample::absent());
        }
    }

    /// An intersection report arrived for this canvas.
    pub fn visibility_changed(&self, is_intersecting: bool, ratio: f64) {
        let visible = self.watcher.evaluate(is_intersecting, ratio);
        let transition = {
            let mut state = self.state.borrow_mut();
            if !state.controller.set_visible(visible) {
                return;
            }
            state.controller.transition()
        };
        if let Some(transition) = transition {
            transition.dispatch();
        }
    }

    fn send_pointer(&self, sample: PointerSample) {
        let update = self.state.borrow().update_mouse.clone();
        if let Some(update) = update {
            if let Err(err) = update(sample.x, sample.y, sample.presence_flag()) {
                tracing::warn!(canvas = %self.id, "update_mouse failed: {err}");
            }
        }
    }

    fn show_poster(&self) {
        if let Some(poster) = &self.attributes.poster {
            self.canvas.show_poster(poster, &self.deps.config.poster_class);
        }
    }

    fn hide_poster(&self) {
        if self.attributes.poster.is_some() {
            self.canvas.hide_poster(&self.deps.config.poster_class);
        }
    }
}
