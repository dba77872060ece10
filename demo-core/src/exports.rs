//! Export resolution.
//!
//! Built modules hang their exports in different places depending on how they
//! were compiled. The resolver searches those places once and hands back typed
//! callables for the two capabilities the binder drives.

use std::fmt;
use std::rc::Rc;

use crate::error::Raised;
use crate::module::{
    ExportTable, ModuleHandle, RawExport, Signature, TableShape, SET_ACTIVE_SIGNATURE,
    UPDATE_MOUSE_SIGNATURE,
};

/// `set_active(active)` with `active` 1 or 0.
pub type SetActiveFn = Rc<dyn Fn(i32) -> Result<(), Raised>>;

/// `update_mouse(x, y, present)` in logical canvas coordinates.
pub type UpdateMouseFn = Rc<dyn Fn(f64, f64, i32) -> Result<(), Raised>>;

/// Capabilities resolved from a module handle. Either may be missing.
#[derive(Clone, Default)]
pub struct Capabilities {
    /// Activation toggle.
    pub set_active: Option<SetActiveFn>,
    /// Pointer position update.
    pub update_mouse: Option<UpdateMouseFn>,
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("set_active", &self.set_active.is_some())
            .field("update_mouse", &self.update_mouse.is_some())
            .finish()
    }
}

/// Searches module handles for the activation and pointer exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResolver {
    prefix: String,
    set_active_name: String,
    update_mouse_name: String,
}

impl Default for ExportResolver {
    fn default() -> Self {
        Self {
            prefix: "_".to_string(),
            set_active_name: "set_active".to_string(),
            update_mouse_name: "update_mouse".to_string(),
        }
    }
}

impl ExportResolver {
    /// Resolver using the conventional `_` export prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different binary-export prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Resolve both capabilities from `handle`. Never fails.
    #[must_use]
    pub fn resolve<H: ModuleHandle>(&self, handle: &H) -> Capabilities {
        let owned = TableShape::LOOKUP_ORDER
            .into_iter()
            .find_map(|shape| handle.export_table(shape));
        let table: &dyn ExportTable = match &owned {
            Some(table) => &**table,
            None => handle,
        };

        let set_active = self
            .lookup(handle, table, &self.set_active_name, &SET_ACTIVE_SIGNATURE)
            .map(|raw| -> SetActiveFn { Rc::new(move |value: i32| raw(&[f64::from(value)])) });
        let update_mouse = self
            .lookup(handle, table, &self.update_mouse_name, &UPDATE_MOUSE_SIGNATURE)
            .map(|raw| -> UpdateMouseFn {
                Rc::new(move |x: f64, y: f64, present: i32| raw(&[x, y, f64::from(present)]))
            });

        tracing::debug!(
            set_active = set_active.is_some(),
            update_mouse = update_mouse.is_some(),
            "Resolved module exports"
        );

        Capabilities {
            set_active,
            update_mouse,
        }
    }

    fn lookup<H: ModuleHandle>(
        &self,
        handle: &H,
        table: &dyn ExportTable,
        name: &str,
        signature: &Signature,
    ) -> Option<RawExport> {
        let prefixed = format!("{}{name}", self.prefix);
        table
            .function(name)
            .or_else(|| table.function(&prefixed))
            .or_else(|| handle.function(&prefixed))
            .or_else(|| {
                if !handle.can_wrap() {
                    return None;
                }
                handle
                    .wrap(name, signature)
                    .map_err(|err| tracing::debug!("Wrapping {name} failed: {err}"))
                    .ok()
            })
    }
}
