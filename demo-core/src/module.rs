//! Host-facing view of a built demo module.
//!
//! A module is created by a [`ModuleFactory`] and comes back as a
//! [`ModuleHandle`]: a bag of places exports might live in. Hosts implement
//! these traits over whatever their module objects really are.

use std::rc::Rc;

use async_trait::async_trait;

use crate::error::{DemoResult, Raised};

/// An exported function, called with numeric arguments.
pub type RawExport = Rc<dyn Fn(&[f64]) -> Result<(), Raised>>;

/// Something exports can be looked up on by name.
pub trait ExportTable {
    /// The callable property named `name`, if there is one.
    fn function(&self, name: &str) -> Option<RawExport>;
}

/// Places on a handle where an export table may be hung.
///
/// Listed in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableShape {
    /// `instance.exports`
    InstanceExports,
    /// `asm`
    Asm,
    /// `exports`
    Exports,
}

impl TableShape {
    /// All shapes, in the order they are searched.
    pub const LOOKUP_ORDER: [TableShape; 3] = [Self::InstanceExports, Self::Asm, Self::Exports];
}

/// Signature handed to a handle's function wrapping facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// Return type, `None` for no return value.
    pub returns: Option<&'static str>,
    /// Parameter types.
    pub params: &'static [&'static str],
}

/// Signature of `set_active(int)`.
pub const SET_ACTIVE_SIGNATURE: Signature = Signature {
    returns: None,
    params: &["number"],
};

/// Signature of `update_mouse(float, float, int)`.
pub const UPDATE_MOUSE_SIGNATURE: Signature = Signature {
    returns: None,
    params: &["number", "number", "number"],
};

/// Module entry routine variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    /// `callMain(args)`
    CallMain,
    /// bare `_main()`
    Main,
}

/// An instantiated module.
///
/// The handle itself is an [`ExportTable`] for exports hung directly on it.
pub trait ModuleHandle: ExportTable {
    /// The export table stored under `shape`, if present.
    fn export_table(&self, shape: TableShape) -> Option<Box<dyn ExportTable>>;

    /// Whether the handle offers a "wrap a function by name" facility.
    fn can_wrap(&self) -> bool;

    /// Wrap the export `name` with `signature`.
    ///
    /// # Errors
    ///
    /// Returns the raised value if wrapping fails.
    fn wrap(&self, name: &str, signature: &Signature) -> Result<RawExport, Raised>;

    /// The entry routine the module exposes, preferring `callMain`.
    fn entry_point(&self) -> Option<EntryPoint>;

    /// Run the entry routine.
    ///
    /// # Errors
    ///
    /// Returns whatever the routine raised, including controlled exits.
    fn run_entry(&self, entry: EntryPoint) -> Result<(), Raised>;
}

/// Configuration surface passed to a module at instantiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleConfig {
    /// Location the module was loaded from.
    pub location: String,
    /// Directory assets are resolved against.
    pub base_dir: String,
    /// Id of the target canvas.
    pub canvas_id: String,
    /// Selector for the target canvas.
    pub selector: String,
}

impl ModuleConfig {
    /// Build the configuration for `location` rendering into `canvas_id`.
    #[must_use]
    pub fn new(location: &str, canvas_id: &str) -> Self {
        Self {
            location: location.to_string(),
            base_dir: base_directory(location).to_string(),
            canvas_id: canvas_id.to_string(),
            selector: format!("#{canvas_id}"),
        }
    }

    /// Resolve an asset requested by the module.
    #[must_use]
    pub fn locate_file(&self, path: &str) -> String {
        format!("{}{path}", self.base_dir)
    }

    /// Prefix a line of module output with the module location.
    #[must_use]
    pub fn output_line(&self, message: &str) -> String {
        format!("[{}] {message}", self.location)
    }
}

/// Everything up to and including the last `/` of `location`.
#[must_use]
pub fn base_directory(location: &str) -> &str {
    location.rfind('/').map_or("", |i| &location[..=i])
}

/// Creates module instances for canvases of type `C`.
#[async_trait(?Send)]
pub trait ModuleFactory<C> {
    /// The handle type produced.
    type Handle: ModuleHandle + 'static;

    /// Resolve `config.location` and instantiate it against `canvas`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DemoError::Import`] if the module cannot be resolved
    /// and [`crate::DemoError::Instantiate`] if its factory raises.
    async fn instantiate(&self, canvas: &C, config: &ModuleConfig) -> DemoResult<Self::Handle>;
}
