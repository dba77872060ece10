//! # Demo Core
//!
//! Lazy activation of interactive WASM demos rendered into canvases.
//! Host independent: the browser side lives in `demo-app`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 DemoBinding                 │
//! ├──────────────────────┬──────────────────────┤
//! │  ModuleLoader        │  ActivationController│
//! │  - factory / config  │  - started ∧ visible │
//! │  - entry routine     │  - memoized dispatch │
//! ├──────────────────────┼──────────────────────┤
//! │  ExportResolver      │  PointerMapper       │
//! │  - table probing     │  VisibilityWatcher   │
//! └──────────────────────┴──────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod activation;
pub mod binder;
pub mod config;
pub mod error;
pub mod exports;
pub mod loader;
pub mod module;
pub mod pointer;
pub mod visibility;

pub use activation::{ActivationController, ActivationPhase, Transition};
pub use binder::{bind_all, DemoBinding, DemoCanvas, Dependencies, IdSequence};
pub use config::{BinderConfig, DemoAttributes, VISIBILITY_THRESHOLD};
pub use error::{DemoError, DemoResult, Raised};
pub use exports::{Capabilities, ExportResolver, SetActiveFn, UpdateMouseFn};
pub use loader::ModuleLoader;
pub use module::{
    EntryPoint, ExportTable, ModuleConfig, ModuleFactory, ModuleHandle, RawExport, Signature,
    TableShape,
};
pub use pointer::{PointerMapper, PointerSample, ScreenRect};
pub use visibility::{Viewport, VisibilityWatcher};

/// Demo core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
