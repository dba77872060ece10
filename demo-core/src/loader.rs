//! Module loading.
//!
//! Instantiates a module through its [`ModuleFactory`] and runs its entry
//! routine. Modules built to keep running after `main` returns signal that by
//! raising a controlled exit, which counts as a successful load.

use crate::error::{DemoError, DemoResult};
use crate::module::{ModuleConfig, ModuleFactory, ModuleHandle};

/// Loads demo modules through a host factory.
#[derive(Debug)]
pub struct ModuleLoader<F> {
    factory: F,
}

impl<F> ModuleLoader<F> {
    /// Create a loader over `factory`.
    #[must_use]
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    /// The underlying factory.
    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Instantiate the module at `location` for `canvas` and run its entry
    /// routine.
    ///
    /// # Errors
    ///
    /// Returns [`DemoError::MissingModule`] for an empty location, the
    /// factory's error if instantiation fails, or [`DemoError::EntryPoint`] if
    /// the entry routine raises anything other than a controlled exit.
    pub async fn load<C>(
        &self,
        canvas: &C,
        location: &str,
        canvas_id: &str,
    ) -> DemoResult<F::Handle>
    where
        F: ModuleFactory<C>,
    {
        if location.is_empty() {
            return Err(DemoError::MissingModule);
        }

        let config = ModuleConfig::new(location, canvas_id);
        tracing::info!(module = %location, canvas = %canvas_id, "Loading demo module");

        let handle = self.factory.instantiate(canvas, &config).await?;
        run_entry(&handle, location)?;

        tracing::info!(module = %location, "Demo module ready");
        Ok(handle)
    }
}

/// Run the module's entry routine if it has one.
///
/// # Errors
///
/// Returns [`DemoError::EntryPoint`] when the routine raises something that is
/// not a controlled exit.
pub fn run_entry<H: ModuleHandle>(handle: &H, location: &str) -> DemoResult<()> {
    let Some(entry) = handle.entry_point() else {
        tracing::debug!(module = %location, "Module has no entry routine");
        return Ok(());
    };

    match handle.run_entry(entry) {
        Ok(()) => Ok(()),
        Err(raised) if raised.is_controlled_exit() => {
            tracing::debug!(module = %location, "Entry routine exited: {raised}");
            Ok(())
        }
        Err(raised) => Err(DemoError::EntryPoint(raised.message)),
    }
}
