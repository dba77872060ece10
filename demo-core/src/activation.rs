//! # Activation state machine
//!
//! A module should run only while the user has started it and its canvas is
//! on screen. The controller tracks both signals, derives the combined
//! predicate, and pushes each change into the module exactly once.
//!
//! ```text
//!            start requested         load ok
//!   Idle ───────────────────▶ Activating ─────────▶ Started
//!    ▲                            │
//!    └────────── load failed ─────┘
//!
//!   visible: Hidden ◀──────────▶ Visible   (independent, any time)
//! ```

use crate::exports::SetActiveFn;

/// Lifecycle of the user-start axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationPhase {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A start was requested and the module is loading.
    Activating,
    /// The module loaded and the user started it. Terminal.
    Started,
}

/// A pending call into the module's activation export.
pub struct Transition {
    set_active: SetActiveFn,
    /// Value being applied.
    pub active: bool,
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl Transition {
    /// Invoke the export. Failures are logged and swallowed.
    pub fn dispatch(self) {
        if let Err(err) = (self.set_active)(i32::from(self.active)) {
            tracing::error!(active = self.active, "set_active state update failed: {err}");
        }
    }
}

/// Tracks `started` and `visible` and applies `started && visible`.
pub struct ActivationController {
    phase: ActivationPhase,
    visible: bool,
    last_applied: Option<bool>,
    set_active: Option<SetActiveFn>,
}

impl ActivationController {
    /// New controller in the idle phase with the given initial visibility.
    #[must_use]
    pub fn new(visible: bool) -> Self {
        Self {
            phase: ActivationPhase::Idle,
            visible,
            last_applied: None,
            set_active: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> ActivationPhase {
        self.phase
    }

    /// Whether the user has started the module.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.phase == ActivationPhase::Started
    }

    /// Whether the canvas is currently considered visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// `started && visible`.
    #[must_use]
    pub fn should_be_active(&self) -> bool {
        self.is_started() && self.visible
    }

    /// The value last pushed into the module, if any.
    #[must_use]
    pub fn last_applied(&self) -> Option<bool> {
        self.last_applied
    }

    /// Whether an activation export has been installed.
    #[must_use]
    pub fn has_set_active(&self) -> bool {
        self.set_active.is_some()
    }

    /// Install the resolved activation export.
    pub fn install(&mut self, set_active: Option<SetActiveFn>) {
        self.set_active = set_active;
    }

    /// Enter [`ActivationPhase::Activating`]. No effect once started.
    pub fn begin_activation(&mut self) {
        if self.phase == ActivationPhase::Idle {
            self.phase = ActivationPhase::Activating;
        }
    }

    /// Return to idle after a failed load. No effect once started.
    pub fn abort_activation(&mut self) {
        if self.phase == ActivationPhase::Activating {
            self.phase = ActivationPhase::Idle;
        }
    }

    /// Mark the module started.
    ///
    /// Returns `true` only for the call that actually flipped the flag.
    pub fn mark_started(&mut self) -> bool {
        if self.is_started() {
            return false;
        }
        self.phase = ActivationPhase::Started;
        tracing::debug!("Demo started");
        true
    }

    /// Record a visibility change. Returns `true` if visibility changed.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        if self.visible == visible {
            return false;
        }
        self.visible = visible;
        tracing::debug!(visible, "Demo visibility changed");
        true
    }

    /// Compute the next transition to push into the module, if any, and
    /// record it as applied.
    ///
    /// Without an installed export nothing is recorded, so the transition is
    /// produced once one is installed.
    pub fn transition(&mut self) -> Option<Transition> {
        let set_active = self.set_active.as_ref()?;
        let active = self.should_be_active();
        if self.last_applied == Some(active) {
            return None;
        }
        self.last_applied = Some(active);
        Some(Transition {
            set_active: set_active.clone(),
            active,
        })
    }

    /// Compute and dispatch the next transition while holding `&mut self`.
    #[cfg(test)]
    fn apply(&mut self) {
        if let Some(transition) = self.transition() {
            transition.dispatch();
        }
    }
}

impl std::fmt::Debug for ActivationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivationController")
            .field("phase", &self.phase)
            .field("visible", &self.visible)
            .field("last_applied", &self.last_applied)
            .field("set_active", &self.set_active.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::error::Raised;

    fn recorder() -> (SetActiveFn, Rc<RefCell<Vec<i32>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let f: SetActiveFn = Rc::new(move |v: i32| {
            sink.borrow_mut().push(v);
            Ok(())
        });
        (f, calls)
    }

    fn started(visible: bool) -> (ActivationController, Rc<RefCell<Vec<i32>>>) {
        let (f, calls) = recorder();
        let mut c = ActivationController::new(visible);
        c.install(Some(f));
        c.begin_activation();
        assert!(c.mark_started());
        c.apply();
        (c, calls)
    }

    #[test]
    fn starts_idle() {
        let c = ActivationController::new(true);
        assert_eq!(c.phase(), ActivationPhase::Idle);
        assert!(!c.should_be_active());
        assert_eq!(c.last_applied(), None);
    }

    #[test]
    fn start_while_visible_applies_one() {
        let (c, calls) = started(true);
        assert_eq!(*calls.borrow(), vec![1]);
        assert_eq!(c.last_applied(), Some(true));
    }

    #[test]
    fn start_while_hidden_applies_zero() {
        let (c, calls) = started(false);
        assert_eq!(*calls.borrow(), vec![0]);
        assert!(!c.should_be_active());
    }

    #[test]
    fn repeated_apply_is_suppressed() {
        let (mut c, calls) = started(true);
        c.apply();
        c.apply();
        assert_eq!(*calls.borrow(), vec![1]);
    }

    #[test]
    fn visibility_toggle_produces_two_calls() {
        let (mut c, calls) = started(true);
        calls.borrow_mut().clear();

        assert!(c.set_visible(false));
        c.apply();
        assert!(!c.set_visible(false));
        c.apply();
        assert!(c.set_visible(true));
        c.apply();

        assert_eq!(*calls.borrow(), vec![0, 1]);
    }

    #[test]
    fn inactive_before_start() {
        let (f, calls) = recorder();
        let mut c = ActivationController::new(false);
        c.install(Some(f));
        c.set_visible(true);
        c.apply();
        // Not started, so the first application is 0.
        assert_eq!(*calls.borrow(), vec![0]);
        c.set_visible(false);
        c.apply();
        assert_eq!(*calls.borrow(), vec![0]);
    }

    #[test]
    fn missing_export_is_a_no_op_until_installed() {
        let mut c = ActivationController::new(true);
        c.begin_activation();
        c.mark_started();
        c.apply();
        assert_eq!(c.last_applied(), None);

        let (f, calls) = recorder();
        c.install(Some(f));
        c.apply();
        assert_eq!(*calls.borrow(), vec![1]);
    }

    #[test]
    fn started_is_monotonic() {
        let (mut c, _) = started(true);
        assert!(!c.mark_started());
        c.abort_activation();
        c.begin_activation();
        assert!(c.is_started());
        assert_eq!(c.phase(), ActivationPhase::Started);
    }

    #[test]
    fn failed_load_returns_to_idle() {
        let mut c = ActivationController::new(true);
        c.begin_activation();
        assert_eq!(c.phase(), ActivationPhase::Activating);
        c.abort_activation();
        assert_eq!(c.phase(), ActivationPhase::Idle);
        assert!(!c.is_started());
    }

    #[test]
    fn failing_export_is_still_marked_applied() {
        let attempts = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&attempts);
        let f: SetActiveFn = Rc::new(move |_: i32| {
            *counter.borrow_mut() += 1;
            Err(Raised::error("RuntimeError", "table index is out of bounds"))
        });
        let mut c = ActivationController::new(true);
        c.install(Some(f));
        c.mark_started();
        c.apply();
        c.apply();
        assert_eq!(*attempts.borrow(), 1);
        assert_eq!(c.last_applied(), Some(true));
    }

    #[test]
    fn transition_is_produced_once_per_change() {
        let (f, calls) = recorder();
        let mut c = ActivationController::new(true);
        c.install(Some(f));
        c.mark_started();

        let transition = c.transition().expect("first change");
        assert_eq!(format!("{transition:?}"), "Transition { active: true, .. }");
        assert!(c.transition().is_none());
        // Nothing reaches the module until the caller dispatches.
        assert!(calls.borrow().is_empty());
        transition.dispatch();
        assert_eq!(*calls.borrow(), vec![1]);
    }
}
