//! Viewport visibility of a demo canvas.

use crate::config::VISIBILITY_THRESHOLD;
use crate::pointer::ScreenRect;

/// Size of the browser viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Width in CSS pixels.
    pub width: f64,
    /// Height in CSS pixels.
    pub height: f64,
}

impl Viewport {
    /// Create a viewport.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Turns intersection reports into a visible/hidden signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityWatcher {
    threshold: f64,
    observing: bool,
}

impl Default for VisibilityWatcher {
    fn default() -> Self {
        Self::new(VISIBILITY_THRESHOLD, true)
    }
}

impl VisibilityWatcher {
    /// A watcher with the given ratio threshold.
    ///
    /// `observing` is whether the host can observe intersections at all.
    /// Without observation the canvas is always visible.
    #[must_use]
    pub const fn new(threshold: f64, observing: bool) -> Self {
        Self {
            threshold,
            observing,
        }
    }

    /// Whether intersection reports will arrive.
    #[must_use]
    pub const fn is_observing(&self) -> bool {
        self.observing
    }

    /// Visibility before any report arrives.
    #[must_use]
    pub fn initial(&self, rect: &ScreenRect, viewport: &Viewport) -> bool {
        if !self.observing {
            return true;
        }
        rect.bottom() > 0.0
            && rect.top < viewport.height
            && rect.right() > 0.0
            && rect.left < viewport.width
    }

    /// Visibility for one intersection report.
    #[must_use]
    pub fn evaluate(&self, is_intersecting: bool, ratio: f64) -> bool {
        is_intersecting && ratio >= self.threshold
    }
}
