//! Pointer mapping from viewport coordinates into a module's logical canvas
//! space.

/// A rectangle in viewport (CSS pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenRect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Rendered width.
    pub width: f64,
    /// Rendered height.
    pub height: f64,
}

impl ScreenRect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// A pointer update as sent to `update_mouse`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// X in logical pixels.
    pub x: f64,
    /// Y in logical pixels.
    pub y: f64,
    /// Whether the pointer is over the canvas.
    pub present: bool,
}

impl PointerSample {
    /// Pointer over the canvas at `(x, y)`.
    #[must_use]
    pub const fn present(x: f64, y: f64) -> Self {
        Self { x, y, present: true }
    }

    /// Pointer gone (leave or blur).
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            present: false,
        }
    }

    /// Centre of a `width` x `height` surface, not present. Sent once a demo
    /// starts so the module has a sane resting position.
    #[must_use]
    pub fn resting(width: u32, height: u32) -> Self {
        Self {
            x: f64::from(width) * 0.5,
            y: f64::from(height) * 0.5,
            present: false,
        }
    }

    /// Presence as the integer flag modules expect.
    #[must_use]
    pub fn presence_flag(&self) -> i32 {
        i32::from(self.present)
    }
}

/// Maps viewport positions onto a canvas's backing store.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerMapper;

impl PointerMapper {
    /// Map `(client_x, client_y)` onto a `logical_width` x `logical_height`
    /// backing store rendered at `rect`.
    ///
    /// Each axis scales independently. Returns `None` when the canvas has no
    /// rendered area.
    #[must_use]
    pub fn map(
        client_x: f64,
        client_y: f64,
        rect: &ScreenRect,
        logical_width: u32,
        logical_height: u32,
    ) -> Option<PointerSample> {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return None;
        }
        let scale_x = f64::from(logical_width) / rect.width;
        let scale_y = f64::from(logical_height) / rect.height;
        Some(PointerSample::present(
            (client_x - rect.left) * scale_x,
            (client_y - rect.top) * scale_y,
        ))
    }
}
