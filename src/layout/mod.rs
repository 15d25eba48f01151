pub mod dock;

pub use dock::{DockPlacement, TileGeometry, place_in_dock};

/// Pixel rectangle with a signed origin. Windows may hang off the left,
/// right or bottom edge of the viewport, so nothing here is clamped unless a
/// caller asks for it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }

    pub fn with_origin(self, left: f64, top: f64) -> Self {
        Self { left, top, ..self }
    }

    pub fn with_size(self, width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..self
        }
    }

    /// Pull the rectangle back inside `viewport` when its right or bottom
    /// edge overhangs. A rectangle larger than the viewport is pinned to the
    /// top-left corner; the size is never changed.
    pub fn clamp_into(self, viewport: Viewport) -> Self {
        let left = if self.right() > viewport.width {
            (viewport.width - self.width).max(0.0)
        } else {
            self.left
        };
        let top = if self.bottom() > viewport.height {
            (viewport.height - self.height).max(0.0)
        } else {
            self.top
        };
        self.with_origin(left, top)
    }

    /// Position a rectangle of this size in the middle of the viewport on
    /// the requested axes.
    pub fn centered_in(self, viewport: Viewport, horizontal: bool, vertical: bool) -> Self {
        let left = if horizontal {
            viewport.width / 2.0 - self.width / 2.0
        } else {
            self.left
        };
        let top = if vertical {
            viewport.height / 2.0 - self.height / 2.0
        } else {
            self.top
        };
        self.with_origin(left, top)
    }
}

/// Size of the visual surface all windows live in.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}
