use crate::coords::{Rect, Viewport};

/// Main camera: a viewport-sized window onto the content, scrolled
/// vertically by `scroll_y`.
///
/// `reserved_bottom` is the height currently covered by a bottom drawer;
/// scrolling code extends its range by this much so content under the
/// drawer stays reachable.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub width: f32,
    pub height: f32,
    pub scroll_y: f32,
    pub reserved_bottom: f32,
}

impl Camera {
    pub fn new(viewport: Viewport) -> Self {
        Self { width: viewport.width, height: viewport.height, scroll_y: 0.0, reserved_bottom: 0.0 }
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    /// Screen-space area not covered by a bottom drawer.
    #[inline]
    pub fn visible_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, (self.height - self.reserved_bottom).max(0.0))
    }
}
