//! Rectangle geometry in the working unit (pixels at 96 DPI)

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle; `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Clamp the position so the rect stays fully inside a page of the given
    /// size. Size is left untouched.
    pub fn clamped_within(self, page_width: f32, page_height: f32) -> Self {
        Self {
            x: self.x.clamp(0.0, (page_width - self.width).max(0.0)),
            y: self.y.clamp(0.0, (page_height - self.height).max(0.0)),
            ..self
        }
    }

    /// Enforce a lower bound on both dimensions.
    pub fn with_min_size(self, min: f32) -> Self {
        Self { width: self.width.max(min), height: self.height.max(min), ..self }
    }

    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self { x: self.x + dx, y: self.y + dy, ..self }
    }

    pub fn aspect_ratio(self) -> f32 {
        self.width / self.height
    }

    pub fn contains(self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}
