//! Canvas viewport: zoom and pan
//!
//! The viewport only affects rendering. Stored section geometry stays in the
//! working unit; incoming pointer deltas are divided by the display scale
//! before they reach the document, so edits are resolution- and
//! zoom-independent.

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 2.0;

/// Increment used by the discrete zoom buttons.
pub const ZOOM_STEP: f32 = 0.1;

/// Pinch distance change (screen px) required before a pinch registers as a
/// zoom change. Filters out two-finger jitter.
pub const PINCH_THRESHOLD_PX: f32 = 10.0;

/// Wheel-delta to zoom-factor conversion for modifier-wheel zooming.
const WHEEL_ZOOM_RATE: f32 = 0.002;

/// Pinch distance to zoom-factor conversion.
const PINCH_ZOOM_RATE: f32 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f32,
    pan_x: f32,
    pan_y: f32,
    /// Scale that fits the page into the available screen area; owned by the
    /// embedding layer and folded into the display scale.
    fit_scale: f32,
}

impl Viewport {
    pub fn new(fit_scale: f32) -> Self {
        Self { zoom: 1.0, pan_x: 0.0, pan_y: 0.0, fit_scale }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> (f32, f32) {
        (self.pan_x, self.pan_y)
    }

    pub fn set_fit_scale(&mut self, fit_scale: f32) {
        self.fit_scale = fit_scale;
    }

    /// Effective scale applied when rendering: `fit_scale * zoom`.
    pub fn display_scale(&self) -> f32 {
        self.fit_scale * self.zoom
    }

    /// Convert a pointer delta in screen pixels into working units.
    pub fn screen_delta_to_document(&self, dx: f32, dy: f32) -> (f32, f32) {
        let scale = self.display_scale();
        (dx / scale, dy / scale)
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    /// Trackpad/mouse wheel with the zoom modifier held.
    pub fn apply_wheel(&mut self, delta_y: f32) {
        self.set_zoom(self.zoom - delta_y * WHEEL_ZOOM_RATE);
    }

    /// Two-touch pinch. `distance_delta` is the change in finger distance
    /// since the pinch started; below the threshold nothing happens.
    /// Returns whether the zoom changed.
    pub fn apply_pinch(&mut self, distance_delta: f32) -> bool {
        if distance_delta.abs() < PINCH_THRESHOLD_PX {
            return false;
        }
        let before = self.zoom;
        self.set_zoom(self.zoom + distance_delta * PINCH_ZOOM_RATE);
        self.zoom != before
    }

    /// Single-touch pan, independent of section geometry.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Back to zoom 1 and pan origin.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1.0)
    }
}
