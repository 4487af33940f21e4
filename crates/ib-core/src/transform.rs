//! Screen ↔ world coordinate conversion.
//!
//! `world = (screen − pan) / zoom` and `screen = world × zoom + pan`.
//! Hit-testing and drawing happen in world space; the renderer applies
//! the inverse to display.

use serde::{Deserialize, Serialize};

/// The visible canvas dimensions in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Pan offset in screen pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pan {
    pub x: f32,
    pub y: f32,
}

/// Pan + zoom state. The zoom is always kept inside `[zoom_min, zoom_max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan: Pan,
    zoom: f32,
    zoom_min: f32,
    zoom_max: f32,
}

impl Camera {
    pub fn new(zoom_min: f32, zoom_max: f32) -> Self {
        Self {
            pan: Pan::default(),
            zoom: 1.0_f32.clamp(zoom_min, zoom_max),
            zoom_min,
            zoom_max,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Set the zoom, clamped. Rounded to two decimals so repeated
    /// 0.1 steps land on clean values.
    pub fn set_zoom(&mut self, zoom: f32) {
        let zoom = if zoom.is_finite() { zoom } else { 1.0 };
        self.zoom = ((zoom * 100.0).round() / 100.0).clamp(self.zoom_min, self.zoom_max);
    }

    /// Step the zoom by `delta` (positive = in). Returns true if it changed.
    pub fn step_zoom(&mut self, delta: f32) -> bool {
        let before = self.zoom;
        self.set_zoom(self.zoom + delta);
        (self.zoom - before).abs() > f32::EPSILON
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan.x += dx;
        self.pan.y += dy;
    }

    pub fn to_world(&self, sx: f32, sy: f32) -> (f32, f32) {
        ((sx - self.pan.x) / self.zoom, (sy - self.pan.y) / self.zoom)
    }

    pub fn to_screen(&self, wx: f32, wy: f32) -> (f32, f32) {
        (wx * self.zoom + self.pan.x, wy * self.zoom + self.pan.y)
    }

    /// Pan so that world point `(wx, wy)` lands at the viewport center.
    pub fn center_on(&mut self, wx: f32, wy: f32, viewport: Viewport) {
        self.pan.x = viewport.width / 2.0 - wx * self.zoom;
        self.pan.y = viewport.height / 2.0 - wy * self.zoom;
    }

    /// The world-space rectangle currently visible: `(x, y, width, height)`.
    pub fn visible_world_rect(&self, viewport: Viewport) -> (f32, f32, f32, f32) {
        let (x, y) = self.to_world(0.0, 0.0);
        (x, y, viewport.width / self.zoom, viewport.height / self.zoom)
    }
}
