//! Viewport zoom and screen-to-canvas conversion.

use kurbo::{Affine, Point};
use serde::{Deserialize, Serialize};

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 5.0;
/// Multiplier applied by a single zoom-in step.
pub const ZOOM_STEP: f64 = 1.1;

/// Zoom state of the canvas view.
///
/// The canvas is scaled from its top-left corner, so screen points only
/// need dividing by the zoom factor to land in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { zoom: 1.0 }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom factor, clamped to [MIN_ZOOM, MAX_ZOOM].
    /// Non-finite factors are ignored.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
        self.zoom
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set_zoom(self.zoom * ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set_zoom(self.zoom * 0.9)
    }

    pub fn reset(&mut self) {
        self.zoom = 1.0;
    }

    /// Canvas-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.zoom)
    }

    /// Convert a screen point to canvas coordinates.
    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        Point::new(screen_point.x / self.zoom, screen_point.y / self.zoom)
    }

    /// Convert a canvas point to screen coordinates.
    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        self.transform() * canvas_point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_default() {
        let viewport = Viewport::new();
        assert!((viewport.zoom() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut viewport = Viewport::new();
        assert!((viewport.set_zoom(12.0) - MAX_ZOOM).abs() < f64::EPSILON);
        assert!((viewport.set_zoom(0.01) - MIN_ZOOM).abs() < f64::EPSILON);
        viewport.set_zoom(f64::NAN);
        assert!((viewport.zoom() - MIN_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_steps() {
        let mut viewport = Viewport::new();
        viewport.zoom_in();
        assert!((viewport.zoom() - 1.1).abs() < 1e-9);
        viewport.reset();
        viewport.zoom_out();
        assert!((viewport.zoom() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_screen_to_canvas_roundtrip() {
        let mut viewport = Viewport::new();
        viewport.set_zoom(2.0);
        let canvas = viewport.screen_to_canvas(Point::new(300.0, 200.0));
        assert_eq!(canvas, Point::new(150.0, 100.0));
        let screen = viewport.canvas_to_screen(canvas);
        assert!((screen.x - 300.0).abs() < 1e-9);
        assert!((screen.y - 200.0).abs() < 1e-9);
    }
}
