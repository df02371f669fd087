//! Grid snapping for dragged positions.

use kurbo::Point;

/// Default grid size for snapping.
pub const GRID_SIZE: f64 = 20.0;

/// Round a coordinate to the nearest multiple of `grid_size`.
/// Halves round towards positive infinity.
pub fn snap_value(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 {
        return value;
    }
    (value / grid_size + 0.5).floor() * grid_size
}

/// Snap both coordinates of a point to the grid.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(snap_value(point.x, grid_size), snap_value(point.y, grid_size))
}
