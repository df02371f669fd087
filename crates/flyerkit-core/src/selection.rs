//! Resize handles and the incremental resize rule.

use crate::shapes::{Image, ObjectId, Rectangle, SceneObject, MIN_RADIUS, MIN_SIZE};
use kurbo::{Point, Vec2};

/// Handle hit threshold in canvas units (per axis).
pub const HANDLE_HIT_THRESHOLD: f64 = 8.0;
/// Edge length of the square drawn for each handle.
pub const HANDLE_SIZE: f64 = 8.0;

/// Compass name of a resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Nw,
    Ne,
    Sw,
    Se,
    N,
    S,
    E,
    W,
}

impl HandleKind {
    pub fn name(self) -> &'static str {
        match self {
            HandleKind::Nw => "nw",
            HandleKind::Ne => "ne",
            HandleKind::Sw => "sw",
            HandleKind::Se => "se",
            HandleKind::N => "n",
            HandleKind::S => "s",
            HandleKind::E => "e",
            HandleKind::W => "w",
        }
    }

    fn moves_east(self) -> bool {
        matches!(self, HandleKind::Ne | HandleKind::Se | HandleKind::E)
    }

    fn moves_west(self) -> bool {
        matches!(self, HandleKind::Nw | HandleKind::Sw | HandleKind::W)
    }

    fn moves_south(self) -> bool {
        matches!(self, HandleKind::Sw | HandleKind::Se | HandleKind::S)
    }

    fn moves_north(self) -> bool {
        matches!(self, HandleKind::Nw | HandleKind::Ne | HandleKind::N)
    }
}

/// A resize handle with its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in canvas coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Both axis distances must be strictly below the threshold.
    pub fn hit_test(&self, point: Point, threshold: f64) -> bool {
        (point.x - self.position.x).abs() < threshold && (point.y - self.position.y).abs() < threshold
    }
}

/// Resize handles of an object. Triangles and text have none.
pub fn resize_handles(object: &SceneObject) -> Vec<Handle> {
    match object {
        SceneObject::Rect(Rectangle {
            position,
            width,
            height,
            ..
        })
        | SceneObject::Image(Image {
            position,
            width,
            height,
            ..
        }) => corner_handles(*position, *width, *height),
        SceneObject::Circle(circle) => {
            let Point { x, y } = circle.position;
            let r = circle.radius;
            vec![
                Handle::new(Point::new(x + r, y), HandleKind::E),
                Handle::new(Point::new(x - r, y), HandleKind::W),
                Handle::new(Point::new(x, y - r), HandleKind::N),
                Handle::new(Point::new(x, y + r), HandleKind::S),
            ]
        }
        SceneObject::Triangle(_) | SceneObject::Text(_) => Vec::new(),
    }
}

fn corner_handles(origin: Point, width: f64, height: f64) -> Vec<Handle> {
    let (x0, y0) = (origin.x, origin.y);
    let (x1, y1) = (x0 + width, y0 + height);
    vec![
        Handle::new(Point::new(x1, y1), HandleKind::Se),
        Handle::new(Point::new(x0, y1), HandleKind::Sw),
        Handle::new(Point::new(x1, y0), HandleKind::Ne),
        Handle::new(Point::new(x0, y0), HandleKind::Nw),
    ]
}

/// First handle of the object within `threshold` of the point.
pub fn handle_at(object: &SceneObject, point: Point, threshold: f64) -> Option<HandleKind> {
    resize_handles(object)
        .into_iter()
        .find(|h| h.hit_test(point, threshold))
        .map(|h| h.kind)
}

/// Apply one incremental resize step. Returns true if the object changed.
///
/// West and north edges only move while the new size stays above the floor,
/// so an object pushed past its minimum keeps both edges where they are.
pub fn apply_resize(object: &mut SceneObject, handle: HandleKind, delta: Vec2) -> bool {
    match object {
        SceneObject::Rect(rect) => {
            resize_box(&mut rect.position, &mut rect.width, &mut rect.height, handle, delta)
        }
        SceneObject::Image(image) => {
            resize_box(&mut image.position, &mut image.width, &mut image.height, handle, delta)
        }
        SceneObject::Circle(circle) => {
            let radius = (circle.radius + (delta.x + delta.y) / 2.0).max(MIN_RADIUS);
            let changed = (radius - circle.radius).abs() > f64::EPSILON;
            circle.radius = radius;
            changed
        }
        SceneObject::Triangle(_) | SceneObject::Text(_) => false,
    }
}

fn resize_box(
    position: &mut Point,
    width: &mut f64,
    height: &mut f64,
    handle: HandleKind,
    delta: Vec2,
) -> bool {
    let before = (*position, *width, *height);

    if handle.moves_east() {
        *width = (*width + delta.x).max(MIN_SIZE);
    }
    if handle.moves_west() {
        let new_width = (*width - delta.x).max(MIN_SIZE);
        if new_width > MIN_SIZE {
            position.x += delta.x;
            *width = new_width;
        }
    }
    if handle.moves_south() {
        *height = (*height + delta.y).max(MIN_SIZE);
    }
    if handle.moves_north() {
        let new_height = (*height - delta.y).max(MIN_SIZE);
        if new_height > MIN_SIZE {
            position.y += delta.y;
            *height = new_height;
        }
    }

    before != (*position, *width, *height)
}

/// In-progress resize of one object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeState {
    pub id: ObjectId,
    pub handle: HandleKind,
    /// Pointer position of the previous step.
    pub anchor: Point,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, Text, Triangle};

    fn rect() -> SceneObject {
        SceneObject::Rect(Rectangle::default())
    }

    fn as_rect(object: &SceneObject) -> &Rectangle {
        match object {
            SceneObject::Rect(r) => r,
            _ => panic!("expected rect"),
        }
    }

    #[test]
    fn test_rect_handles_at_corners() {
        let handles = resize_handles(&rect());
        assert_eq!(handles.len(), 4);
        let nw = handles.iter().find(|h| h.kind == HandleKind::Nw).unwrap();
        assert_eq!(nw.position, Point::new(100.0, 100.0));
        let se = handles.iter().find(|h| h.kind == HandleKind::Se).unwrap();
        assert_eq!(se.position, Point::new(300.0, 250.0));
    }

    #[test]
    fn test_circle_handles_at_radius() {
        let circle = SceneObject::Circle(Circle::default());
        let handles = resize_handles(&circle);
        let n = handles.iter().find(|h| h.kind == HandleKind::N).unwrap();
        assert_eq!(n.position, Point::new(200.0, 100.0));
        let e = handles.iter().find(|h| h.kind == HandleKind::E).unwrap();
        assert_eq!(e.position, Point::new(275.0, 175.0));
    }

    #[test]
    fn test_no_handles_for_triangle_and_text() {
        assert!(resize_handles(&SceneObject::Triangle(Triangle::default())).is_empty());
        assert!(resize_handles(&SceneObject::Text(Text::default())).is_empty());
    }

    #[test]
    fn test_handle_at_threshold_per_axis() {
        let object = rect();
        assert_eq!(
            handle_at(&object, Point::new(105.0, 95.0), HANDLE_HIT_THRESHOLD),
            Some(HandleKind::Nw)
        );
        // Exactly at the threshold does not count
        assert_eq!(handle_at(&object, Point::new(108.0, 100.0), HANDLE_HIT_THRESHOLD), None);
        // Close on one axis only
        assert_eq!(handle_at(&object, Point::new(101.0, 120.0), HANDLE_HIT_THRESHOLD), None);
    }

    #[test]
    fn test_resize_east_and_south() {
        let mut object = rect();
        assert!(apply_resize(&mut object, HandleKind::Se, Vec2::new(10.0, -5.0)));
        let r = as_rect(&object);
        assert!((r.width - 210.0).abs() < f64::EPSILON);
        assert!((r.height - 145.0).abs() < f64::EPSILON);
        assert!((r.position.x - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_west_moves_origin() {
        let mut object = rect();
        apply_resize(&mut object, HandleKind::Nw, Vec2::new(50.0, 30.0));
        let r = as_rect(&object);
        assert!((r.position.x - 150.0).abs() < f64::EPSILON);
        assert!((r.position.y - 130.0).abs() < f64::EPSILON);
        assert!((r.width - 150.0).abs() < f64::EPSILON);
        assert!((r.height - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_west_freezes_at_floor() {
        let mut object = rect();
        // Would shrink the width to -100; edges and size hold
        let changed = apply_resize(&mut object, HandleKind::W, Vec2::new(300.0, 0.0));
        assert!(!changed);
        let r = as_rect(&object);
        assert!((r.position.x - 100.0).abs() < f64::EPSILON);
        assert!((r.width - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_east_clamps_to_floor() {
        let mut object = rect();
        apply_resize(&mut object, HandleKind::E, Vec2::new(-500.0, 0.0));
        assert!((as_rect(&object).width - MIN_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_circle_radius_floor() {
        let mut object = SceneObject::Circle(Circle::default());
        apply_resize(&mut object, HandleKind::E, Vec2::new(-200.0, -200.0));
        let SceneObject::Circle(circle) = &object else {
            panic!("expected circle");
        };
        assert!((circle.radius - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_circle_radius_uses_average_delta() {
        let mut object = SceneObject::Circle(Circle::default());
        apply_resize(&mut object, HandleKind::S, Vec2::new(10.0, 20.0));
        let SceneObject::Circle(circle) = &object else {
            panic!("expected circle");
        };
        assert!((circle.radius - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_ignored_for_triangle() {
        let mut object = SceneObject::Triangle(Triangle::default());
        assert!(!apply_resize(&mut object, HandleKind::Se, Vec2::new(10.0, 10.0)));
    }
}
