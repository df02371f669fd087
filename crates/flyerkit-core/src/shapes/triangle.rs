//! Isosceles triangle object (apex up).

use super::{
    new_object_id, rect_contains_inclusive, ObjectId, ObjectStyle, ObjectTrait, Rgba, TextMeasure,
};
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};

/// An isosceles triangle anchored at the midpoint of its base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Triangle {
    #[serde(default = "new_object_id")]
    pub(crate) id: ObjectId,
    /// Midpoint of the base edge.
    #[serde(flatten)]
    pub position: Point,
    pub width: f64,
    pub height: f64,
    #[serde(flatten)]
    pub style: ObjectStyle,
}

impl Triangle {
    pub fn new(base_mid: Point, width: f64, height: f64) -> Self {
        Self {
            id: new_object_id(),
            position: base_mid,
            width,
            height,
            style: ObjectStyle::default(),
        }
    }

    pub fn with_style(mut self, style: ObjectStyle) -> Self {
        self.style = style;
        self
    }

    /// Apex, bottom-left and bottom-right corners.
    pub fn vertices(&self) -> [Point; 3] {
        let Point { x, y } = self.position;
        [
            Point::new(x, y - self.height),
            Point::new(x - self.width / 2.0, y),
            Point::new(x + self.width / 2.0, y),
        ]
    }
}

impl Default for Triangle {
    fn default() -> Self {
        Self::new(Point::new(175.0, 200.0), 150.0, 150.0)
            .with_style(ObjectStyle::filled(Rgba::from_hex(0x2ecc71)))
    }
}

impl ObjectTrait for Triangle {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    fn bounds(&self, _measure: &dyn TextMeasure) -> Rect {
        let Point { x, y } = self.position;
        Rect::new(x - self.width / 2.0, y - self.height, x + self.width / 2.0, y)
    }

    /// Hit-tests the enclosing rectangle, so points near the base corners
    /// outside the slanted edges still count as hits.
    fn contains_point(&self, point: Point, measure: &dyn TextMeasure) -> bool {
        rect_contains_inclusive(self.bounds(measure), point)
    }

    fn to_path(&self, _measure: &dyn TextMeasure) -> BezPath {
        let [apex, left, right] = self.vertices();
        let mut path = BezPath::new();
        path.move_to(apex);
        path.line_to(left);
        path.line_to(right);
        path.close_path();
        path
    }

    fn style(&self) -> &ObjectStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ObjectStyle {
        &mut self.style
    }
}
