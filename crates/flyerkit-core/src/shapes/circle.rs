//! Circle object.

use super::{new_object_id, ObjectId, ObjectStyle, ObjectTrait, Rgba, TextMeasure};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};

/// A circle defined by its center and radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    #[serde(default = "new_object_id")]
    pub(crate) id: ObjectId,
    /// Center position.
    #[serde(flatten)]
    pub position: Point,
    pub radius: f64,
    #[serde(flatten)]
    pub style: ObjectStyle,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            id: new_object_id(),
            position: center,
            radius,
            style: ObjectStyle::default(),
        }
    }

    pub fn with_style(mut self, style: ObjectStyle) -> Self {
        self.style = style;
        self
    }

    pub fn as_circle(&self) -> kurbo::Circle {
        kurbo::Circle::new(self.position, self.radius)
    }
}

impl Default for Circle {
    fn default() -> Self {
        Self::new(Point::new(200.0, 175.0), 75.0)
            .with_style(ObjectStyle::filled(Rgba::from_hex(0xe74c3c)))
    }
}

impl ObjectTrait for Circle {
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
        self.as_circle().bounding_box()
    }

    fn contains_point(&self, point: Point, _measure: &dyn TextMeasure) -> bool {
        point.distance(self.position) <= self.radius
    }

    fn to_path(&self, _measure: &dyn TextMeasure) -> BezPath {
        self.as_circle().to_path(0.1)
    }

    fn style(&self) -> &ObjectStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ObjectStyle {
        &mut self.style
    }
}
