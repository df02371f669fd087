//! Rectangle object.

use super::{
    new_object_id, rect_contains_inclusive, ObjectId, ObjectStyle, ObjectTrait, Rgba, TextMeasure,
};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    #[serde(default = "new_object_id")]
    pub(crate) id: ObjectId,
    /// Top-left corner position.
    #[serde(flatten)]
    pub position: Point,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
    /// Style properties.
    #[serde(flatten)]
    pub style: ObjectStyle,
}

impl Rectangle {
    /// Create a new unstyled rectangle.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: new_object_id(),
            position,
            width,
            height,
            style: ObjectStyle::default(),
        }
    }

    pub fn with_style(mut self, style: ObjectStyle) -> Self {
        self.style = style;
        self
    }

    /// Get the rectangle as a kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }
}

impl Default for Rectangle {
    fn default() -> Self {
        Self::new(Point::new(100.0, 100.0), 200.0, 150.0)
            .with_style(ObjectStyle::filled(Rgba::from_hex(0x3498db)))
    }
}

impl ObjectTrait for Rectangle {
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
        self.as_rect()
    }

    fn contains_point(&self, point: Point, _measure: &dyn TextMeasure) -> bool {
        rect_contains_inclusive(self.as_rect(), point)
    }

    fn to_path(&self, _measure: &dyn TextMeasure) -> BezPath {
        self.as_rect().to_path(0.1)
    }

    fn style(&self) -> &ObjectStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ObjectStyle {
        &mut self.style
    }
}
