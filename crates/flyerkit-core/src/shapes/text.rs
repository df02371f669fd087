//! Text object and text measurement.

use super::{
    new_object_id, rect_contains_inclusive, ObjectId, ObjectStyle, ObjectTrait, Rgba,
};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};

/// Line height relative to font size, used for hit boxes and selection.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Font slant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Horizontal alignment relative to the anchor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// Left edge of a run of `width` anchored at `x`.
    pub fn start_x(self, x: f64, width: f64) -> f64 {
        match self {
            TextAlign::Left => x,
            TextAlign::Center => x - width / 2.0,
            TextAlign::Right => x - width,
        }
    }
}

fn default_font_family() -> String {
    "Arial".to_string()
}

/// Measures the advance width of a text object's content.
pub trait TextMeasure {
    fn advance_width(&self, text: &Text) -> f64;
}

/// Font-independent width estimate from character count.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTextMeasure;

impl TextMeasure for ApproxTextMeasure {
    fn advance_width(&self, text: &Text) -> f64 {
        // Average glyph advance as a fraction of the em size
        let char_width_factor = match text.font_weight {
            FontWeight::Normal => 0.55,
            FontWeight::Bold => 0.6,
        };
        text.content.chars().count() as f64 * text.font_size * char_width_factor
    }
}

/// A single line of text anchored at its baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    #[serde(default = "new_object_id")]
    pub(crate) id: ObjectId,
    /// Baseline origin; interpreted according to `align`.
    #[serde(flatten)]
    pub position: Point,
    #[serde(rename = "text")]
    pub content: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    pub font_size: f64,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default)]
    pub underline: bool,
    #[serde(default, rename = "textAlign")]
    pub align: TextAlign,
    #[serde(flatten)]
    pub style: ObjectStyle,
}

impl Text {
    pub fn new(position: Point, content: impl Into<String>, font_size: f64) -> Self {
        Self {
            id: new_object_id(),
            position,
            content: content.into(),
            font_family: default_font_family(),
            font_size,
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            underline: false,
            align: TextAlign::Left,
            style: ObjectStyle {
                fill: Some(Rgba::black()),
                ..ObjectStyle::default()
            },
        }
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.style.fill = Some(color);
        self
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_bold(&self) -> bool {
        self.font_weight == FontWeight::Bold
    }

    pub fn is_italic(&self) -> bool {
        self.font_style == FontStyle::Italic
    }

    /// CSS font shorthand, e.g. `italic bold 24px Arial`.
    pub fn font_string(&self) -> String {
        let mut font = String::new();
        if self.is_italic() {
            font.push_str("italic ");
        }
        if self.is_bold() {
            font.push_str("bold ");
        }
        font.push_str(&format!("{}px {}", self.font_size, self.font_family));
        font
    }

    /// Height of the hit box above the baseline.
    pub fn line_height(&self) -> f64 {
        self.font_size * LINE_HEIGHT_FACTOR
    }

    /// Text color (the fill), falling back to black.
    pub fn color(&self) -> Rgba {
        self.style.fill.unwrap_or_else(Rgba::black)
    }
}

impl Default for Text {
    fn default() -> Self {
        Self::new(Point::new(100.0, 100.0), "Double click to edit", 24.0)
    }
}

impl ObjectTrait for Text {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    fn bounds(&self, measure: &dyn TextMeasure) -> Rect {
        let width = measure.advance_width(self);
        let x0 = self.align.start_x(self.position.x, width);
        Rect::new(
            x0,
            self.position.y - self.line_height(),
            x0 + width,
            self.position.y,
        )
    }

    fn contains_point(&self, point: Point, measure: &dyn TextMeasure) -> bool {
        rect_contains_inclusive(self.bounds(measure), point)
    }

    fn to_path(&self, measure: &dyn TextMeasure) -> BezPath {
        self.bounds(measure).to_path(0.1)
    }

    fn style(&self) -> &ObjectStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ObjectStyle {
        &mut self.style
    }
}
