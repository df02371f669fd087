//! Scene object definitions.

mod circle;
mod image;
mod rectangle;
mod text;
mod triangle;

pub use circle::Circle;
pub use image::{DecodedImage, Image, ImageState};
pub use rectangle::Rectangle;
pub use text::{ApproxTextMeasure, FontStyle, FontWeight, Text, TextAlign, TextMeasure};
pub use triangle::Triangle;

use kurbo::{BezPath, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Smallest width/height a box-shaped object can be resized to.
pub const MIN_SIZE: f64 = 20.0;
/// Smallest radius a circle can be resized to.
pub const MIN_RADIUS: f64 = 10.0;

/// Unique identifier for scene objects.
pub type ObjectId = Uuid;

pub(crate) fn new_object_id() -> ObjectId {
    Uuid::new_v4()
}

/// Error returned when a CSS color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid color: {0}")]
pub struct ColorParseError(pub String);

/// RGBA8 color, stored in documents as a CSS color string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a `0xRRGGBB` literal.
    pub const fn from_hex(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 255)
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Same color with its alpha multiplied by `opacity`.
    pub fn with_opacity(self, opacity: f64) -> Self {
        let alpha = (self.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a: alpha, ..self }
    }

    /// Parse a CSS color: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()` or a basic name.
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        let color = input.trim();
        let err = || ColorParseError(input.to_string());

        if let Some(hex) = color.strip_prefix('#') {
            // Byte slicing below needs ASCII digits
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(err());
            }
            let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| err());
            return match hex.len() {
                3 => {
                    // #rgb -> #rrggbb
                    let r = channel(&hex[0..1])? * 17;
                    let g = channel(&hex[1..2])? * 17;
                    let b = channel(&hex[2..3])? * 17;
                    Ok(Self::new(r, g, b, 255))
                }
                6 => Ok(Self::new(
                    channel(&hex[0..2])?,
                    channel(&hex[2..4])?,
                    channel(&hex[4..6])?,
                    255,
                )),
                8 => Ok(Self::new(
                    channel(&hex[0..2])?,
                    channel(&hex[2..4])?,
                    channel(&hex[4..6])?,
                    channel(&hex[6..8])?,
                )),
                _ => Err(err()),
            };
        }

        let lower = color.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts: Vec<&str> = args.split(',').map(str::trim).collect();
            if parts.len() != 3 && parts.len() != 4 {
                return Err(err());
            }
            let channel = |s: &str| {
                s.parse::<f64>()
                    .map(|v| v.clamp(0.0, 255.0).round() as u8)
                    .map_err(|_| err())
            };
            let alpha = match parts.get(3) {
                Some(a) => {
                    let a = a.parse::<f64>().map_err(|_| err())?;
                    (a.clamp(0.0, 1.0) * 255.0).round() as u8
                }
                None => 255,
            };
            return Ok(Self::new(
                channel(parts[0])?,
                channel(parts[1])?,
                channel(parts[2])?,
                alpha,
            ));
        }

        match lower.as_str() {
            "transparent" => Ok(Self::transparent()),
            "black" => Ok(Self::black()),
            "white" => Ok(Self::white()),
            "red" => Ok(Self::from_hex(0xff0000)),
            "green" => Ok(Self::from_hex(0x008000)),
            "blue" => Ok(Self::from_hex(0x0000ff)),
            "yellow" => Ok(Self::from_hex(0xffff00)),
            "orange" => Ok(Self::from_hex(0xffa500)),
            "purple" => Ok(Self::from_hex(0x800080)),
            "gray" | "grey" => Ok(Self::from_hex(0x808080)),
            _ => Err(err()),
        }
    }
}

impl FromStr for Rgba {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                self.a as f64 / 255.0
            )
        }
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgba::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Color> for Rgba {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<Rgba> for Color {
    fn from(color: Rgba) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Paint properties shared by every object kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStyle {
    /// Fill color (None = no fill). Text uses this as its color.
    #[serde(default)]
    pub fill: Option<Rgba>,
    /// Stroke color (None = no stroke).
    #[serde(default)]
    pub stroke: Option<Rgba>,
    /// Stroke width; nothing is stroked at 0.
    #[serde(default)]
    pub stroke_width: f64,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl Default for ObjectStyle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_width: 0.0,
            opacity: 1.0,
        }
    }
}

impl ObjectStyle {
    /// Filled shape with the default 2px black outline.
    pub fn filled(fill: Rgba) -> Self {
        Self {
            fill: Some(fill),
            stroke: Some(Rgba::black()),
            stroke_width: 2.0,
            opacity: 1.0,
        }
    }

    /// Fill color with opacity applied.
    pub fn fill_with_opacity(&self) -> Option<Color> {
        self.fill.map(|c| c.with_opacity(self.opacity).into())
    }

    /// Stroke color with opacity applied, or None when nothing is stroked.
    pub fn stroke_with_opacity(&self) -> Option<Color> {
        if self.stroke_width <= 0.0 {
            return None;
        }
        self.stroke.map(|c| c.with_opacity(self.opacity).into())
    }
}

/// Common behaviour of all scene objects.
pub trait ObjectTrait {
    /// Get the unique identifier.
    fn id(&self) -> ObjectId;

    /// Get the anchor position (meaning depends on the kind).
    fn position(&self) -> Point;

    /// Move the anchor position.
    fn set_position(&mut self, position: Point);

    /// Get the axis-aligned bounding box.
    fn bounds(&self, measure: &dyn TextMeasure) -> Rect;

    /// Check if a canvas point lies inside this object.
    fn contains_point(&self, point: Point, measure: &dyn TextMeasure) -> bool;

    /// Outline used for fill, stroke and the selection overlay.
    fn to_path(&self, measure: &dyn TextMeasure) -> BezPath;

    /// Get the style.
    fn style(&self) -> &ObjectStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ObjectStyle;
}

/// Kind tag of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Rect,
    Circle,
    Triangle,
    Text,
    Image,
}

impl ObjectKind {
    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Rect => "rect",
            ObjectKind::Circle => "circle",
            ObjectKind::Triangle => "triangle",
            ObjectKind::Text => "text",
            ObjectKind::Image => "image",
        }
    }
}

/// A placed primitive. Serialized with a `kind` tag and flat fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SceneObject {
    Rect(Rectangle),
    Circle(Circle),
    Triangle(Triangle),
    Text(Text),
    Image(Image),
}

impl SceneObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            SceneObject::Rect(_) => ObjectKind::Rect,
            SceneObject::Circle(_) => ObjectKind::Circle,
            SceneObject::Triangle(_) => ObjectKind::Triangle,
            SceneObject::Text(_) => ObjectKind::Text,
            SceneObject::Image(_) => ObjectKind::Image,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            SceneObject::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            SceneObject::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Image> {
        match self {
            SceneObject::Image(image) => Some(image),
            _ => None,
        }
    }

    /// Give the object a new identity.
    pub(crate) fn renew_id(&mut self) -> ObjectId {
        let id = new_object_id();
        match self {
            SceneObject::Rect(o) => o.id = id,
            SceneObject::Circle(o) => o.id = id,
            SceneObject::Triangle(o) => o.id = id,
            SceneObject::Text(o) => o.id = id,
            SceneObject::Image(o) => o.id = id,
        }
        id
    }

    /// Copy without decoded pixels; images keep only their source reference.
    pub fn detached(&self) -> SceneObject {
        match self {
            SceneObject::Image(image) => SceneObject::Image(image.detached()),
            other => other.clone(),
        }
    }

    /// Compare every persisted field, ignoring decoded image state.
    pub fn same_fields(&self, other: &SceneObject) -> bool {
        match (self, other) {
            (SceneObject::Rect(a), SceneObject::Rect(b)) => a == b,
            (SceneObject::Circle(a), SceneObject::Circle(b)) => a == b,
            (SceneObject::Triangle(a), SceneObject::Triangle(b)) => a == b,
            (SceneObject::Text(a), SceneObject::Text(b)) => a == b,
            (SceneObject::Image(a), SceneObject::Image(b)) => a.same_fields(b),
            _ => false,
        }
    }
}

impl ObjectTrait for SceneObject {
    fn id(&self) -> ObjectId {
        match self {
            SceneObject::Rect(s) => s.id(),
            SceneObject::Circle(s) => s.id(),
            SceneObject::Triangle(s) => s.id(),
            SceneObject::Text(s) => s.id(),
            SceneObject::Image(s) => s.id(),
        }
    }

    fn position(&self) -> Point {
        match self {
            SceneObject::Rect(s) => s.position(),
            SceneObject::Circle(s) => s.position(),
            SceneObject::Triangle(s) => s.position(),
            SceneObject::Text(s) => s.position(),
            SceneObject::Image(s) => s.position(),
        }
    }

    fn set_position(&mut self, position: Point) {
        match self {
            SceneObject::Rect(s) => s.set_position(position),
            SceneObject::Circle(s) => s.set_position(position),
            SceneObject::Triangle(s) => s.set_position(position),
            SceneObject::Text(s) => s.set_position(position),
            SceneObject::Image(s) => s.set_position(position),
        }
    }

    fn bounds(&self, measure: &dyn TextMeasure) -> Rect {
        match self {
            SceneObject::Rect(s) => s.bounds(measure),
            SceneObject::Circle(s) => s.bounds(measure),
            SceneObject::Triangle(s) => s.bounds(measure),
            SceneObject::Text(s) => s.bounds(measure),
            SceneObject::Image(s) => s.bounds(measure),
        }
    }

    fn contains_point(&self, point: Point, measure: &dyn TextMeasure) -> bool {
        match self {
            SceneObject::Rect(s) => s.contains_point(point, measure),
            SceneObject::Circle(s) => s.contains_point(point, measure),
            SceneObject::Triangle(s) => s.contains_point(point, measure),
            SceneObject::Text(s) => s.contains_point(point, measure),
            SceneObject::Image(s) => s.contains_point(point, measure),
        }
    }

    fn to_path(&self, measure: &dyn TextMeasure) -> BezPath {
        match self {
            SceneObject::Rect(s) => s.to_path(measure),
            SceneObject::Circle(s) => s.to_path(measure),
            SceneObject::Triangle(s) => s.to_path(measure),
            SceneObject::Text(s) => s.to_path(measure),
            SceneObject::Image(s) => s.to_path(measure),
        }
    }

    fn style(&self) -> &ObjectStyle {
        match self {
            SceneObject::Rect(s) => s.style(),
            SceneObject::Circle(s) => s.style(),
            SceneObject::Triangle(s) => s.style(),
            SceneObject::Text(s) => s.style(),
            SceneObject::Image(s) => s.style(),
        }
    }

    fn style_mut(&mut self) -> &mut ObjectStyle {
        match self {
            SceneObject::Rect(s) => s.style_mut(),
            SceneObject::Circle(s) => s.style_mut(),
            SceneObject::Triangle(s) => s.style_mut(),
            SceneObject::Text(s) => s.style_mut(),
            SceneObject::Image(s) => s.style_mut(),
        }
    }
}

/// Inclusive axis-aligned containment (kurbo's `contains` excludes the far edges).
pub(crate) fn rect_contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}
