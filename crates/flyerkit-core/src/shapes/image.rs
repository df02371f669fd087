//! Image object for placing raster images.

use super::{
    new_object_id, rect_contains_inclusive, ObjectId, ObjectStyle, ObjectTrait, TextMeasure,
};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Largest side of a freshly added image.
pub const MAX_INITIAL_SIZE: f64 = 300.0;

/// Decoded pixels in straight (non-premultiplied) RGBA8.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Decode lifecycle of an image object.
#[derive(Debug, Clone, Default)]
pub enum ImageState {
    /// Waiting for the decoder; paints nothing.
    #[default]
    Pending,
    /// Pixels available for painting.
    Ready(Arc<DecodedImage>),
    /// Decoding failed; paints nothing.
    Failed(String),
}

/// A raster image placed on the canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default = "new_object_id")]
    pub(crate) id: ObjectId,
    /// Top-left corner position.
    #[serde(flatten)]
    pub position: Point,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
    /// Content URI or file path the pixels are loaded from.
    #[serde(rename = "image", default)]
    pub source: Option<String>,
    #[serde(flatten)]
    pub style: ObjectStyle,
    #[serde(skip)]
    pub state: ImageState,
}

impl Image {
    /// Create a pending image that still needs decoding.
    pub fn new(position: Point, width: f64, height: f64, source: impl Into<String>) -> Self {
        Self {
            id: new_object_id(),
            position,
            width,
            height,
            source: Some(source.into()),
            style: ObjectStyle::default(),
            state: ImageState::Pending,
        }
    }

    /// Create a ready image at the default spot, scaled to fit the initial size box.
    pub fn from_decoded(source: impl Into<String>, decoded: Arc<DecodedImage>) -> Self {
        let mut image = Self::new(
            Point::new(100.0, 100.0),
            decoded.width as f64,
            decoded.height as f64,
            source,
        );
        image.fit_within(MAX_INITIAL_SIZE, MAX_INITIAL_SIZE);
        image.state = ImageState::Ready(decoded);
        image
    }

    /// Scale the display size so both sides fit, preserving aspect ratio.
    pub fn fit_within(&mut self, max_width: f64, max_height: f64) {
        if self.width <= 0.0 || self.height <= 0.0 {
            return;
        }
        let scale = (max_width / self.width).min(max_height / self.height);
        self.width *= scale;
        self.height *= scale;
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    /// Decoded pixels, if ready.
    pub fn pixels(&self) -> Option<&Arc<DecodedImage>> {
        match &self.state {
            ImageState::Ready(decoded) => Some(decoded),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, ImageState::Pending)
    }

    /// Copy that keeps the source reference but drops decoded pixels.
    pub fn detached(&self) -> Image {
        Image {
            state: ImageState::Pending,
            ..self.clone()
        }
    }

    /// Compare persisted fields; decode state is ignored.
    pub fn same_fields(&self, other: &Image) -> bool {
        self.id == other.id
            && self.position == other.position
            && self.width == other.width
            && self.height == other.height
            && self.source == other.source
            && self.style == other.style
    }
}

impl ObjectTrait for Image {
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
