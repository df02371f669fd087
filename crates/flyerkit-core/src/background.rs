//! Canvas backgrounds: solid colors, linear gradients and tiled patterns.

use crate::shapes::{DecodedImage, Rgba};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Tile reference of the built-in checkerboard pattern.
pub const CHECKER_TILE: &str = "checker";
/// Edge length of the checkerboard tile in pixels.
pub const CHECKER_TILE_SIZE: u32 = 20;

/// A color at a relative position along a gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Rgba,
}

impl ColorStop {
    pub fn new(offset: f64, color: Rgba) -> Self {
        Self { offset, color }
    }
}

/// Direction of a linear gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AxisRepr", into = "AxisRepr")]
pub enum GradientAxis {
    /// Left edge to right edge.
    Horizontal,
    /// Top edge to bottom edge.
    Vertical,
    /// Top-left corner to bottom-right corner.
    Diagonal,
    /// Explicit start and end points in canvas units.
    Line { start: Point, end: Point },
}

impl GradientAxis {
    /// Start and end points of the gradient line for a surface of `size`.
    pub fn resolve(&self, size: Size) -> (Point, Point) {
        match *self {
            GradientAxis::Horizontal => (Point::ZERO, Point::new(size.width, 0.0)),
            GradientAxis::Vertical => (Point::ZERO, Point::new(0.0, size.height)),
            GradientAxis::Diagonal => (Point::ZERO, Point::new(size.width, size.height)),
            GradientAxis::Line { start, end } => (start, end),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AxisRepr {
    Named(String),
    Line { x0: f64, y0: f64, x1: f64, y1: f64 },
}

impl TryFrom<AxisRepr> for GradientAxis {
    type Error = String;

    fn try_from(repr: AxisRepr) -> Result<Self, Self::Error> {
        match repr {
            AxisRepr::Named(name) => match name.to_ascii_lowercase().as_str() {
                "horizontal" => Ok(GradientAxis::Horizontal),
                "vertical" => Ok(GradientAxis::Vertical),
                "diagonal" => Ok(GradientAxis::Diagonal),
                other => Err(format!("Unknown gradient axis: {other}")),
            },
            AxisRepr::Line { x0, y0, x1, y1 } => Ok(GradientAxis::Line {
                start: Point::new(x0, y0),
                end: Point::new(x1, y1),
            }),
        }
    }
}

impl From<GradientAxis> for AxisRepr {
    fn from(axis: GradientAxis) -> Self {
        match axis {
            GradientAxis::Horizontal => AxisRepr::Named("horizontal".to_string()),
            GradientAxis::Vertical => AxisRepr::Named("vertical".to_string()),
            GradientAxis::Diagonal => AxisRepr::Named("diagonal".to_string()),
            GradientAxis::Line { start, end } => AxisRepr::Line {
                x0: start.x,
                y0: start.y,
                x1: end.x,
                y1: end.y,
            },
        }
    }
}

/// Everything painted behind the scene objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BackgroundRepr", into = "BackgroundRepr")]
pub enum Background {
    Solid(Rgba),
    /// Linear gradient; stops are sorted by offset and clamped to [0, 1].
    Gradient {
        stops: Vec<ColorStop>,
        axis: GradientAxis,
    },
    /// Repeating tile looked up by reference.
    Pattern { tile_ref: String },
}

impl Default for Background {
    fn default() -> Self {
        Self::white()
    }
}

impl Background {
    pub fn white() -> Self {
        Background::Solid(Rgba::white())
    }

    /// Build a gradient, normalizing its stops.
    pub fn gradient(mut stops: Vec<ColorStop>, axis: GradientAxis) -> Self {
        for stop in &mut stops {
            stop.offset = stop.offset.clamp(0.0, 1.0);
        }
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Background::Gradient { stops, axis }
    }

    pub fn pattern(tile_ref: impl Into<String>) -> Self {
        Background::Pattern {
            tile_ref: tile_ref.into(),
        }
    }

    /// Diagonal purple-to-pink gradient offered by the background picker.
    pub fn sunset() -> Self {
        Self::gradient(
            vec![
                ColorStop::new(0.0, Rgba::from_hex(0x667eea)),
                ColorStop::new(0.5, Rgba::from_hex(0x764ba2)),
                ColorStop::new(1.0, Rgba::from_hex(0xf093fb)),
            ],
            GradientAxis::Diagonal,
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Background::Solid(_) => "solid",
            Background::Gradient { .. } => "gradient",
            Background::Pattern { .. } => "pattern",
        }
    }
}

/// Rasterize a known pattern tile.
pub fn pattern_tile(tile_ref: &str) -> Option<DecodedImage> {
    match tile_ref {
        CHECKER_TILE => Some(checker_tile()),
        _ => None,
    }
}

fn checker_tile() -> DecodedImage {
    let size = CHECKER_TILE_SIZE;
    let half = size / 2;
    let base = Rgba::from_hex(0xf0f0f0);
    let square = Rgba::from_hex(0xe0e0e0);
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let color = if (x < half) == (y < half) { square } else { base };
            pixels.extend_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }
    DecodedImage::new(size, size, pixels)
}

fn default_tile_ref() -> String {
    CHECKER_TILE.to_string()
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum BackgroundRepr {
    Color(Rgba),
    Tagged(TaggedBackground),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TaggedBackground {
    Gradient {
        stops: Vec<ColorStop>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        axis: Option<GradientAxis>,
        // Bare line coordinates are accepted when no axis is given
        #[serde(default, skip_serializing)]
        x0: Option<f64>,
        #[serde(default, skip_serializing)]
        y0: Option<f64>,
        #[serde(default, skip_serializing)]
        x1: Option<f64>,
        #[serde(default, skip_serializing)]
        y1: Option<f64>,
    },
    Pattern {
        #[serde(rename = "tileRef", default = "default_tile_ref")]
        tile_ref: String,
    },
}

impl TryFrom<BackgroundRepr> for Background {
    type Error = String;

    fn try_from(repr: BackgroundRepr) -> Result<Self, Self::Error> {
        match repr {
            BackgroundRepr::Color(color) => Ok(Background::Solid(color)),
            BackgroundRepr::Tagged(TaggedBackground::Gradient {
                stops,
                axis,
                x0,
                y0,
                x1,
                y1,
            }) => {
                let axis = match (axis, x0, y0, x1, y1) {
                    (Some(axis), ..) => axis,
                    (None, Some(x0), Some(y0), Some(x1), Some(y1)) => GradientAxis::Line {
                        start: Point::new(x0, y0),
                        end: Point::new(x1, y1),
                    },
                    _ => GradientAxis::Vertical,
                };
                Ok(Background::gradient(stops, axis))
            }
            BackgroundRepr::Tagged(TaggedBackground::Pattern { tile_ref }) => {
                Ok(Background::Pattern { tile_ref })
            }
        }
    }
}

impl From<Background> for BackgroundRepr {
    fn from(background: Background) -> Self {
        match background {
            Background::Solid(color) => BackgroundRepr::Color(color),
            Background::Gradient { stops, axis } => {
                BackgroundRepr::Tagged(TaggedBackground::Gradient {
                    stops,
                    axis: Some(axis),
                    x0: None,
                    y0: None,
                    x1: None,
                    y1: None,
                })
            }
            Background::Pattern { tile_ref } => {
                BackgroundRepr::Tagged(TaggedBackground::Pattern { tile_ref })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_serializes_as_string() {
        let json = serde_json::to_string(&Background::white()).unwrap();
        assert_eq!(json, r##""#ffffff""##);
        let back: Background = serde_json::from_str(r##""#2c3e50""##).unwrap();
        assert_eq!(back, Background::Solid(Rgba::from_hex(0x2c3e50)));
    }

    #[test]
    fn test_gradient_roundtrip() {
        let bg = Background::sunset();
        let json = serde_json::to_string(&bg).unwrap();
        assert!(json.contains(r#""type":"gradient""#));
        assert!(json.contains(r#""axis":"diagonal""#));
        let back: Background = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bg);
    }

    #[test]
    fn test_gradient_accepts_line_coordinates() {
        let json = r##"{"type":"gradient","x0":0,"y0":0,"x1":0,"y1":600,
            "stops":[{"offset":1,"color":"#764ba2"},{"offset":0,"color":"#667eea"}]}"##;
        let bg: Background = serde_json::from_str(json).unwrap();
        match bg {
            Background::Gradient { stops, axis } => {
                assert!((stops[0].offset - 0.0).abs() < f64::EPSILON);
                let (start, end) = axis.resolve(Size::new(800.0, 600.0));
                assert_eq!(start, Point::ZERO);
                assert_eq!(end, Point::new(0.0, 600.0));
            }
            other => panic!("expected gradient, got {other:?}"),
        }
    }

    #[test]
    fn test_gradient_offsets_clamped() {
        let bg = Background::gradient(
            vec![ColorStop::new(1.5, Rgba::white()), ColorStop::new(-1.0, Rgba::black())],
            GradientAxis::Horizontal,
        );
        let Background::Gradient { stops, .. } = bg else {
            panic!("expected gradient");
        };
        assert!((stops[0].offset - 0.0).abs() < f64::EPSILON);
        assert!((stops[1].offset - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_axis_resolution() {
        let size = Size::new(800.0, 600.0);
        assert_eq!(GradientAxis::Horizontal.resolve(size).1, Point::new(800.0, 0.0));
        assert_eq!(GradientAxis::Diagonal.resolve(size).1, Point::new(800.0, 600.0));
    }

    #[test]
    fn test_pattern_defaults_to_checker() {
        let bg: Background = serde_json::from_str(r#"{"type":"pattern"}"#).unwrap();
        assert_eq!(bg, Background::pattern(CHECKER_TILE));
        let json = serde_json::to_string(&bg).unwrap();
        assert!(json.contains(r#""tileRef":"checker""#));
    }

    #[test]
    fn test_unknown_axis_rejected() {
        let json = r#"{"type":"gradient","stops":[],"axis":"spiral"}"#;
        assert!(serde_json::from_str::<Background>(json).is_err());
    }

    #[test]
    fn test_checker_tile_pixels() {
        let tile = pattern_tile(CHECKER_TILE).unwrap();
        assert_eq!(tile.width, 20);
        assert_eq!(tile.pixels.len(), 20 * 20 * 4);
        // (0,0) is a dark square, (15,0) is base, (15,15) is dark again
        assert_eq!(tile.pixels[0], 0xe0);
        assert_eq!(tile.pixels[15 * 4], 0xf0);
        assert_eq!(tile.pixels[(15 * 20 + 15) * 4], 0xe0);
        assert!(pattern_tile("plaid").is_none());
    }
}
