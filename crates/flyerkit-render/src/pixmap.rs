//! CPU raster surface backed by tiny-skia.

use crate::renderer::{Paint, RenderError, RenderResult, StrokeStyle, Surface};
use flyerkit_core::shapes::DecodedImage;
use kurbo::{Affine, BezPath, PathEl, Rect, Size};
use peniko::Color;
use tiny_skia::{
    FillRule, FilterQuality, GradientStop, IntSize, LinearGradient, Pattern, Pixmap, PixmapPaint,
    Shader, SpreadMode, Stroke, StrokeDash, Transform,
};

/// Raster surface that owns an RGBA pixmap (premultiplied alpha).
pub struct PixmapSurface {
    pixmap: Pixmap,
    transform: Transform,
}

impl PixmapSurface {
    /// Allocate a transparent surface.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let pixmap =
            Pixmap::new(width, height).ok_or(RenderError::SurfaceAllocation { width, height })?;
        Ok(Self {
            pixmap,
            transform: Transform::identity(),
        })
    }

    /// Surface sized for a canvas at the given pixel ratio.
    pub fn for_canvas(canvas: Size, scale: f64) -> RenderResult<Self> {
        let width = (canvas.width * scale).ceil().max(1.0) as u32;
        let height = (canvas.height * scale).ceil().max(1.0) as u32;
        Self::new(width, height)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    /// Straight-alpha RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }
}

impl Surface for PixmapSurface {
    fn size(&self) -> Size {
        Size::new(self.pixmap.width() as f64, self.pixmap.height() as f64)
    }

    fn clear(&mut self, color: Color) {
        self.pixmap.fill(skia_color(color));
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = skia_transform(transform);
    }

    fn fill_path(&mut self, path: &BezPath, paint: &Paint) {
        let Some(path) = skia_path(path) else {
            return;
        };
        let tile;
        let shader = match paint {
            Paint::Solid(color) => Shader::SolidColor(skia_color(*color)),
            Paint::LinearGradient { start, end, stops } => {
                let gradient_stops = stops
                    .iter()
                    .map(|(offset, color)| GradientStop::new(*offset as f32, skia_color(*color)))
                    .collect();
                match LinearGradient::new(
                    tiny_skia::Point::from_xy(start.x as f32, start.y as f32),
                    tiny_skia::Point::from_xy(end.x as f32, end.y as f32),
                    gradient_stops,
                    SpreadMode::Pad,
                    Transform::identity(),
                ) {
                    Some(shader) => shader,
                    // Degenerate axis: paint the first stop
                    None => match stops.first() {
                        Some((_, color)) => Shader::SolidColor(skia_color(*color)),
                        None => return,
                    },
                }
            }
            Paint::Pattern(image) => {
                tile = match image_pixmap(image) {
                    Some(tile) => tile,
                    None => return,
                };
                Pattern::new(
                    tile.as_ref(),
                    SpreadMode::Repeat,
                    FilterQuality::Nearest,
                    1.0,
                    Transform::identity(),
                )
            }
        };
        let paint = tiny_skia::Paint {
            shader,
            anti_alias: true,
            ..tiny_skia::Paint::default()
        };
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, self.transform, None);
    }

    fn stroke_path(&mut self, path: &BezPath, style: &StrokeStyle, color: Color) {
        if style.width <= 0.0 {
            return;
        }
        let Some(path) = skia_path(path) else {
            return;
        };
        let mut stroke = Stroke {
            width: style.width as f32,
            ..Stroke::default()
        };
        if let Some([on, off]) = style.dash {
            stroke.dash = StrokeDash::new(vec![on as f32, off as f32], 0.0);
        }
        let mut paint = tiny_skia::Paint::default();
        paint.set_color(skia_color(color));
        paint.anti_alias = true;
        self.pixmap
            .stroke_path(&path, &paint, &stroke, self.transform, None);
    }

    fn draw_image(&mut self, image: &DecodedImage, dest: Rect, opacity: f64) {
        if image.width == 0 || image.height == 0 || dest.width() <= 0.0 || dest.height() <= 0.0 {
            return;
        }
        let Some(source) = image_pixmap(image) else {
            log::warn!("Skipping malformed {}x{} image", image.width, image.height);
            return;
        };
        let placement = Transform::from_row(
            (dest.width() / image.width as f64) as f32,
            0.0,
            0.0,
            (dest.height() / image.height as f64) as f32,
            dest.x0 as f32,
            dest.y0 as f32,
        );
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0) as f32,
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            source.as_ref(),
            &paint,
            self.transform.pre_concat(placement),
            None,
        );
    }
}

fn skia_color(color: Color) -> tiny_skia::Color {
    let rgba = color.to_rgba8();
    tiny_skia::Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a)
}

fn skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

/// Convert a kurbo path; None for empty paths.
fn skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = tiny_skia::PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => {
                builder.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32)
            }
            PathEl::CurveTo(p1, p2, p3) => builder.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

/// Premultiply straight RGBA into a pixmap.
fn image_pixmap(image: &DecodedImage) -> Option<Pixmap> {
    let expected = image.width as usize * image.height as usize * 4;
    if image.pixels.len() != expected {
        return None;
    }
    let mut data = Vec::with_capacity(expected);
    for px in image.pixels.chunks_exact(4) {
        let alpha = px[3] as u16;
        let premultiply = |c: u8| ((c as u16 * alpha + 127) / 255) as u8;
        data.extend_from_slice(&[premultiply(px[0]), premultiply(px[1]), premultiply(px[2]), px[3]]);
    }
    Pixmap::from_vec(data, IntSize::from_wh(image.width, image.height)?)
}
