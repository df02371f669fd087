//! Render pipeline over an abstract drawing surface.

use crate::fonts::GlyphRun;
use flyerkit_core::background::{pattern_tile, Background, CHECKER_TILE};
use flyerkit_core::scene::Scene;
use flyerkit_core::selection::{resize_handles, HANDLE_SIZE};
use flyerkit_core::shapes::{
    ApproxTextMeasure, DecodedImage, Image, ObjectTrait, SceneObject, Text, TextMeasure,
};
use flyerkit_core::EditorConfig;
use kurbo::{Affine, BezPath, Line, Point, Rect, Shape, Size};
use peniko::Color;
use std::sync::Arc;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cannot allocate a {width}x{height} surface")]
    SurfaceAllocation { width: u32, height: u32 },
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Width of the dashed selection outline.
pub const SELECTION_STROKE_WIDTH: f64 = 2.0;
/// Dash and gap length of the selection outline.
pub const SELECTION_DASH: [f64; 2] = [5.0, 5.0];

/// How a path is filled.
#[derive(Debug, Clone)]
pub enum Paint {
    Solid(Color),
    /// Linear gradient between two canvas points; stops are `(offset, color)`.
    LinearGradient {
        start: Point,
        end: Point,
        stops: Vec<(f64, Color)>,
    },
    /// Repeating image tile anchored at the canvas origin.
    Pattern(Arc<DecodedImage>),
}

/// Stroke parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    /// Dash and gap lengths, or None for a solid line.
    pub dash: Option<[f64; 2]>,
}

impl StrokeStyle {
    pub fn new(width: f64) -> Self {
        Self { width, dash: None }
    }

    pub fn with_dash(mut self, on: f64, off: f64) -> Self {
        self.dash = Some([on, off]);
        self
    }
}

/// Drawing backend the pipeline paints onto. Paths are in canvas coordinates
/// and pass through the current transform.
pub trait Surface {
    /// Size in device pixels.
    fn size(&self) -> Size;

    /// Reset every pixel to `color`, ignoring the transform.
    fn clear(&mut self, color: Color);

    /// Set the canvas-to-device transform for later draw calls.
    fn set_transform(&mut self, transform: Affine);

    fn fill_path(&mut self, path: &BezPath, paint: &Paint);

    fn stroke_path(&mut self, path: &BezPath, style: &StrokeStyle, color: Color);

    /// Draw an image scaled into `dest`.
    fn draw_image(&mut self, image: &DecodedImage, dest: Rect, opacity: f64);
}

/// Source of text metrics and glyph outlines.
pub trait TextShaper: TextMeasure {
    /// Glyph outlines for a text object, positioned on the canvas.
    /// None when no font can draw the text.
    fn shape_text(&self, text: &Text) -> Option<GlyphRun>;
}

impl TextShaper for ApproxTextMeasure {
    fn shape_text(&self, _text: &Text) -> Option<GlyphRun> {
        None
    }
}

/// Options for a single render pass.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Device pixels per canvas unit.
    pub scale: f64,
    /// Draw the selection outline and handles.
    pub show_selection: bool,
    /// Selection highlight color.
    pub selection_color: Color,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            show_selection: true,
            selection_color: Color::from_rgba8(0x66, 0x7e, 0xea, 255),
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with the configured selection color.
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            selection_color: config.selection_color.into(),
            ..Self::default()
        }
    }

    /// Set the output pixel ratio.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Toggle the selection overlay.
    pub fn with_selection(mut self, show: bool) -> Self {
        self.show_selection = show;
        self
    }

    /// Set the selection highlight color.
    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }
}

/// Paint the whole scene onto `surface`.
///
/// Order: clear, background, objects back to front, then the selection
/// overlay. The scene is only read.
pub fn render<T: TextShaper>(
    scene: &Scene,
    surface: &mut dyn Surface,
    options: &RenderOptions,
    shaper: &T,
) {
    let scale = if options.scale > 0.0 { options.scale } else { 1.0 };
    let device = surface.size();
    let canvas = Size::new(device.width / scale, device.height / scale);

    surface.clear(Color::TRANSPARENT);
    surface.set_transform(Affine::scale(scale));

    render_background(surface, &scene.background, canvas);

    for object in scene.iter() {
        render_object(surface, object, shaper);
    }

    if options.show_selection {
        if let Some(selected) = scene.selected_object() {
            render_selection(surface, selected, options.selection_color, shaper);
        }
    }
}

fn render_background(surface: &mut dyn Surface, background: &Background, canvas: Size) {
    let area = canvas.to_rect().to_path(0.1);
    let paint = match background {
        Background::Solid(color) => Paint::Solid((*color).into()),
        Background::Gradient { stops, axis } => match stops.as_slice() {
            [] => return,
            [only] => Paint::Solid(only.color.into()),
            _ => {
                let (start, end) = axis.resolve(canvas);
                Paint::LinearGradient {
                    start,
                    end,
                    stops: stops.iter().map(|s| (s.offset, s.color.into())).collect(),
                }
            }
        },
        Background::Pattern { tile_ref } => {
            let tile = pattern_tile(tile_ref).or_else(|| {
                log::warn!("Unknown pattern '{}', using {}", tile_ref, CHECKER_TILE);
                pattern_tile(CHECKER_TILE)
            });
            match tile {
                Some(tile) => Paint::Pattern(Arc::new(tile)),
                None => return,
            }
        }
    };
    surface.fill_path(&area, &paint);
}

fn render_object<T: TextShaper>(surface: &mut dyn Surface, object: &SceneObject, shaper: &T) {
    match object {
        SceneObject::Text(text) => render_text(surface, text, shaper),
        SceneObject::Image(image) => render_image(surface, image),
        shape => {
            let path = shape.to_path(shaper);
            let style = shape.style();
            if let Some(fill) = style.fill_with_opacity() {
                surface.fill_path(&path, &Paint::Solid(fill));
            }
            if let Some(stroke) = style.stroke_with_opacity() {
                surface.stroke_path(&path, &StrokeStyle::new(style.stroke_width), stroke);
            }
        }
    }
}

fn render_text<T: TextShaper>(surface: &mut dyn Surface, text: &Text, shaper: &T) {
    let Some(color) = text.style.fill_with_opacity() else {
        return;
    };

    match shaper.shape_text(text) {
        Some(run) => {
            surface.fill_path(&run.path, &Paint::Solid(color));
            if run.embolden > 0.0 {
                surface.stroke_path(&run.path, &StrokeStyle::new(run.embolden), color);
            }
        }
        None => log::debug!("No font for '{}', text skipped", text.font_string()),
    }

    if text.underline {
        let width = shaper.advance_width(text);
        let x0 = text.align.start_x(text.position.x, width);
        let y = text.position.y + 2.0;
        let line = Line::new(Point::new(x0, y), Point::new(x0 + width, y));
        let thickness = (text.font_size / 20.0).max(1.0);
        surface.stroke_path(&line.to_path(0.1), &StrokeStyle::new(thickness), color);
    }
}

fn render_image(surface: &mut dyn Surface, image: &Image) {
    // Pending and failed images paint nothing
    if let Some(pixels) = image.pixels() {
        surface.draw_image(pixels, image.as_rect(), image.style.opacity);
    }
}

fn render_selection<T: TextShaper>(
    surface: &mut dyn Surface,
    object: &SceneObject,
    color: Color,
    shaper: &T,
) {
    let outline = StrokeStyle::new(SELECTION_STROKE_WIDTH)
        .with_dash(SELECTION_DASH[0], SELECTION_DASH[1]);
    surface.stroke_path(&object.to_path(shaper), &outline, color);

    let half = HANDLE_SIZE / 2.0;
    for handle in resize_handles(object) {
        let p = handle.position;
        let square = Rect::new(p.x - half, p.y - half, p.x + half, p.y + half);
        surface.fill_path(&square.to_path(0.1), &Paint::Solid(color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DrawCommand, RecordingSurface};
    use flyerkit_core::background::{ColorStop, GradientAxis};
    use flyerkit_core::shapes::{Circle, Rectangle, Rgba, Triangle};

    fn surface() -> RecordingSurface {
        RecordingSurface::new(Size::new(800.0, 600.0))
    }

    #[test]
    fn test_empty_scene_paints_background_only() {
        let scene = Scene::new();
        let mut surface = surface();
        render(&scene, &mut surface, &RenderOptions::default(), &ApproxTextMeasure);

        assert!(matches!(surface.commands()[0], DrawCommand::Clear(_)));
        assert_eq!(surface.fill_count(), 1);
        assert_eq!(surface.stroke_count(), 0);
    }

    #[test]
    fn test_fill_then_stroke_in_scene_order() {
        let mut scene = Scene::new();
        scene.add(SceneObject::Rect(Rectangle::default()));
        scene.add(SceneObject::Circle(Circle::default()));
        scene.select(None);

        let mut surface = surface();
        render(&scene, &mut surface, &RenderOptions::default(), &ApproxTextMeasure);

        let kinds: Vec<&str> = surface.commands().iter().map(DrawCommand::name).collect();
        assert_eq!(
            kinds,
            vec!["clear", "transform", "fill", "fill", "stroke", "fill", "stroke"]
        );
    }

    #[test]
    fn test_zero_stroke_width_skips_stroke() {
        let mut scene = Scene::new();
        let mut rect = Rectangle::default();
        rect.style.stroke_width = 0.0;
        scene.add(SceneObject::Rect(rect));

        let mut surface = surface();
        let options = RenderOptions::default().with_selection(false);
        render(&scene, &mut surface, &options, &ApproxTextMeasure);
        assert_eq!(surface.stroke_count(), 0);
    }

    #[test]
    fn test_opacity_applied_to_colors() {
        let mut scene = Scene::new();
        let mut triangle = Triangle::default();
        triangle.style.opacity = 0.5;
        scene.add(SceneObject::Triangle(triangle));

        let mut surface = surface();
        render(&scene, &mut surface, &RenderOptions::new().with_selection(false), &ApproxTextMeasure);
        let fill = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Fill {
                    paint: Paint::Solid(color),
                    ..
                } => Some(Rgba::from(*color)),
                _ => None,
            })
            .last()
            .unwrap();
        assert_eq!(fill.a, 128);
    }

    #[test]
    fn test_selection_overlay() {
        let mut scene = Scene::new();
        scene.add(SceneObject::Rect(Rectangle::default()));

        let mut surface = surface();
        render(&scene, &mut surface, &RenderOptions::default(), &ApproxTextMeasure);

        let dashed: Vec<_> = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Stroke { style, .. } if style.dash == Some([5.0, 5.0])))
            .collect();
        assert_eq!(dashed.len(), 1);
        // Background, rect fill, four handle squares
        assert_eq!(surface.fill_count(), 6);
    }

    #[test]
    fn test_selection_hidden_when_disabled() {
        let mut scene = Scene::new();
        scene.add(SceneObject::Circle(Circle::default()));
        let mut surface = surface();
        render(&scene, &mut surface, &RenderOptions::new().with_selection(false), &ApproxTextMeasure);
        assert_eq!(surface.fill_count(), 2);
        assert_eq!(surface.stroke_count(), 1);
    }

    #[test]
    fn test_gradient_background_axis() {
        let mut scene = Scene::new();
        scene.set_background(Background::gradient(
            vec![
                ColorStop::new(0.0, Rgba::white()),
                ColorStop::new(1.0, Rgba::black()),
            ],
            GradientAxis::Vertical,
        ));
        let mut surface = surface();
        render(&scene, &mut surface, &RenderOptions::default(), &ApproxTextMeasure);

        let DrawCommand::Fill {
            paint: Paint::LinearGradient { start, end, stops },
            ..
        } = &surface.commands()[2]
        else {
            panic!("expected gradient fill, got {:?}", surface.commands()[2]);
        };
        assert_eq!(*start, Point::ZERO);
        assert_eq!(*end, Point::new(0.0, 600.0));
        assert_eq!(stops.len(), 2);
    }

    #[test]
    fn test_scale_sets_transform_and_canvas_size() {
        let mut scene = Scene::new();
        scene.set_background(Background::gradient(
            vec![
                ColorStop::new(0.0, Rgba::white()),
                ColorStop::new(1.0, Rgba::black()),
            ],
            GradientAxis::Diagonal,
        ));
        let mut surface = RecordingSurface::new(Size::new(1600.0, 1200.0));
        render(&scene, &mut surface, &RenderOptions::new().with_scale(2.0), &ApproxTextMeasure);

        assert!(matches!(
            surface.commands()[1],
            DrawCommand::SetTransform(t) if t == Affine::scale(2.0)
        ));
        let DrawCommand::Fill {
            paint: Paint::LinearGradient { end, .. },
            ..
        } = &surface.commands()[2]
        else {
            panic!("expected gradient fill");
        };
        assert_eq!(*end, Point::new(800.0, 600.0));
    }

    #[test]
    fn test_unknown_pattern_uses_checker() {
        let mut scene = Scene::new();
        scene.set_background(Background::pattern("bricks"));
        let mut surface = surface();
        render(&scene, &mut surface, &RenderOptions::default(), &ApproxTextMeasure);
        assert!(matches!(
            &surface.commands()[2],
            DrawCommand::Fill { paint: Paint::Pattern(tile), .. } if tile.width == 20
        ));
    }

    #[test]
    fn test_pending_image_paints_nothing() {
        let mut scene = Scene::new();
        scene.add(SceneObject::Image(Image::new(
            Point::new(0.0, 0.0),
            10.0,
            10.0,
            "logo.png",
        )));
        let mut surface = surface();
        render(&scene, &mut surface, &RenderOptions::new().with_selection(false), &ApproxTextMeasure);
        assert_eq!(surface.image_count(), 0);
    }

    #[test]
    fn test_ready_image_is_drawn() {
        let decoded = Arc::new(DecodedImage::new(1, 1, vec![0, 0, 255, 255]));
        let mut scene = Scene::new();
        scene.add(SceneObject::Image(Image::from_decoded("logo.png", decoded)));
        let mut surface = surface();
        render(&scene, &mut surface, &RenderOptions::new().with_selection(false), &ApproxTextMeasure);
        assert_eq!(surface.image_count(), 1);
    }

    #[test]
    fn test_underline_without_font() {
        let mut scene = Scene::new();
        let mut text = Text::new(Point::new(10.0, 50.0), "Sale", 40.0);
        text.underline = true;
        scene.add(SceneObject::Text(text));

        let mut surface = surface();
        render(&scene, &mut surface, &RenderOptions::new().with_selection(false), &ApproxTextMeasure);
        let Some(DrawCommand::Stroke { style, .. }) = surface.commands().last() else {
            panic!("expected underline stroke");
        };
        assert!((style.width - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_options_from_config() {
        let mut config = EditorConfig::default();
        config.selection_color = Rgba::from_hex(0xff0000);
        let options = RenderOptions::from_config(&config);
        assert_eq!(Rgba::from(options.selection_color), Rgba::from_hex(0xff0000));
        assert!((options.scale - 1.0).abs() < f64::EPSILON);
    }
}
