//! FlyerKit Render Library
//!
//! Render pipeline for FlyerKit scenes. Drawing goes through the [`Surface`]
//! trait; the default implementation rasterizes on the CPU with tiny-skia.

pub mod export;
pub mod fonts;
mod pixmap;
pub mod recording;
mod renderer;

pub use export::{encode_pdf, encode_png, ExportError, ExportFormat};
pub use fonts::{FontBook, FontError, GlyphRun};
pub use pixmap::PixmapSurface;
pub use recording::{DrawCommand, RecordingSurface};
pub use renderer::{
    render, Paint, RenderError, RenderOptions, RenderResult, StrokeStyle, Surface, TextShaper,
};

use flyerkit_core::scene::Scene;
use kurbo::Size;

/// Render a scene into a new pixmap sized `canvas * options.scale`.
pub fn render_to_pixmap<T: TextShaper>(
    scene: &Scene,
    canvas: Size,
    options: &RenderOptions,
    shaper: &T,
) -> RenderResult<PixmapSurface> {
    let mut surface = PixmapSurface::for_canvas(canvas, options.scale)?;
    render(scene, &mut surface, options, shaper);
    Ok(surface)
}
