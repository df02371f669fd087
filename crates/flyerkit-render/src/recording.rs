//! Surface that records draw calls instead of rasterizing them.

use crate::renderer::{Paint, StrokeStyle, Surface};
use flyerkit_core::shapes::DecodedImage;
use kurbo::{Affine, BezPath, Rect, Size};
use peniko::Color;

/// One recorded draw call.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Clear(Color),
    SetTransform(Affine),
    Fill {
        path: BezPath,
        paint: Paint,
    },
    Stroke {
        path: BezPath,
        style: StrokeStyle,
        color: Color,
    },
    Image {
        dest: Rect,
        opacity: f64,
        /// Source pixel size.
        size: (u32, u32),
    },
}

impl DrawCommand {
    pub fn name(&self) -> &'static str {
        match self {
            DrawCommand::Clear(_) => "clear",
            DrawCommand::SetTransform(_) => "transform",
            DrawCommand::Fill { .. } => "fill",
            DrawCommand::Stroke { .. } => "stroke",
            DrawCommand::Image { .. } => "image",
        }
    }
}

/// Command log with a fixed device size.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: Size,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn fill_count(&self) -> usize {
        self.count("fill")
    }

    pub fn stroke_count(&self) -> usize {
        self.count("stroke")
    }

    pub fn image_count(&self) -> usize {
        self.count("image")
    }

    fn count(&self, name: &str) -> usize {
        self.commands.iter().filter(|c| c.name() == name).count()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn set_transform(&mut self, transform: Affine) {
        self.commands.push(DrawCommand::SetTransform(transform));
    }

    fn fill_path(&mut self, path: &BezPath, paint: &Paint) {
        self.commands.push(DrawCommand::Fill {
            path: path.clone(),
            paint: paint.clone(),
        });
    }

    fn stroke_path(&mut self, path: &BezPath, style: &StrokeStyle, color: Color) {
        self.commands.push(DrawCommand::Stroke {
            path: path.clone(),
            style: *style,
            color,
        });
    }

    fn draw_image(&mut self, image: &DecodedImage, dest: Rect, opacity: f64) {
        self.commands.push(DrawCommand::Image {
            dest,
            opacity,
            size: (image.width, image.height),
        });
    }
}
