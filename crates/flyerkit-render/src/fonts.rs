//! Font collection, text layout and glyph outlines.
//!
//! Parley resolves families (including system fonts through fontique),
//! shapes the line and positions glyphs. The positioned glyph ids are then
//! outlined with ttf-parser into a canvas-space `BezPath`.

use crate::renderer::TextShaper;
use flyerkit_core::shapes::{ApproxTextMeasure, Text, TextMeasure};
use kurbo::{Affine, BezPath, Point};
use parley::fontique::{Collection, CollectionOptions, SourceCache};
use parley::layout::{Layout, PositionedLayoutItem};
use parley::{
    FontContext, FontFamily, FontStack, GenericFamily, LayoutContext, StyleProperty,
};
use peniko::{Blob, Brush};
use std::borrow::Cow;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Outline stroke width for synthetic bold, relative to font size.
const SYNTHETIC_BOLD_FACTOR: f64 = 0.04;

/// Font loading errors.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No usable font faces in {0}")]
    NoFaces(String),
}

/// Glyph outlines for one text object, in canvas coordinates.
#[derive(Debug, Clone)]
pub struct GlyphRun {
    pub path: BezPath,
    /// Extra stroke width for synthetic bold (0 for real bold faces).
    pub embolden: f64,
    /// Total advance width.
    pub width: f64,
}

struct Contexts {
    font_cx: FontContext,
    layout_cx: LayoutContext<Brush>,
    /// Faces registered from files or raw data.
    registered: usize,
}

/// Font collection plus a reusable layout context.
///
/// Clones share the same collection.
#[derive(Clone)]
pub struct FontBook {
    inner: Arc<Mutex<Contexts>>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("registered", &self.lock().registered)
            .finish()
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl FontBook {
    /// Collection backed by the platform's installed fonts.
    pub fn new() -> Self {
        Self::from_context(FontContext::new())
    }

    /// Collection that only knows fonts added with `load_file` or `add_font_data`.
    pub fn without_system_fonts() -> Self {
        Self::from_context(FontContext {
            collection: Collection::new(CollectionOptions {
                shared: false,
                system_fonts: false,
            }),
            source_cache: SourceCache::default(),
        })
    }

    fn from_context(font_cx: FontContext) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Contexts {
                font_cx,
                layout_cx: LayoutContext::new(),
                registered: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Contexts> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True when no family at all can be resolved.
    pub fn is_empty(&self) -> bool {
        self.lock().font_cx.collection.family_names().next().is_none()
    }

    /// Number of faces added from files or raw data.
    pub fn registered_faces(&self) -> usize {
        self.lock().registered
    }

    /// Every family name the collection can resolve, sorted.
    pub fn families(&self) -> Vec<String> {
        let mut families: Vec<String> = self
            .lock()
            .font_cx
            .collection
            .family_names()
            .map(str::to_string)
            .collect();
        families.sort();
        families.dedup();
        families
    }

    /// Register every face in a font file or collection.
    pub fn load_file(&self, path: &Path) -> Result<usize, FontError> {
        let data = std::fs::read(path)?;
        let count = self.add_font_data(data);
        if count == 0 {
            return Err(FontError::NoFaces(path.display().to_string()));
        }
        log::debug!("Loaded {} face(s) from {}", count, path.display());
        Ok(count)
    }

    /// Register faces from raw TrueType/OpenType data. Returns how many parsed.
    pub fn add_font_data(&self, data: Vec<u8>) -> usize {
        let mut contexts = self.lock();
        let families = contexts
            .font_cx
            .collection
            .register_fonts(Blob::new(Arc::new(data)), None);
        let count: usize = families.iter().map(|(_, faces)| faces.len()).sum();
        contexts.registered += count;
        count
    }

    /// Shape a single line with the family, weight, style and size of `text`.
    fn shape(contexts: &mut Contexts, text: &Text) -> Layout<Brush> {
        let Contexts {
            font_cx, layout_cx, ..
        } = contexts;
        let mut builder = layout_cx.ranged_builder(font_cx, &text.content, 1.0, false);
        builder.push_default(StyleProperty::FontSize(text.font_size as f32));
        builder.push_default(StyleProperty::FontWeight(if text.is_bold() {
            parley::FontWeight::BOLD
        } else {
            parley::FontWeight::NORMAL
        }));
        builder.push_default(StyleProperty::FontStyle(if text.is_italic() {
            parley::FontStyle::Italic
        } else {
            parley::FontStyle::Normal
        }));
        builder.push_default(StyleProperty::FontStack(FontStack::List(Cow::Owned(vec![
            FontFamily::Named(Cow::Borrowed(text.font_family.as_str())),
            FontFamily::Generic(GenericFamily::SansSerif),
        ]))));
        let mut layout = builder.build(&text.content);
        layout.break_all_lines(None);
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());
        layout
    }

    /// Lay out a single line and return its outlines, or None when no font
    /// produced any glyphs.
    fn layout(&self, text: &Text) -> Option<GlyphRun> {
        let mut contexts = self.lock();
        let layout = Self::shape(&mut contexts, text);

        // Outlines are collected relative to the first baseline and the line start
        let mut path = BezPath::new();
        let mut width = 0.0;
        let mut first_baseline = None;
        let mut embolden = false;
        let mut glyph_count = 0;
        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let baseline = *first_baseline.get_or_insert(glyph_run.baseline());
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline() - baseline;
                let run = glyph_run.run();
                let font = run.font();
                let Ok(face) = ttf_parser::Face::parse(font.data.as_ref(), font.index) else {
                    log::warn!("Cannot parse a face chosen by layout; glyphs skipped");
                    continue;
                };
                let scale = run.font_size() as f64 / face.units_per_em() as f64;
                let synthesis = run.synthesis();
                embolden |= synthesis.embolden();
                let skew = synthesis.skew();

                for glyph in glyph_run.glyphs() {
                    let origin = Point::new((x + glyph.x) as f64, (y - glyph.y) as f64);
                    x += glyph.advance;
                    let mut builder = GlyphBuilder {
                        path: &mut path,
                        transform: glyph_transform(origin, scale, skew),
                    };
                    face.outline_glyph(ttf_parser::GlyphId(glyph.id as u16), &mut builder);
                    glyph_count += 1;
                }
                width = f64::max(width, x as f64);
            }
        }
        if glyph_count == 0 {
            return None;
        }

        let x = text.align.start_x(text.position.x, width);
        path.apply_affine(Affine::translate((x, text.position.y)));
        Some(GlyphRun {
            path,
            embolden: if embolden {
                text.font_size * SYNTHETIC_BOLD_FACTOR
            } else {
                0.0
            },
            width,
        })
    }
}

impl TextMeasure for FontBook {
    fn advance_width(&self, text: &Text) -> f64 {
        if text.content.is_empty() || self.is_empty() {
            return ApproxTextMeasure.advance_width(text);
        }
        let mut contexts = self.lock();
        let layout = Self::shape(&mut contexts, text);
        let width = layout.full_width() as f64;
        if width > 0.0 {
            width
        } else {
            ApproxTextMeasure.advance_width(text)
        }
    }
}

impl TextShaper for FontBook {
    fn shape_text(&self, text: &Text) -> Option<GlyphRun> {
        if text.content.is_empty() || self.is_empty() {
            return None;
        }
        self.layout(text)
    }
}

/// Map font units (y up) to canvas space (y down) for one glyph at `origin`.
/// A synthetic italic `skew` (degrees) leans the glyph to the right.
fn glyph_transform(origin: Point, scale: f64, skew: Option<f32>) -> Affine {
    let shear = skew.map_or(0.0, |angle| (angle as f64).to_radians().tan());
    Affine::translate(origin.to_vec2())
        * Affine::skew(-shear, 0.0)
        * Affine::scale_non_uniform(scale, -scale)
}

/// Writes glyph outlines into a canvas path.
struct GlyphBuilder<'a> {
    path: &'a mut BezPath,
    transform: Affine,
}

impl GlyphBuilder<'_> {
    fn point(&self, x: f32, y: f32) -> Point {
        self.transform * Point::new(x as f64, y as f64)
    }
}

impl ttf_parser::OutlineBuilder for GlyphBuilder<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.path.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.path.line_to(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (p1, p) = (self.point(x1, y1), self.point(x, y));
        self.path.quad_to(p1, p);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (p1, p2, p) = (self.point(x1, y1), self.point(x2, y2), self.point(x, y));
        self.path.curve_to(p1, p2, p);
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}
