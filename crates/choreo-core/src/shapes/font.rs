//! Line rasterisation using swash
//!
//! Glyph outlines are rendered to alpha masks and max-composited onto one
//! bitmap per line. Font bytes come from the caller; loading them is not
//! this crate's job.

use swash::scale::{Render, ScaleContext, Source};
use swash::zeno::{Format, Vector};
use swash::FontRef;

use crate::error::{ChoreoError, Result};
use crate::shapes::text::{AlphaBitmap, TextRasterizer};

/// Transparent margin around each line so glyph overhang is not clipped.
const MARGIN: usize = 2;

pub struct FontRasterizer {
    data: Vec<u8>,
    index: usize,
    scale_context: ScaleContext,
}

impl FontRasterizer {
    /// Parse the first face in `data`.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_bytes_index(data, 0)
    }

    /// Parse face `index` of a font collection.
    pub fn from_bytes_index(data: Vec<u8>, index: usize) -> Result<Self> {
        if FontRef::from_index(&data, index).is_none() {
            return Err(ChoreoError::Font);
        }
        Ok(Self {
            data,
            index,
            scale_context: ScaleContext::new(),
        })
    }
}

impl TextRasterizer for FontRasterizer {
    fn rasterize_line(&mut self, text: &str, font_size: f32) -> Option<AlphaBitmap> {
        let font = FontRef::from_index(&self.data, self.index)?;
        let metrics = font.metrics(&[]).scale(font_size);
        let glyph_metrics = font.glyph_metrics(&[]).scale(font_size);
        let charmap = font.charmap();

        // Lay out on one baseline, left to right.
        let mut pen = 0.0_f32;
        let mut glyphs = Vec::with_capacity(text.len());
        for ch in text.chars() {
            let id = charmap.map(ch);
            glyphs.push((id, pen));
            pen += glyph_metrics.advance_width(id);
        }
        if pen <= 0.0 {
            return None;
        }

        let ascent = metrics.ascent.ceil();
        let height = (metrics.ascent + metrics.descent.abs()).ceil() as usize + MARGIN * 2;
        let width = pen.ceil() as usize + MARGIN * 2;
        let mut bitmap = AlphaBitmap::new(width, height);
        let baseline = MARGIN as i32 + ascent as i32;

        let mut scaler = self
            .scale_context
            .builder(font)
            .size(font_size)
            .hint(false)
            .build();

        for (id, x) in glyphs {
            let origin = x.floor();
            let image = Render::new(&[Source::Outline])
                .format(Format::Alpha)
                .offset(Vector::new(x - origin, 0.0))
                .render(&mut scaler, id);
            // Whitespace has no image; only its advance matters.
            let Some(image) = image else {
                continue;
            };
            let placement = image.placement;
            bitmap.blend_max(
                &image.data,
                placement.width as usize,
                placement.height as usize,
                MARGIN as i32 + origin as i32 + placement.left,
                baseline - placement.top,
            );
        }

        Some(bitmap)
    }
}
