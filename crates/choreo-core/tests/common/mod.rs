#![allow(dead_code)]

use choreo_core::shapes::text::{AlphaBitmap, TextRasterizer};
use choreo_core::ChoreoConfig;

/// Renders every non-space character as a solid block, so sample counts are
/// predictable without a font file.
pub struct BlockGlyphs;

impl BlockGlyphs {
    pub fn glyph_width(font_size: f32) -> usize {
        (font_size * 0.5).round().max(1.0) as usize
    }

    pub fn gap(font_size: f32) -> usize {
        (font_size * 0.1).round().max(1.0) as usize
    }
}

impl TextRasterizer for BlockGlyphs {
    fn rasterize_line(&mut self, text: &str, font_size: f32) -> Option<AlphaBitmap> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return None;
        }
        let glyph = Self::glyph_width(font_size);
        let gap = Self::gap(font_size);
        let height = font_size.round().max(1.0) as usize;
        let mut bitmap = AlphaBitmap::new(chars.len() * (glyph + gap), height);
        let block = vec![255u8; glyph * height];
        for (i, ch) in chars.iter().enumerate() {
            if !ch.is_whitespace() {
                bitmap.blend_max(&block, glyph, height, (i * (glyph + gap)) as i32, 0);
            }
        }
        Some(bitmap)
    }
}

/// Rasterizer that never produces anything, as when no font is available.
pub struct NoFont;

impl TextRasterizer for NoFont {
    fn rasterize_line(&mut self, _text: &str, _font_size: f32) -> Option<AlphaBitmap> {
        None
    }
}

/// Default config with budgets small enough for fast tests.
pub fn small_config() -> ChoreoConfig {
    let mut config = ChoreoConfig::default();
    config.budget.tree = 600;
    config.budget.halo = 120;
    config.budget.snow = 80;
    config.budget.celebration_min = 200;
    config.text.font_size = 24.0;
    config.text.density = 2;
    config
}
