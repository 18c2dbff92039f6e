//! Text glyph sampling.
//!
//! A [`TextRasterizer`] turns one line of text into an 8-bit alpha bitmap;
//! the sampler scans that bitmap on a fixed pixel stride and maps every
//! opaque-enough pixel to one world-space particle.

use std::ops::Range;

use glam::Vec3;
use rand::Rng;
use tracing::warn;

use crate::config::TextConfig;

/// Grayscale coverage bitmap, row-major, `y` growing downward.
#[derive(Clone, Debug, Default)]
pub struct AlphaBitmap {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl AlphaBitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn alpha(&self, x: usize, y: usize) -> u8 {
        self.data.get(y * self.width + x).copied().unwrap_or(0)
    }

    /// Max-composite `src` with its top-left corner at `(x, y)`, clipping.
    pub fn blend_max(&mut self, src: &[u8], src_width: usize, src_height: usize, x: i32, y: i32) {
        for sy in 0..src_height {
            let dy = y + sy as i32;
            if dy < 0 || dy as usize >= self.height {
                continue;
            }
            for sx in 0..src_width {
                let dx = x + sx as i32;
                if dx < 0 || dx as usize >= self.width {
                    continue;
                }
                let Some(&a) = src.get(sy * src_width + sx) else {
                    continue;
                };
                let dst = &mut self.data[dy as usize * self.width + dx as usize];
                *dst = (*dst).max(a);
            }
        }
    }
}

/// Rasterises one line of text. Returns `None` when it cannot (no font,
/// unsupported glyphs); callers treat that as an empty shape.
pub trait TextRasterizer {
    fn rasterize_line(&mut self, text: &str, font_size: f32) -> Option<AlphaBitmap>;
}

/// Pixel coordinates of every `density`-th pixel whose alpha exceeds
/// `threshold`.
pub fn sample_bitmap(bitmap: &AlphaBitmap, density: u32, threshold: u8) -> Vec<(f32, f32)> {
    let stride = density.max(1) as usize;
    let mut out = Vec::new();
    for y in (0..bitmap.height).step_by(stride) {
        for x in (0..bitmap.width).step_by(stride) {
            if bitmap.alpha(x, y) > threshold {
                out.push((x as f32, y as f32));
            }
        }
    }
    out
}

/// Sampled text, with the world scale that was applied and the index range
/// of each line's particles.
#[derive(Clone, Debug, Default)]
pub struct TextShape {
    pub positions: Vec<Vec3>,
    /// World units per bitmap pixel, shared by all lines.
    pub scale: f32,
    pub line_ranges: Vec<Range<usize>>,
}

impl TextShape {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Sample a single line, scaled so the bitmap spans `config.world_width`.
pub fn sample_text<R: Rng>(
    rasterizer: &mut dyn TextRasterizer,
    text: &str,
    config: &TextConfig,
    rng: &mut R,
) -> TextShape {
    sample_text_lines(rasterizer, &[text], config, rng)
}

/// Sample several lines at one global scale.
///
/// The widest line spans `config.world_width`; every other line keeps the
/// same pixel-to-world scale so glyphs match across lines. Lines are
/// `font_size × line_spacing` apart and centered as a block on
/// `config.y_offset`.
pub fn sample_text_lines<R: Rng, S: AsRef<str>>(
    rasterizer: &mut dyn TextRasterizer,
    lines: &[S],
    config: &TextConfig,
    rng: &mut R,
) -> TextShape {
    let bitmaps: Vec<Option<AlphaBitmap>> = lines
        .iter()
        .map(|line| {
            let line = line.as_ref();
            if line.trim().is_empty() {
                None
            } else {
                rasterizer
                    .rasterize_line(line, config.font_size)
                    .filter(|b| !b.is_empty())
            }
        })
        .collect();

    let widest = bitmaps
        .iter()
        .flatten()
        .map(|b| b.width)
        .max()
        .unwrap_or(0);
    if widest == 0 {
        warn!(lines = lines.len(), "text produced no bitmap, shape is empty");
        return TextShape::default();
    }

    let scale = config.world_width / widest as f32;
    let pitch = config.font_size * config.line_spacing * scale;
    let block = pitch * (lines.len() as f32 - 1.0);
    let top = config.y_offset + block * 0.5;

    let mut positions = Vec::new();
    let mut line_ranges = Vec::with_capacity(lines.len());
    for (i, bitmap) in bitmaps.iter().enumerate() {
        let begin = positions.len();
        if let Some(bitmap) = bitmap {
            let center_y = top - pitch * i as f32;
            let half_w = bitmap.width as f32 * 0.5;
            let half_h = bitmap.height as f32 * 0.5;
            for (px, py) in sample_bitmap(bitmap, config.density, config.alpha_threshold) {
                let z = (rng.gen::<f32>() - 0.5) * config.depth;
                positions.push(Vec3::new(
                    (px - half_w) * scale,
                    center_y + (half_h - py) * scale,
                    z,
                ));
            }
        }
        line_ranges.push(begin..positions.len());
    }

    if positions.is_empty() {
        warn!(lines = lines.len(), "text sampled zero pixels above threshold");
    }

    TextShape {
        positions,
        scale,
        line_ranges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_bitmap_threshold_and_stride() {
        let mut bitmap = AlphaBitmap::new(8, 8);
        for a in bitmap.data.iter_mut() {
            *a = 255;
        }
        // exactly at threshold is not sampled
        bitmap.data[0] = 128;
        let samples = sample_bitmap(&bitmap, 2, 128);
        assert_eq!(samples.len(), 15);
        assert!(!samples.contains(&(0.0, 0.0)));
    }

    #[test]
    fn test_blend_max_clips() {
        let mut bitmap = AlphaBitmap::new(4, 4);
        bitmap.blend_max(&[200; 9], 3, 3, 2, -1);
        assert_eq!(bitmap.alpha(3, 0), 200);
        assert_eq!(bitmap.alpha(1, 0), 0);
        assert_eq!(bitmap.alpha(3, 2), 0);
    }
}
