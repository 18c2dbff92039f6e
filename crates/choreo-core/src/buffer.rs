//! Attribute buffer builder.
//!
//! Folds one or two generator outputs into a [`ParticleField`] sized to the
//! largest shape. Generators hand over fresh `Vec`s; the builder only reads
//! them, so successive generations never alias a live field.

use std::borrow::Cow;

use glam::Vec3;
use rand::Rng;
use tracing::warn;

use crate::config::Palette;
use crate::particle::{ParticleField, ParticleKind};
use crate::shapes::scatter::box_point;

/// Default spread of padding around the point it shadows.
pub const PADDING_JITTER: f32 = 0.05;

pub struct FieldBuilder<'a> {
    start: &'a [Vec3],
    end: &'a [Vec3],
    spiral: Option<&'a [f32]>,
    min_count: usize,
    fixed_count: Option<usize>,
    padding_jitter: f32,
    fallback_extent: Vec3,
}

impl Default for FieldBuilder<'_> {
    fn default() -> Self {
        Self {
            start: &[],
            end: &[],
            spiral: None,
            min_count: 0,
            fixed_count: None,
            padding_jitter: PADDING_JITTER,
            fallback_extent: Vec3::splat(4.0),
        }
    }
}

impl<'a> FieldBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shape the field starts in. Its particles are the active ones.
    pub fn start(mut self, points: &'a [Vec3]) -> Self {
        self.start = points;
        self
    }

    /// The shape the field blends toward.
    pub fn end(mut self, points: &'a [Vec3]) -> Self {
        self.end = points;
        self
    }

    /// Spiral parameters, index-aligned with `start`.
    pub fn spiral(mut self, params: &'a [f32]) -> Self {
        self.spiral = Some(params);
        self
    }

    /// Allocate at least this many particles even if both shapes are smaller.
    pub fn min_count(mut self, count: usize) -> Self {
        self.min_count = count;
        self
    }

    /// Allocate exactly this many, subsampling shapes that overflow it.
    pub fn fixed_count(mut self, count: usize) -> Self {
        self.fixed_count = Some(count);
        self
    }

    pub fn padding_jitter(mut self, jitter: f32) -> Self {
        self.padding_jitter = jitter;
        self
    }

    /// Box used to place padding when neither shape has any points.
    pub fn fallback_extent(mut self, extent: Vec3) -> Self {
        self.fallback_extent = extent;
        self
    }

    /// Number of particles `build` will allocate.
    pub fn count(&self) -> usize {
        match self.fixed_count {
            Some(n) => n,
            None => self.start.len().max(self.end.len()).max(self.min_count),
        }
    }

    pub fn build<R: Rng>(self, palette: &Palette, rng: &mut R) -> ParticleField {
        let count = self.count();
        let start = fit(self.start, count, "start");
        let end = fit(self.end, count, "end");
        let spiral = self.spiral.map(|s| fit_scalar(s, count));

        let mut field = ParticleField::zeroed(count);
        let jitter = self.padding_jitter;
        let wobble = |rng: &mut R| {
            Vec3::new(
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
            ) * jitter
        };

        for i in 0..count {
            // Padding sits inside whichever cloud it will end up in, so it
            // never reads as a pop-in when the shader fades it up.
            let target = if i < end.len() {
                end[i]
            } else if !end.is_empty() {
                end[i % end.len()] + wobble(rng)
            } else if i < start.len() {
                start[i]
            } else if !start.is_empty() {
                start[i % start.len()] + wobble(rng)
            } else {
                box_point(Vec3::ZERO, self.fallback_extent, rng)
            };

            let (origin, kind) = if i < start.len() {
                (start[i], ParticleKind::Active)
            } else {
                (target + wobble(rng), ParticleKind::Padding)
            };

            let seed: f32 = rng.gen();
            field.position_start[i] = origin;
            field.position_end[i] = target;
            field.kind[i] = kind;
            field.random_seed[i] = seed;
            field.spiral[i] = spiral
                .as_ref()
                .and_then(|s| s.get(i).copied())
                .unwrap_or(0.0);
            field.size[i] =
                1.0 - palette.size_variance * 0.5 + rng.gen::<f32>() * palette.size_variance;
            field.color[i] = palette.color_for(seed);
        }

        field
    }
}

/// Swap a live field's start shape in place.
///
/// Seeds, sizes, colours and end positions are left alone. Slots past the
/// new shape become padding; those that were active until now are moved next
/// to their end position, existing padding keeps its place.
pub fn refill_start<R: Rng>(field: &mut ParticleField, points: &[Vec3], jitter: f32, rng: &mut R) {
    let count = field.count();
    let start = fit(points, count, "start");
    for i in 0..count {
        if let Some(p) = start.get(i) {
            field.position_start[i] = *p;
            field.kind[i] = ParticleKind::Active;
        } else if field.kind[i] == ParticleKind::Active {
            let wobble = Vec3::new(
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
            ) * jitter;
            field.position_start[i] = field.position_end[i] + wobble;
            field.kind[i] = ParticleKind::Padding;
        }
    }
}

/// Borrow `points` if it fits in `count`, otherwise subsample evenly.
fn fit<'p>(points: &'p [Vec3], count: usize, label: &str) -> Cow<'p, [Vec3]> {
    if points.len() <= count {
        return Cow::Borrowed(points);
    }
    warn!(
        shape = label,
        samples = points.len(),
        count,
        "shape exceeds field capacity, subsampling"
    );
    Cow::Owned(
        (0..count)
            .map(|i| points[i * points.len() / count])
            .collect(),
    )
}

fn fit_scalar(values: &[f32], count: usize) -> Vec<f32> {
    if values.len() <= count {
        return values.to_vec();
    }
    (0..count).map(|i| values[i * values.len() / count]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn line(n: usize) -> Vec<Vec3> {
        (0..n).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_count_is_max_of_shapes() {
        let a = line(10);
        let b = line(25);
        let builder = FieldBuilder::new().start(&a).end(&b);
        assert_eq!(builder.count(), 25);
        let builder = FieldBuilder::new().start(&b).end(&a).min_count(40);
        assert_eq!(builder.count(), 40);
    }

    #[test]
    fn test_fixed_count_subsamples() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = line(100);
        let field = FieldBuilder::new()
            .start(&a)
            .end(&a)
            .fixed_count(10)
            .build(&Palette::default(), &mut rng);
        assert_eq!(field.count(), 10);
        assert_eq!(field.active_count(), 10);
        assert_eq!(field.position_start()[1], Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_padding_starts_near_target() {
        let mut rng = StdRng::seed_from_u64(2);
        let a = line(4);
        let b: Vec<Vec3> = (0..20).map(|i| Vec3::new(0.0, i as f32, 0.0)).collect();
        let field = FieldBuilder::new()
            .start(&a)
            .end(&b)
            .padding_jitter(0.1)
            .build(&Palette::default(), &mut rng);
        for i in 4..20 {
            assert_eq!(field.kind()[i], ParticleKind::Padding);
            let d = field.position_start()[i].distance(field.position_end()[i]);
            assert!(d <= 0.1 * 3.0_f32.sqrt() + 1e-5, "padding {} too far from target: {}", i, d);
        }
    }

    #[test]
    fn test_empty_shapes_still_fill_capacity() {
        let mut rng = StdRng::seed_from_u64(3);
        let field = FieldBuilder::new()
            .min_count(32)
            .fallback_extent(Vec3::splat(2.0))
            .build(&Palette::default(), &mut rng);
        assert_eq!(field.count(), 32);
        assert_eq!(field.active_count(), 0);
        for p in field.position_end() {
            assert!(p.abs().max_element() <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn test_seeds_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(4);
        let a = line(500);
        let field = FieldBuilder::new().start(&a).build(&Palette::default(), &mut rng);
        assert!(field.random_seed().iter().all(|s| (0.0..1.0).contains(s)));
    }

    #[test]
    fn test_refill_start_keeps_particle_identity() {
        let mut rng = StdRng::seed_from_u64(5);
        let a = line(6);
        let b: Vec<Vec3> = (0..12).map(|i| Vec3::new(0.0, i as f32, 0.0)).collect();
        let mut field = FieldBuilder::new()
            .start(&a)
            .end(&b)
            .build(&Palette::default(), &mut rng);
        let before = field.clone();

        let shorter = line(3);
        refill_start(&mut field, &shorter, 0.1, &mut rng);
        assert_eq!(field.random_seed(), before.random_seed());
        assert_eq!(field.size(), before.size());
        assert_eq!(field.color(), before.color());
        assert_eq!(field.position_end(), before.position_end());
        assert_eq!(field.active_count(), 3);
        // old padding untouched, freshly released slots hug their target
        assert_eq!(&field.position_start()[6..], &before.position_start()[6..]);
        for i in 3..6 {
            assert_eq!(field.kind()[i], ParticleKind::Padding);
            assert!(field.position_start()[i].distance(field.position_end()[i]) <= 0.2);
        }

        let longer = line(40);
        refill_start(&mut field, &longer, 0.1, &mut rng);
        assert_eq!(field.count(), 12);
        assert_eq!(field.active_count(), 12);
        assert_eq!(field.random_seed(), before.random_seed());
    }
}
