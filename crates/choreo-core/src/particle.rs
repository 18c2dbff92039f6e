use glam::Vec3;

use crate::config::Palette;

/// Discriminates real shape particles from the filler that keeps `count`
/// constant across shape changes.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ParticleKind {
    Active = 0,
    Padding = 1,
}

/// SoA particle storage for one choreography instance.
///
/// `count` is fixed at construction. Arrays are only reachable through
/// slices or in-place edits inside the crate, so nothing can resize a field
/// after it has been handed to the renderer.
#[derive(Clone, Debug)]
pub struct ParticleField {
    count: usize,
    pub(crate) position_start: Vec<Vec3>,
    pub(crate) position_end: Vec<Vec3>,
    /// Stable per-particle seed in [0,1)
    pub(crate) random_seed: Vec<f32>,
    /// Position along the halo helix in [0,1]; unused by non-spiral shapes
    pub(crate) spiral: Vec<f32>,
    /// Size multiplier around 1.0
    pub(crate) size: Vec<f32>,
    pub(crate) color: Vec<Vec3>,
    pub(crate) kind: Vec<ParticleKind>,
}

impl ParticleField {
    /// An all-padding field at the origin. Builders overwrite every array.
    pub(crate) fn zeroed(count: usize) -> Self {
        Self {
            count,
            position_start: vec![Vec3::ZERO; count],
            position_end: vec![Vec3::ZERO; count],
            random_seed: vec![0.0; count],
            spiral: vec![0.0; count],
            size: vec![1.0; count],
            color: vec![Vec3::ONE; count],
            kind: vec![ParticleKind::Padding; count],
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn position_start(&self) -> &[Vec3] {
        &self.position_start
    }

    pub fn position_end(&self) -> &[Vec3] {
        &self.position_end
    }

    pub fn random_seed(&self) -> &[f32] {
        &self.random_seed
    }

    pub fn spiral(&self) -> &[f32] {
        &self.spiral
    }

    pub fn size(&self) -> &[f32] {
        &self.size
    }

    pub fn color(&self) -> &[Vec3] {
        &self.color
    }

    pub fn kind(&self) -> &[ParticleKind] {
        &self.kind
    }

    pub fn active_count(&self) -> usize {
        self.kind.iter().filter(|k| **k == ParticleKind::Active).count()
    }

    /// Regenerate colors wholesale from the stable seeds.
    pub fn recolor(&mut self, palette: &Palette) {
        for (color, seed) in self.color.iter_mut().zip(self.random_seed.iter()) {
            *color = palette.color_for(*seed);
        }
    }
}
