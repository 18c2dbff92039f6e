//! Layered-cone tree silhouette.
//!
//! [`cone_envelope`] and [`layered_cone_radius`] are the only definitions of
//! the tree profile. The halo and the explosion stagger call them instead of
//! re-deriving the radius.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::config::TreeConfig;

/// Smooth cone radius at normalised height `h` (0 = base, 1 = apex).
pub fn cone_envelope(h: f32, base_radius: f32) -> f32 {
    base_radius * (1.0 - h.clamp(0.0, 1.0))
}

/// Radius of the tier surface at normalised height `h`.
///
/// The height range is split into `tree.layers` tiers. Each tier starts at
/// the cone envelope and tapers toward `tier_taper` of the envelope at its
/// top with a `tier_curve` power falloff, so consecutive tiers read as
/// stacked branch rings rather than one smooth cone.
pub fn layered_cone_radius(h: f32, tree: &TreeConfig) -> f32 {
    let h = h.clamp(0.0, 1.0);
    let layers = tree.layers.max(1) as f32;
    let scaled = h * layers;
    let tier = scaled.floor().min(layers - 1.0);
    let local = scaled - tier;

    let bottom = cone_envelope(tier / layers, tree.base_radius);
    let top = cone_envelope((tier + 1.0) / layers, tree.base_radius) * tree.tier_taper;
    let falloff = local.powf(tree.tier_curve);
    (bottom + (top - bottom) * falloff).max(0.0)
}

/// Normalised height of a world-space Y on the tree.
pub fn height_fraction(y: f32, tree: &TreeConfig) -> f32 {
    ((y - tree.base_y) / tree.height).clamp(0.0, 1.0)
}

/// One generated tree particle plus where it sits in the profile.
#[derive(Clone, Copy, Debug)]
pub struct TreeSample {
    pub position: Vec3,
    /// Normalised height before droop and jitter.
    pub height: f32,
    /// Radius over the tier maximum at `height`.
    pub radius_fraction: f32,
    pub on_surface: bool,
}

/// Generate `count` tree samples.
pub fn generate_tree_samples<R: Rng>(count: usize, tree: &TreeConfig, rng: &mut R) -> Vec<TreeSample> {
    let mut samples = Vec::with_capacity(count);
    for _ in 0..count {
        // Bottom-heavy: most mass near the wide tiers.
        let h = rng.gen::<f32>().powf(tree.height_bias);
        let tier_max = layered_cone_radius(h, tree);

        let on_surface = rng.gen::<f32>() < tree.surface_fraction;
        let radius_fraction = if on_surface {
            rng.gen_range(0.95..=1.0)
        } else {
            rng.gen::<f32>().sqrt()
        };
        let r = tier_max * radius_fraction;
        let angle = rng.gen::<f32>() * TAU;

        // Branch sag grows with the square of the outward distance.
        let outward = r / tree.base_radius;
        let droop = outward * outward * tree.droop;

        let wave = (angle * 5.0 + h * 13.0).sin() * tree.jitter;
        let y = tree.base_y + h * tree.height - droop + wave;

        let jitter = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        ) * tree.jitter;

        samples.push(TreeSample {
            position: Vec3::new(angle.cos() * r, y, angle.sin() * r) + jitter,
            height: h,
            radius_fraction,
            on_surface,
        });
    }
    samples
}

/// Generate `count` tree positions.
pub fn generate_tree<R: Rng>(count: usize, tree: &TreeConfig, rng: &mut R) -> Vec<Vec3> {
    generate_tree_samples(count, tree, rng)
        .into_iter()
        .map(|s| s.position)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layered_radius_tiers_restart_wide() {
        let tree = TreeConfig::default();
        let layers = tree.layers as f32;
        // Just below a tier boundary the radius is tapered, just above it the
        // next tier starts back at the envelope.
        let boundary = 2.0 / layers;
        let below = layered_cone_radius(boundary - 1e-3, &tree);
        let above = layered_cone_radius(boundary + 1e-3, &tree);
        assert!(above > below, "tier should restart wider: {} vs {}", above, below);
    }

    #[test]
    fn test_layered_radius_bounded_by_envelope() {
        let tree = TreeConfig::default();
        for i in 0..=200 {
            let h = i as f32 / 200.0;
            let r = layered_cone_radius(h, &tree);
            let tier_base = (h * tree.layers as f32).floor().min(tree.layers as f32 - 1.0)
                / tree.layers as f32;
            assert!(r >= 0.0);
            assert!(r <= cone_envelope(tier_base, tree.base_radius) + 1e-5);
        }
        assert!(layered_cone_radius(1.0, &tree).abs() < 1e-5);
    }

    #[test]
    fn test_height_fraction_roundtrip() {
        let tree = TreeConfig::default();
        let y = tree.base_y + tree.height * 0.25;
        assert!((height_fraction(y, &tree) - 0.25).abs() < 1e-6);
        assert_eq!(height_fraction(tree.base_y - 5.0, &tree), 0.0);
    }
}
