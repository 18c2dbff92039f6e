//! Spiral halo wrapped around the tree envelope.
//!
//! A halo particle is addressed by its spiral parameter `t`: `t = 1` is the
//! bottom of the helix, `t = 0` the top. The frame driver ascends particles
//! by decrementing `t`, so Cartesian placement is only needed once.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::config::{SpiralConfig, TreeConfig};
use crate::shapes::tree::cone_envelope;

/// Point on the halo helix for spiral parameter `t`, before rotation.
///
/// `spiral.turns` is integral, so `t → 0` and `t → 1` share an azimuth.
pub fn spiral_point(t: f32, tree: &TreeConfig, spiral: &SpiralConfig) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    let h = 1.0 - t;
    let angle = t * spiral.turns as f32 * TAU;
    let r = cone_envelope(h, tree.base_radius) + spiral.radius_offset;
    Vec3::new(angle.cos() * r, tree.base_y + h * tree.height, angle.sin() * r)
}

pub struct SpiralShape {
    pub positions: Vec<Vec3>,
    pub params: Vec<f32>,
}

/// Spread `count` particles along the helix, stratified so the spiral is
/// evenly covered and jittered so it does not look quantised.
pub fn generate_spiral<R: Rng>(
    count: usize,
    tree: &TreeConfig,
    spiral: &SpiralConfig,
    rng: &mut R,
) -> SpiralShape {
    let mut positions = Vec::with_capacity(count);
    let mut params = Vec::with_capacity(count);
    let step = 1.0 / count.max(1) as f32;
    for i in 0..count {
        let t = ((i as f32 + rng.gen::<f32>()) * step).min(1.0 - f32::EPSILON);
        let offset = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        ) * spiral.respawn_jitter;
        positions.push(spiral_point(t, tree, spiral) + offset);
        params.push(t);
    }
    SpiralShape { positions, params }
}
