//! Per-particle motion functions.
//!
//! These are the CPU side of the shading contract: the vertex stage runs the
//! same maths on every particle using the attribute buffer and the frame
//! uniforms. The frame driver uses a few of them directly (spiral advance,
//! explosion global progress) and tests use the rest to pin the contract.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::config::{ExplosionConfig, SnowConfig, SpiralConfig, TreeConfig};
use crate::math::{fract, hash11, smoothstep, unit_clamp};
use crate::shapes::spiral::spiral_point;

/// Low-frequency sinusoidal drift keyed by a particle's stable seed.
///
/// Bounded by `sqrt(3)`; callers multiply by the scatter intensity.
pub fn turbulence(seed: f32, time: f32) -> Vec3 {
    let phase = seed * TAU;
    Vec3::new(
        (time * 0.7 + phase * 3.0).sin(),
        (time * 0.5 + phase * 5.0).cos(),
        (time * 0.6 + phase * 7.0).sin(),
    )
}

/// `lerp(start, end, mix) + turbulence × scatter`.
pub fn blend_position(start: Vec3, end: Vec3, mix: f32, seed: f32, time: f32, scatter: f32) -> Vec3 {
    let mix = unit_clamp(mix);
    let scatter = if scatter.is_finite() { scatter.max(0.0) } else { 0.0 };
    start.lerp(end, mix) + turbulence(seed, time) * scatter
}

/// Result of moving one halo particle along its spiral.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpiralStep {
    pub value: f32,
    /// The particle passed the top and respawned at the bottom.
    pub wrapped: bool,
}

/// Ascend by decrementing the spiral parameter; at or below 0 it respawns at
/// exactly 1.0 rather than carrying the overshoot.
pub fn advance_spiral(t: f32, ascent_speed: f32, dt: f32) -> SpiralStep {
    let step = (ascent_speed * dt).max(0.0);
    let next = t - if step.is_finite() { step } else { 0.0 };
    if next <= 0.0 || next.is_nan() {
        SpiralStep {
            value: 1.0,
            wrapped: true,
        }
    } else {
        SpiralStep {
            value: next.min(1.0),
            wrapped: false,
        }
    }
}

/// World position of a halo particle: helix point + respawn offset, spun
/// around the tree axis.
pub fn halo_position(
    t: f32,
    offset: Vec3,
    time: f32,
    tree: &TreeConfig,
    spiral: &SpiralConfig,
) -> Vec3 {
    let p = spiral_point(t, tree, spiral) + offset;
    let angle = time * spiral.rotation_speed;
    let (s, c) = angle.sin_cos();
    Vec3::new(p.x * c - p.z * s, p.y, p.x * s + p.z * c)
}

/// `base + amplitude × sin(time × frequency + phase)`.
pub fn flicker(base: f32, amplitude: f32, frequency: f32, time: f32, phase: f32) -> f32 {
    base + amplitude * (time * frequency + phase).sin()
}

/// Halo particle flicker using its seed as phase.
pub fn halo_flicker(seed: f32, time: f32, spiral: &SpiralConfig) -> f32 {
    flicker(
        spiral.flicker_base,
        spiral.flicker_amplitude,
        spiral.flicker_frequency,
        time,
        hash11(seed * 1000.0) * TAU,
    )
}

/// Soft appearance near the bottom (`t → 1`): `min((1 - t) k, 1)`.
pub fn fade_in(t: f32, k: f32) -> f32 {
    ((1.0 - t) * k).min(1.0)
}

/// Soft disappearance near the top (`t → 0`).
pub fn fade_out(t: f32, k: f32) -> f32 {
    let threshold = 1.0 / k;
    if t < threshold {
        t * k
    } else {
        1.0
    }
}

/// Combined halo visibility window in [0,1].
pub fn halo_visibility(t: f32, k: f32) -> f32 {
    unit_clamp(fade_in(t, k) * fade_out(t, k))
}

/// Explosion progress model shared by the frame driver and the shader.
#[derive(Clone, Copy, Debug)]
pub struct Explosion {
    pub decay: f32,
    pub scale: f32,
    pub noise_weight: f32,
    pub height_weight: f32,
    pub upward_force: f32,
    pub spread: f32,
    pub fade_start: f32,
    pub fade_end: f32,
    pub top_first: bool,
}

impl Explosion {
    pub fn new(decay: f32, config: &ExplosionConfig) -> Self {
        Self {
            decay,
            scale: config.scale,
            noise_weight: config.noise_weight,
            height_weight: config.height_weight,
            upward_force: config.upward_force,
            spread: config.spread,
            fade_start: config.fade_start,
            fade_end: config.fade_end,
            top_first: config.top_first,
        }
    }

    /// Stagger and travel parameters as the shader reads them:
    /// `[scale, noise_weight, height_weight, top_first]` then
    /// `[upward_force, spread, fade_start, fade_end]`.
    pub fn uniform_params(&self) -> [[f32; 4]; 2] {
        [
            [
                self.scale,
                self.noise_weight,
                self.height_weight,
                if self.top_first { 1.0 } else { 0.0 },
            ],
            [self.upward_force, self.spread, self.fade_start, self.fade_end],
        ]
    }

    /// `1 - exp(-decay × elapsed)`: a rapidly decelerating impulse.
    pub fn global_progress(&self, elapsed: f32) -> f32 {
        unit_clamp(1.0 - (-self.decay * elapsed.max(0.0)).exp())
    }

    /// Staggered per-particle progress, smoothstepped.
    ///
    /// Particles with a smaller `height_delay` trigger first.
    pub fn local_progress(&self, global: f32, seed: f32, height_delay: f32) -> f32 {
        let trigger = global * self.scale
            - (seed * self.noise_weight + height_delay * self.height_weight);
        let p = unit_clamp(trigger);
        p * p * (3.0 - 2.0 * p)
    }

    /// Accelerating lift: `force × p²`.
    pub fn lift(&self, local: f32) -> f32 {
        self.upward_force * local * local
    }

    /// Linear fade from 1 to 0 between the two thresholds.
    pub fn fade(&self, local: f32) -> f32 {
        1.0 - unit_clamp((local - self.fade_start) / (self.fade_end - self.fade_start))
    }

    /// Displacement from a particle's rest position.
    pub fn offset(&self, rest: Vec3, local: f32, seed: f32) -> Vec3 {
        let radial = Vec3::new(rest.x, 0.0, rest.z).normalize_or_zero();
        let swirl = turbulence(seed, local * 4.0) * 0.3;
        (radial + swirl) * self.spread * local + Vec3::Y * self.lift(local)
    }
}

/// Erosion delay for a particle resting at world height `y` on the tree.
pub fn height_delay(y: f32, tree: &TreeConfig, top_first: bool) -> f32 {
    let h = crate::shapes::tree::height_fraction(y, tree);
    if top_first {
        1.0 - h
    } else {
        h
    }
}

/// Falling flake: drops through the box, wraps back to its top, and sways.
pub fn snow_position(start: Vec3, seed: f32, time: f32, snow: &SnowConfig) -> Vec3 {
    let height = snow.extent.y.max(1.0e-3);
    let bottom = snow.center.y - height * 0.5;
    let speed = snow.fall_speed * (0.6 + 0.8 * seed);
    let fallen = start.y - bottom - time * speed;
    let y = bottom + fract(fallen / height) * height;
    let sway = (time * 0.8 + seed * TAU).sin() * snow.sway;
    Vec3::new(start.x + sway, y, start.z + sway * 0.5)
}

/// Scatter envelope for a phase that disperses then converges: rises over
/// the first half, falls over the second.
pub fn scatter_bump(progress: f32, peak: f32) -> f32 {
    let p = unit_clamp(progress);
    peak * smoothstep(0.0, 0.5, p) * (1.0 - smoothstep(0.5, 1.0, p))
}
