//! Outbound render contract.
//!
//! [`GpuParticle`] is one entry of the per-particle attribute buffer and
//! [`FrameUniforms`] the per-frame parameter block. Both are `Pod` so the
//! integration layer can upload them as raw bytes. Nothing else crosses the
//! boundary to the shading stage.
//!
//! The shader branches on `phase_id`. For the main field's Dispersing,
//! Drifting and Reforming phases, `mix` carries the explosion's global
//! progress instead of a start/end blend, and `params` the per-particle
//! explosion model (see [`Explosion::uniform_params`]).
//!
//! [`Explosion::uniform_params`]: crate::motion::Explosion::uniform_params

use bytemuck::{Pod, Zeroable};

use crate::config::Palette;
use crate::particle::ParticleField;
use crate::phase::Phase;

/// GPU particle attributes: 64 bytes, matches the WGSL `Particle` struct.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Default, Pod, Zeroable)]
pub struct GpuParticle {
    pub position_start: [f32; 3], // 12 bytes
    pub random_seed: f32,         //  4 bytes
    pub position_end: [f32; 3],   // 12 bytes
    pub spiral: f32,              //  4 bytes
    pub color: [f32; 3],          // 12 bytes
    pub size: f32,                //  4 bytes
    pub kind: u32,                //  4 bytes
    pub _pad: [u32; 3],           // 12 bytes
}

/// Per-frame uniforms: 112 bytes, 16-byte aligned rows.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Default, Pod, Zeroable)]
pub struct FrameUniforms {
    pub time: f32,
    pub phase_id: u32,
    pub mix: f32,
    pub scatter: f32,
    pub base_size: f32,
    pub color_count: u32,
    pub _pad: [f32; 2],
    pub colors: [[f32; 4]; 3],
    /// Unit-specific shading parameters; zero unless a unit fills them.
    pub params: [[f32; 4]; 2],
}

impl FrameUniforms {
    pub fn new(time: f32, phase: Phase, mix: f32, scatter: f32, base_size: f32, palette: &Palette) -> Self {
        Self {
            time,
            phase_id: phase.id(),
            mix,
            scatter,
            base_size,
            color_count: palette.colors.len().min(3) as u32,
            _pad: [0.0; 2],
            colors: palette.uniform_colors(),
            params: [[0.0; 4]; 2],
        }
    }

    pub fn with_params(mut self, params: [[f32; 4]; 2]) -> Self {
        self.params = params;
        self
    }
}

fn pack_one(field: &ParticleField, i: usize) -> GpuParticle {
    GpuParticle {
        position_start: field.position_start[i].to_array(),
        random_seed: field.random_seed[i],
        position_end: field.position_end[i].to_array(),
        spiral: field.spiral[i],
        color: field.color[i].to_array(),
        size: field.size[i],
        kind: field.kind[i] as u32,
        _pad: [0; 3],
    }
}

/// Write a field into a GPU attribute buffer, resizing it to `count`.
pub fn pack_particles(field: &ParticleField, out: &mut Vec<GpuParticle>) {
    out.resize(field.count(), GpuParticle::zeroed());

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        out.par_iter_mut()
            .enumerate()
            .for_each(|(i, slot)| *slot = pack_one(field, i));
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = pack_one(field, i);
        }
    }
}
