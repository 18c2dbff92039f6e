//! Particle choreography: shape generators, attribute buffers, phase
//! machines and the per-frame uniforms a GPU shading stage consumes.

pub mod buffer;
pub mod choreography;
pub mod config;
pub mod error;
pub mod interaction;
pub mod math;
pub mod motion;
pub mod particle;
pub mod phase;
pub mod render;
pub mod scene;
pub mod shapes;
pub mod units;

pub use choreography::{Choreography, Frame, FrameContext};
pub use config::{ChoreoConfig, Palette};
pub use error::{ChoreoError, ConfigError, Result};
pub use particle::{ParticleField, ParticleKind};
pub use phase::{Phase, PhaseEvent, PhaseMachine, PhaseStep, PhaseUpdate};
pub use render::{pack_particles, FrameUniforms, GpuParticle};
pub use scene::{Scene, SceneEvent, ScenePhase, SceneSignal};
pub use units::{ChoreographyUnit, UnitKind};
