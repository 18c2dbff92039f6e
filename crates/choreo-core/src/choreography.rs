//! One particle field plus the phase machine that sequences it.

use tracing::debug;

use crate::config::ChoreoConfig;
use crate::math::phase_progress;
use crate::particle::ParticleField;
use crate::phase::{Phase, PhaseEvent, PhaseMachine, PhaseUpdate};
use crate::render::FrameUniforms;

/// Per-frame inputs shared by every unit in a tick.
pub struct FrameContext<'a> {
    /// Frame clock in seconds.
    pub now: f32,
    /// Seconds since the previous tick.
    pub dt: f32,
    pub config: &'a ChoreoConfig,
    /// Base particle size after interaction modulation.
    pub base_size: f32,
}

/// Phase timing as seen by the frame driver this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub phase: Phase,
    /// Seconds since the phase was entered, never negative.
    pub elapsed: f32,
    /// Raw progress in [0,1].
    pub progress: f32,
    /// `progress` through the phase's easing curve.
    pub eased: f32,
    /// Transitions that happened while driving this frame.
    pub update: PhaseUpdate,
}

pub struct Choreography {
    label: &'static str,
    field: ParticleField,
    machine: PhaseMachine,
    uniforms: FrameUniforms,
    progress: f32,
    held_progress: f32,
}

impl Choreography {
    pub fn new(label: &'static str, field: ParticleField, machine: PhaseMachine) -> Self {
        debug!(unit = label, count = field.count(), "choreography created");
        Self {
            label,
            field,
            machine,
            uniforms: FrameUniforms::default(),
            progress: 0.0,
            held_progress: 0.0,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub(crate) fn field_mut(&mut self) -> &mut ParticleField {
        &mut self.field
    }

    pub fn machine(&self) -> &PhaseMachine {
        &self.machine
    }

    pub fn phase(&self) -> Option<Phase> {
        self.machine.current()
    }

    /// Last progress computed by [`drive`](Self::drive).
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn uniforms(&self) -> &FrameUniforms {
        &self.uniforms
    }

    pub fn write_uniforms(&mut self, uniforms: FrameUniforms) {
        self.uniforms = uniforms;
    }

    /// Progress reported while the current phase has no duration.
    pub fn set_held_progress(&mut self, progress: f32) {
        self.held_progress = crate::math::unit_clamp(progress);
    }

    pub fn start(&mut self, now: f32) -> PhaseUpdate {
        let update = self.machine.start(now);
        self.trace(update);
        update
    }

    pub fn handle(&mut self, event: PhaseEvent, now: f32) -> PhaseUpdate {
        let update = self.machine.advance(event, now);
        self.trace(update);
        update
    }

    /// Walk forward to `target`, see [`PhaseMachine::follow`].
    pub fn follow(&mut self, target: Phase, now: f32) -> Vec<PhaseUpdate> {
        let updates = self.machine.follow(target, now);
        for update in &updates {
            self.trace(*update);
        }
        updates
    }

    /// Run the frame driver: apply due transitions, then read the timing of
    /// the phase that is current afterwards.
    ///
    /// Returns `None` before the machine has entered any phase.
    pub fn drive(&mut self, now: f32) -> Option<Frame> {
        if !self.machine.is_started() {
            return None;
        }
        let update = self.machine.update(now);
        self.trace(update);

        let step = *self.machine.current_step()?;
        let elapsed = self.machine.elapsed(now)?.max(0.0);
        let progress = match step.duration() {
            Some(duration) => phase_progress(elapsed, duration),
            None => self.held_progress,
        };
        self.progress = progress;
        Some(Frame {
            phase: step.phase,
            elapsed,
            progress,
            eased: step.easing.apply(progress),
            update,
        })
    }

    fn trace(&self, update: PhaseUpdate) {
        if let Some(phase) = update.completed {
            debug!(unit = self.label, ?phase, "phase complete");
        }
        if let Some(phase) = update.entered {
            debug!(unit = self.label, ?phase, "phase entered");
        }
    }
}
