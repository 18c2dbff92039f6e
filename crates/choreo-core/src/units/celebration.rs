//! Celebration text: a scattered shell that gathers into a second greeting,
//! holds, then scatters back out and drifts.

use glam::Vec3;
use rand::Rng;

use crate::buffer::FieldBuilder;
use crate::choreography::{Choreography, FrameContext};
use crate::config::ChoreoConfig;
use crate::math::Easing;
use crate::phase::{Phase, PhaseMachine, PhaseStep, PhaseUpdate};
use crate::render::FrameUniforms;
use crate::scene::ScenePhase;
use crate::shapes::scatter::generate_shell;
use crate::shapes::text::TextShape;
use crate::units::{ChoreographyUnit, UnitKind};

pub struct Celebration {
    core: Choreography,
}

impl Celebration {
    pub fn new<R: Rng>(text: &TextShape, config: &ChoreoConfig, rng: &mut R) -> Self {
        let budget = &config.budget;
        let count = text.len().max(budget.celebration_min);
        let center = Vec3::new(0.0, config.text.y_offset, 0.0);
        let shell = generate_shell(count, center, budget.shell_radius, budget.shell_thickness, rng);
        let field = FieldBuilder::new()
            .start(&shell)
            .end(&text.positions)
            .min_count(budget.celebration_min)
            .build(&config.palette, rng);
        Self {
            core: Choreography::new("celebration", field, Self::machine(config)),
        }
    }

    pub fn machine(config: &ChoreoConfig) -> PhaseMachine {
        let d = &config.durations;
        PhaseMachine::new(
            vec![
                PhaseStep::held(Phase::Hidden),
                PhaseStep::timed(Phase::Forming, d.celebration_form, Easing::OutQuart),
                PhaseStep::timed(Phase::Visible, d.celebration_hold, Easing::Linear),
                PhaseStep::timed(Phase::Dispersing, d.celebration_disperse, Easing::InOutCubic),
                PhaseStep::held(Phase::Drifting),
            ],
            None,
        )
    }
}

impl ChoreographyUnit for Celebration {
    fn kind(&self) -> UnitKind {
        UnitKind::Celebration
    }

    fn choreography(&self) -> &Choreography {
        &self.core
    }

    fn choreography_mut(&mut self) -> &mut Choreography {
        &mut self.core
    }

    fn is_relevant(&self, scene: ScenePhase) -> bool {
        scene == ScenePhase::Celebration
    }

    fn tick(&mut self, ctx: &FrameContext<'_>) -> PhaseUpdate {
        let Some(frame) = self.core.drive(ctx.now) else {
            return PhaseUpdate::default();
        };
        let config = ctx.config;
        let idle = config.budget.idle_scatter;
        let peak = config.budget.scatter_peak;

        let (blend, scatter) = match frame.phase {
            Phase::Forming => (frame.eased, idle + peak * (1.0 - frame.eased)),
            Phase::Visible | Phase::Settled => (1.0, idle),
            Phase::Dispersing => (1.0 - frame.eased, idle + peak * frame.eased),
            Phase::Drifting => (0.0, config.explosion.drift_scatter),
            _ => (0.0, 0.0),
        };

        self.core.write_uniforms(FrameUniforms::new(
            ctx.now,
            frame.phase,
            blend,
            scatter,
            ctx.base_size,
            &config.palette,
        ));
        frame.update
    }
}
