//! Ambient snowfall. Flakes fall and wrap inside a box around the tree; the
//! fall itself is shader-side, so the CPU only fades the field in.

use rand::Rng;

use crate::buffer::FieldBuilder;
use crate::choreography::{Choreography, FrameContext};
use crate::config::ChoreoConfig;
use crate::math::Easing;
use crate::phase::{Phase, PhaseMachine, PhaseStep, PhaseUpdate};
use crate::render::FrameUniforms;
use crate::scene::ScenePhase;
use crate::shapes::scatter::generate_box;
use crate::units::{ChoreographyUnit, UnitKind};

pub struct Snow {
    core: Choreography,
}

impl Snow {
    pub fn new<R: Rng>(config: &ChoreoConfig, rng: &mut R) -> Self {
        let snow = &config.snow;
        let flakes = generate_box(config.budget.snow, snow.center, snow.extent, rng);
        let field = FieldBuilder::new()
            .start(&flakes)
            .end(&flakes)
            .build(&config.palette, rng);
        Self {
            core: Choreography::new("snow", field, Self::machine(config)),
        }
    }

    pub fn machine(config: &ChoreoConfig) -> PhaseMachine {
        PhaseMachine::new(
            vec![
                PhaseStep::held(Phase::Hidden),
                PhaseStep::timed(Phase::Forming, config.durations.snow_fade, Easing::OutCubic),
                PhaseStep::held(Phase::Settled),
            ],
            None,
        )
    }
}

impl ChoreographyUnit for Snow {
    fn kind(&self) -> UnitKind {
        UnitKind::Snow
    }

    fn choreography(&self) -> &Choreography {
        &self.core
    }

    fn choreography_mut(&mut self) -> &mut Choreography {
        &mut self.core
    }

    fn is_relevant(&self, scene: ScenePhase) -> bool {
        matches!(scene, ScenePhase::Tree | ScenePhase::Celebration)
    }

    fn tick(&mut self, ctx: &FrameContext<'_>) -> PhaseUpdate {
        let Some(frame) = self.core.drive(ctx.now) else {
            return PhaseUpdate::default();
        };
        let visibility = match frame.phase {
            Phase::Forming => frame.eased,
            Phase::Hidden => 0.0,
            _ => 1.0,
        };
        self.core.write_uniforms(FrameUniforms::new(
            ctx.now,
            frame.phase,
            visibility,
            ctx.config.snow.sway,
            ctx.base_size,
            &ctx.config.palette,
        ));
        frame.update
    }
}
