//! Main body: greeting text that morphs into the tree, explodes and reforms.
//!
//! `position_start` holds the text and `position_end` the tree. Once the
//! morph is done the shader treats `position_end` as the rest position and,
//! in the explosion phases, reads `mix` as the explosion's global progress.

use rand::Rng;

use crate::buffer::{refill_start, FieldBuilder, PADDING_JITTER};
use crate::choreography::{Choreography, FrameContext};
use crate::config::ChoreoConfig;
use crate::math::{mix, Easing};
use crate::motion::{scatter_bump, Explosion};
use crate::phase::{Phase, PhaseMachine, PhaseStep, PhaseUpdate};
use crate::render::FrameUniforms;
use crate::scene::ScenePhase;
use crate::shapes::text::TextShape;
use crate::shapes::tree::generate_tree;
use crate::units::{ChoreographyUnit, UnitKind};

pub struct MainField {
    core: Choreography,
    /// Explosion progress reached when Dispersing ended.
    explosion_peak: f32,
}

impl MainField {
    pub fn new<R: Rng>(text: &TextShape, config: &ChoreoConfig, rng: &mut R) -> Self {
        let tree = generate_tree(config.budget.tree, &config.tree, rng);
        let field = FieldBuilder::new()
            .start(&text.positions)
            .end(&tree)
            .fallback_extent(config.snow.extent)
            .build(&config.palette, rng);
        Self {
            core: Choreography::new("main", field, Self::machine(config)),
            explosion_peak: 0.0,
        }
    }

    pub fn machine(config: &ChoreoConfig) -> PhaseMachine {
        let d = &config.durations;
        let damping = &config.damping;
        PhaseMachine::new(
            vec![
                PhaseStep::timed(
                    Phase::Forming,
                    d.entrance,
                    Easing::Damped(damping.entrance * d.entrance),
                ),
                PhaseStep::held(Phase::Visible),
                PhaseStep::timed(Phase::Morphing, d.morph, Easing::InOutCubic),
                PhaseStep::held(Phase::Settled),
                PhaseStep::timed(Phase::Dispersing, d.explosion, Easing::OutCubic),
                PhaseStep::held(Phase::Drifting),
                PhaseStep::timed(
                    Phase::Reforming,
                    d.reform,
                    Easing::Damped(damping.reset * d.reform),
                ),
            ],
            Some(Phase::Settled),
        )
    }

    pub fn explosion(config: &ChoreoConfig) -> Explosion {
        Explosion::new(config.damping.explosion, &config.explosion)
    }

    /// Swap in freshly sampled text. The tree, the particle count and every
    /// particle's seed, size and colour are kept.
    ///
    /// Text that no longer fits is subsampled; text that shrank leaves the
    /// tail as padding.
    pub fn rebuild_text<R: Rng>(&mut self, text: &TextShape, rng: &mut R) {
        refill_start(self.core.field_mut(), &text.positions, PADDING_JITTER, rng);
    }

    pub fn explosion_peak(&self) -> f32 {
        self.explosion_peak
    }
}

impl ChoreographyUnit for MainField {
    fn kind(&self) -> UnitKind {
        UnitKind::Main
    }

    fn choreography(&self) -> &Choreography {
        &self.core
    }

    fn choreography_mut(&mut self) -> &mut Choreography {
        &mut self.core
    }

    fn is_relevant(&self, _scene: ScenePhase) -> bool {
        true
    }

    fn tick(&mut self, ctx: &FrameContext<'_>) -> PhaseUpdate {
        let Some(frame) = self.core.drive(ctx.now) else {
            return PhaseUpdate::default();
        };
        let config = ctx.config;
        let budget = &config.budget;
        let idle = budget.idle_scatter;
        let drift = config.explosion.drift_scatter;
        let explosion = Self::explosion(config);

        if frame.update.entered == Some(Phase::Drifting) {
            self.explosion_peak = explosion.global_progress(config.durations.explosion);
        }

        let (blend, scatter) = match frame.phase {
            Phase::Hidden => (0.0, 0.0),
            Phase::Forming => (0.0, idle + budget.scatter_peak * (1.0 - frame.eased)),
            Phase::Visible => (0.0, idle),
            Phase::Morphing => (frame.eased, idle + scatter_bump(frame.progress, budget.scatter_peak)),
            Phase::Settled => (1.0, idle),
            Phase::Dispersing => {
                let global = explosion.global_progress(frame.elapsed);
                self.explosion_peak = global;
                (global, mix(idle, drift, frame.eased))
            }
            Phase::Drifting => (self.explosion_peak, drift),
            Phase::Reforming => (
                self.explosion_peak * (1.0 - frame.eased),
                mix(drift, idle, frame.eased),
            ),
        };

        self.core.write_uniforms(
            FrameUniforms::new(
                ctx.now,
                frame.phase,
                blend,
                scatter,
                ctx.base_size,
                &config.palette,
            )
            .with_params(explosion.uniform_params()),
        );
        frame.update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::PhaseEvent;
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit(config: &ChoreoConfig) -> MainField {
        let mut rng = StdRng::seed_from_u64(3);
        let text = TextShape {
            positions: vec![Vec3::X; 50],
            scale: 1.0,
            line_ranges: vec![0..50],
        };
        MainField::new(&text, config, &mut rng)
    }

    fn tick(unit: &mut MainField, config: &ChoreoConfig, now: f32) -> PhaseUpdate {
        let ctx = FrameContext {
            now,
            dt: 1.0 / 60.0,
            config,
            base_size: config.palette.base_size,
        };
        unit.tick(&ctx)
    }

    #[test]
    fn test_count_covers_tree_budget() {
        let mut config = ChoreoConfig::default();
        config.budget.tree = 200;
        let unit = unit(&config);
        assert_eq!(unit.choreography().field().count(), 200);
        assert_eq!(unit.choreography().field().active_count(), 50);
    }

    #[test]
    fn test_explosion_mix_holds_then_reforms() {
        let mut config = ChoreoConfig::default();
        config.budget.tree = 100;
        let d = config.durations.clone();
        let mut unit = unit(&config);
        unit.start(0.0);
        tick(&mut unit, &config, d.entrance);
        unit.handle(PhaseEvent::Advance(Phase::Morphing), 10.0);
        tick(&mut unit, &config, 10.0 + d.morph);
        assert_eq!(unit.choreography().phase(), Some(Phase::Settled));
        assert_eq!(unit.choreography().uniforms().mix, 1.0);

        unit.handle(PhaseEvent::Advance(Phase::Dispersing), 20.0);
        tick(&mut unit, &config, 20.0 + d.explosion * 0.5);
        let mid = unit.choreography().uniforms().mix;
        tick(&mut unit, &config, 20.0 + d.explosion);
        assert_eq!(unit.choreography().phase(), Some(Phase::Drifting));
        let peak = unit.choreography().uniforms().mix;
        assert!(peak > mid);
        let params = unit.choreography().uniforms().params;
        assert_eq!(params[0][0], config.explosion.scale);
        assert_eq!(params[0][3], 1.0);
        assert_eq!(params[1][1], config.explosion.spread);

        unit.handle(PhaseEvent::Advance(Phase::Reforming), 30.0);
        tick(&mut unit, &config, 30.0 + d.reform);
        assert_eq!(unit.choreography().phase(), Some(Phase::Settled));
    }

    #[test]
    fn test_rebuild_text_keeps_count() {
        let mut config = ChoreoConfig::default();
        config.budget.tree = 100;
        let mut unit = unit(&config);
        let mut rng = StdRng::seed_from_u64(9);
        let wide = TextShape {
            positions: vec![Vec3::Y; 400],
            scale: 1.0,
            line_ranges: vec![0..400],
        };
        let seeds = unit.choreography().field().random_seed().to_vec();
        unit.rebuild_text(&wide, &mut rng);
        let field = unit.choreography().field();
        assert_eq!(field.count(), 100);
        assert_eq!(field.active_count(), 100);
        assert_eq!(field.random_seed(), &seeds[..]);
    }
}
