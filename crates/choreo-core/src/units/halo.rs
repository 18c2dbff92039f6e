//! Spiral halo winding around the tree.
//!
//! `position_start` is the Cartesian placement used for the fade-in and
//! `position_end` the respawn offset added to the helix point. While the halo
//! is on screen each particle's spiral parameter is decremented on the CPU;
//! on wrap it respawns at the bottom with a fresh offset. `mix` carries the
//! halo's overall visibility.
//!
//! The halo mirrors the main field. Its fades can be cut short so that an
//! explode or reassemble arriving mid-fade is taken up on the same frame.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::buffer::FieldBuilder;
use crate::choreography::{Choreography, FrameContext};
use crate::config::{ChoreoConfig, SpiralConfig};
use crate::math::Easing;
use crate::motion::advance_spiral;
use crate::phase::{Phase, PhaseMachine, PhaseStep, PhaseUpdate};
use crate::render::FrameUniforms;
use crate::scene::ScenePhase;
use crate::shapes::spiral::{generate_spiral, spiral_point};
use crate::units::{ChoreographyUnit, UnitKind};

pub struct Halo {
    core: Choreography,
    rng: StdRng,
}

fn respawn_offset<R: Rng>(spiral: &SpiralConfig, rng: &mut R) -> Vec3 {
    Vec3::new(
        rng.gen_range(-1.0..=1.0),
        rng.gen_range(-1.0..=1.0),
        rng.gen_range(-1.0..=1.0),
    ) * spiral.respawn_jitter
}

impl Halo {
    pub fn new<R: Rng>(config: &ChoreoConfig, rng: &mut R) -> Self {
        let shape = generate_spiral(config.budget.halo, &config.tree, &config.spiral, rng);
        let offsets: Vec<Vec3> = shape
            .positions
            .iter()
            .zip(shape.params.iter())
            .map(|(p, t)| *p - spiral_point(*t, &config.tree, &config.spiral))
            .collect();
        let field = FieldBuilder::new()
            .start(&shape.positions)
            .end(&offsets)
            .spiral(&shape.params)
            .padding_jitter(0.0)
            .build(&config.palette, rng);
        Self {
            core: Choreography::new("halo", field, Self::machine(config)),
            rng: StdRng::seed_from_u64(rng.gen()),
        }
    }

    pub fn machine(config: &ChoreoConfig) -> PhaseMachine {
        let fade = config.durations.halo_fade;
        PhaseMachine::new(
            vec![
                PhaseStep::held(Phase::Hidden),
                PhaseStep::timed(Phase::Forming, fade, Easing::OutCubic).interruptible(),
                PhaseStep::held(Phase::Settled),
                PhaseStep::timed(Phase::Dispersing, fade, Easing::OutCubic).interruptible(),
                PhaseStep::held(Phase::Drifting),
                PhaseStep::gated(Phase::Reforming, fade, Easing::OutCubic).interruptible(),
            ],
            Some(Phase::Settled),
        )
    }

    /// Catch up with the main field's `target` phase, cutting short any
    /// fade still running.
    pub fn follow(&mut self, target: Phase, now: f32) -> Vec<PhaseUpdate> {
        self.core.follow(target, now)
    }

    fn ascend(&mut self, speed: f32, dt: f32, spiral: &SpiralConfig) {
        let field = self.core.field_mut();
        let rng = &mut self.rng;
        for i in 0..field.count() {
            // Per-particle speed spread keeps the halo from moving as a sheet.
            let rate = speed * (0.8 + 0.4 * field.random_seed[i]);
            let step = advance_spiral(field.spiral[i], rate, dt);
            field.spiral[i] = step.value;
            if step.wrapped {
                field.position_end[i] = respawn_offset(spiral, rng);
            }
        }
    }
}

impl ChoreographyUnit for Halo {
    fn kind(&self) -> UnitKind {
        UnitKind::Halo
    }

    fn choreography(&self) -> &Choreography {
        &self.core
    }

    fn choreography_mut(&mut self) -> &mut Choreography {
        &mut self.core
    }

    fn is_relevant(&self, scene: ScenePhase) -> bool {
        !matches!(scene, ScenePhase::Intro)
    }

    fn tick(&mut self, ctx: &FrameContext<'_>) -> PhaseUpdate {
        let Some(frame) = self.core.drive(ctx.now) else {
            return PhaseUpdate::default();
        };
        let config = ctx.config;
        let idle = config.budget.idle_scatter;

        let (visibility, scatter) = match frame.phase {
            Phase::Hidden | Phase::Drifting => (0.0, idle),
            Phase::Forming | Phase::Reforming => (frame.eased, idle),
            Phase::Settled | Phase::Visible | Phase::Morphing => (1.0, idle),
            Phase::Dispersing => (
                1.0 - frame.eased,
                idle + config.budget.scatter_peak * frame.eased,
            ),
        };
        if visibility > 0.0 {
            self.ascend(config.spiral.ascent_speed, ctx.dt, &config.spiral);
        }

        self.core.write_uniforms(FrameUniforms::new(
            ctx.now,
            frame.phase,
            visibility,
            scatter,
            ctx.base_size,
            &config.palette,
        ));
        frame.update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::PhaseEvent;

    #[test]
    fn test_offsets_reconstruct_placement() {
        let mut config = ChoreoConfig::default();
        config.budget.halo = 64;
        let mut rng = StdRng::seed_from_u64(5);
        let halo = Halo::new(&config, &mut rng);
        let field = halo.choreography().field();
        for i in 0..field.count() {
            let p = spiral_point(field.spiral()[i], &config.tree, &config.spiral)
                + field.position_end()[i];
            assert!((p - field.position_start()[i]).length() < 1e-4);
        }
    }

    #[test]
    fn test_hidden_halo_does_not_ascend() {
        let mut config = ChoreoConfig::default();
        config.budget.halo = 16;
        let mut rng = StdRng::seed_from_u64(5);
        let mut halo = Halo::new(&config, &mut rng);
        halo.start(0.0);
        let before = halo.choreography().field().spiral().to_vec();
        let ctx = FrameContext {
            now: 1.0,
            dt: 0.5,
            config: &config,
            base_size: 0.08,
        };
        halo.tick(&ctx);
        assert_eq!(halo.choreography().field().spiral(), &before[..]);

        halo.handle(PhaseEvent::Advance(Phase::Forming), 1.0);
        let ctx = FrameContext { now: 1.5, ..ctx };
        halo.tick(&ctx);
        let after = halo.choreography().field().spiral();
        assert!(after.iter().zip(before.iter()).any(|(a, b)| a != b));
    }

    #[test]
    fn test_reforming_waits_for_release() {
        let config = ChoreoConfig::default();
        let fade = config.durations.halo_fade;
        let mut m = Halo::machine(&config);
        m.start(0.0);
        m.advance(PhaseEvent::Advance(Phase::Forming), 0.0);
        m.update(fade);
        m.advance(PhaseEvent::Advance(Phase::Dispersing), 10.0);
        m.update(10.0 + fade);
        m.advance(PhaseEvent::Advance(Phase::Reforming), 20.0);
        let u = m.update(20.0 + fade * 2.0);
        assert_eq!(u.completed, Some(Phase::Reforming));
        assert_eq!(m.current(), Some(Phase::Reforming));
        let u = m.advance(PhaseEvent::Release, 30.0);
        assert_eq!(u.entered, Some(Phase::Settled));
    }

    #[test]
    fn test_follow_cuts_fade_in_short() {
        let config = ChoreoConfig::default();
        let mut rng = StdRng::seed_from_u64(6);
        let mut halo = Halo::new(&config, &mut rng);
        halo.start(0.0);
        halo.follow(Phase::Forming, 1.0);
        assert_eq!(halo.choreography().phase(), Some(Phase::Forming));

        let updates = halo.follow(Phase::Dispersing, 1.2);
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].completed, Some(Phase::Forming));
        assert_eq!(halo.choreography().phase(), Some(Phase::Dispersing));
        assert_eq!(halo.choreography().machine().start_time(), Some(1.2));

        // Reforming half way, then exploded again.
        halo.follow(Phase::Reforming, 2.0);
        assert_eq!(halo.choreography().phase(), Some(Phase::Reforming));
        halo.follow(Phase::Dispersing, 2.1);
        assert_eq!(halo.choreography().phase(), Some(Phase::Dispersing));

        // Hidden is never reached again without a reset.
        assert!(halo.follow(Phase::Forming, 3.0).is_empty());
    }
}
