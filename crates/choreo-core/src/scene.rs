//! Scene coordinator.
//!
//! Owns the units and routes external events to them. The main field leads:
//! its completions and explosion toggles are forwarded to the halo inside the
//! same tick so the two never drift a frame apart.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::choreography::FrameContext;
use crate::config::{ChoreoConfig, Palette};
use crate::error::Result;
use crate::interaction::{Interaction, PointerEvent};
use crate::phase::{Phase, PhaseEvent, PhaseUpdate};
use crate::shapes::text::{sample_text_lines, TextRasterizer};
use crate::units::{Celebration, ChoreographyUnit, Halo, MainField, Snow, UnitKind};

/// Overall flow, set from outside.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScenePhase {
    #[default]
    Intro,
    Morphing,
    Tree,
    Celebration,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SceneEvent {
    Phase(ScenePhase),
    Explode,
    Reassemble,
    Restart,
    PaletteChanged(Palette),
    Pointer(PointerEvent),
    /// Viewport resize: new world width for the main text.
    TextWidth(f32),
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SceneSignal {
    PhaseComplete { unit: UnitKind, phase: Phase },
    IdleChanged(bool),
}

pub struct Scene {
    config: ChoreoConfig,
    rasterizer: Box<dyn TextRasterizer>,
    rng: StdRng,
    phase: ScenePhase,
    main: MainField,
    halo: Halo,
    snow: Snow,
    celebration: Celebration,
    interaction: Interaction,
    /// Signals raised by events between ticks.
    pending: Vec<SceneSignal>,
}

fn collect(unit: UnitKind, update: PhaseUpdate, signals: &mut Vec<SceneSignal>) {
    if let Some(phase) = update.completed {
        signals.push(SceneSignal::PhaseComplete { unit, phase });
    }
}

/// Bring the halo level with a main-field transition.
///
/// The halo walks to the main field's phase even if it is still fading from
/// an earlier one; the release of its gated reform is sent once it gets there.
fn follow_main(halo: &mut Halo, main: PhaseUpdate, now: f32, signals: &mut Vec<SceneSignal>) {
    collect(UnitKind::Main, main, signals);
    let updates = match (main.completed, main.entered) {
        (Some(Phase::Morphing), _) => halo.follow(Phase::Forming, now),
        (Some(Phase::Reforming), _) => {
            let mut updates = halo.follow(Phase::Reforming, now);
            updates.push(halo.handle(PhaseEvent::Release, now));
            updates
        }
        (_, Some(Phase::Dispersing)) => halo.follow(Phase::Dispersing, now),
        (_, Some(Phase::Reforming)) => halo.follow(Phase::Reforming, now),
        _ => Vec::new(),
    };
    for update in updates {
        collect(UnitKind::Halo, update, signals);
    }
}

impl Scene {
    /// Validate `config`, generate every field and start all machines at
    /// time 0. The same `seed` always produces the same fields.
    pub fn new(config: ChoreoConfig, mut rasterizer: Box<dyn TextRasterizer>, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);

        let text = sample_text_lines(rasterizer.as_mut(), config.text.lines.as_slice(), &config.text, &mut rng);
        let main = MainField::new(&text, &config, &mut rng);
        let halo = Halo::new(&config, &mut rng);
        let snow = Snow::new(&config, &mut rng);
        let greeting = sample_text_lines(
            rasterizer.as_mut(),
            config.text.celebration_lines.as_slice(),
            &config.text,
            &mut rng,
        );
        let celebration = Celebration::new(&greeting, &config, &mut rng);

        info!(
            main = main.choreography().field().count(),
            text = text.len(),
            halo = halo.choreography().field().count(),
            snow = snow.choreography().field().count(),
            celebration = celebration.choreography().field().count(),
            "scene created"
        );

        let mut scene = Self {
            config,
            rasterizer,
            rng,
            phase: ScenePhase::Intro,
            main,
            halo,
            snow,
            celebration,
            interaction: Interaction::default(),
            pending: Vec::new(),
        };
        scene.restart(0.0);
        Ok(scene)
    }

    pub fn config(&self) -> &ChoreoConfig {
        &self.config
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    pub fn main(&self) -> &MainField {
        &self.main
    }

    pub fn halo(&self) -> &Halo {
        &self.halo
    }

    pub fn snow(&self) -> &Snow {
        &self.snow
    }

    pub fn celebration(&self) -> &Celebration {
        &self.celebration
    }

    pub fn unit(&self, kind: UnitKind) -> &dyn ChoreographyUnit {
        match kind {
            UnitKind::Main => &self.main,
            UnitKind::Halo => &self.halo,
            UnitKind::Snow => &self.snow,
            UnitKind::Celebration => &self.celebration,
        }
    }

    /// Progress a unit reports while sitting in a phase with no duration,
    /// e.g. a scroll position driving the wait before the next request.
    pub fn set_held_progress(&mut self, kind: UnitKind, progress: f32) {
        self.unit_mut(kind).choreography_mut().set_held_progress(progress);
    }

    /// Progress of the main field's current phase.
    pub fn progress(&self) -> f32 {
        self.main.choreography().progress()
    }

    /// Scene yaw in radians.
    pub fn rotation(&self) -> f32 {
        self.interaction.rotation()
    }

    pub fn hover_glow(&self) -> f32 {
        self.interaction.hover()
    }

    pub fn is_idle(&self) -> bool {
        self.interaction.is_idle()
    }

    pub fn handle(&mut self, event: SceneEvent, now: f32) {
        match event {
            SceneEvent::Phase(phase) => self.set_phase(phase, now),
            SceneEvent::Restart => self.restart(now),
            SceneEvent::Explode => {
                let update = self.main.handle(PhaseEvent::Advance(Phase::Dispersing), now);
                follow_main(&mut self.halo, update, now, &mut self.pending);
            }
            SceneEvent::Reassemble => {
                let update = self.main.handle(PhaseEvent::Advance(Phase::Reforming), now);
                follow_main(&mut self.halo, update, now, &mut self.pending);
            }
            SceneEvent::PaletteChanged(palette) => {
                for unit in self.units_mut() {
                    unit.recolor(&palette);
                }
                self.config.palette = palette;
            }
            SceneEvent::Pointer(pointer) => {
                if let Some(idle) = self.interaction.pointer(pointer, now, &self.config.interaction) {
                    self.pending.push(SceneSignal::IdleChanged(idle));
                }
            }
            SceneEvent::TextWidth(width) => self.resize_text(width),
        }
    }

    /// Drive every relevant unit one frame, main first.
    pub fn tick(&mut self, now: f32, dt: f32) -> Vec<SceneSignal> {
        let mut signals = std::mem::take(&mut self.pending);
        if let Some(idle) = self.interaction.update(now, dt, &self.config.interaction) {
            signals.push(SceneSignal::IdleChanged(idle));
        }

        let hover = self.interaction.hover();
        let ctx = FrameContext {
            now,
            dt,
            config: &self.config,
            base_size: self.config.palette.base_size
                * (1.0 + hover * self.config.interaction.hover_size_boost),
        };

        if self.main.is_relevant(self.phase) {
            let update = self.main.tick(&ctx);
            follow_main(&mut self.halo, update, now, &mut signals);
        }
        if self.halo.is_relevant(self.phase) {
            collect(UnitKind::Halo, self.halo.tick(&ctx), &mut signals);
        }
        if self.celebration.is_relevant(self.phase) {
            collect(UnitKind::Celebration, self.celebration.tick(&ctx), &mut signals);
        }
        if self.snow.is_relevant(self.phase) {
            collect(UnitKind::Snow, self.snow.tick(&ctx), &mut signals);
        }
        signals
    }

    fn unit_mut(&mut self, kind: UnitKind) -> &mut dyn ChoreographyUnit {
        match kind {
            UnitKind::Main => &mut self.main,
            UnitKind::Halo => &mut self.halo,
            UnitKind::Snow => &mut self.snow,
            UnitKind::Celebration => &mut self.celebration,
        }
    }

    fn units_mut(&mut self) -> [&mut dyn ChoreographyUnit; 4] {
        [
            &mut self.main,
            &mut self.halo,
            &mut self.celebration,
            &mut self.snow,
        ]
    }

    fn set_phase(&mut self, phase: ScenePhase, now: f32) {
        debug!(from = ?self.phase, to = ?phase, "scene phase");
        if phase == ScenePhase::Intro {
            self.restart(now);
            return;
        }
        self.phase = phase;
        let pending = &mut self.pending;
        match phase {
            ScenePhase::Morphing => {
                let update = self.main.handle(PhaseEvent::Advance(Phase::Morphing), now);
                follow_main(&mut self.halo, update, now, pending);
            }
            ScenePhase::Tree => {
                collect(
                    UnitKind::Snow,
                    self.snow.handle(PhaseEvent::Advance(Phase::Forming), now),
                    pending,
                );
            }
            ScenePhase::Celebration => {
                collect(
                    UnitKind::Snow,
                    self.snow.handle(PhaseEvent::Advance(Phase::Forming), now),
                    pending,
                );
                collect(
                    UnitKind::Celebration,
                    self.celebration.handle(PhaseEvent::Advance(Phase::Forming), now),
                    pending,
                );
            }
            ScenePhase::Intro => {}
        }
    }

    fn restart(&mut self, now: f32) {
        self.phase = ScenePhase::Intro;
        for unit in self.units_mut() {
            unit.handle(PhaseEvent::Reset, now);
        }
    }

    fn resize_text(&mut self, width: f32) {
        if !width.is_finite() || width <= 0.0 {
            debug!(width, "text width ignored");
            return;
        }
        self.config.text.world_width = width;
        let text = sample_text_lines(
            self.rasterizer.as_mut(),
            self.config.text.lines.as_slice(),
            &self.config.text,
            &mut self.rng,
        );
        debug!(width, samples = text.len(), "text resampled");
        self.main.rebuild_text(&text, &mut self.rng);
    }
}
