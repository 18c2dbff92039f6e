//! Choreography units.
//!
//! Each unit pairs one generated field with its own phase table and decides
//! what the frame uniforms mean for its phases. All of them read the same
//! [`ChoreoConfig`](crate::config::ChoreoConfig) so tree dimensions and
//! spiral turns agree across units.

pub mod celebration;
pub mod halo;
pub mod main_field;
pub mod snow;

pub use celebration::Celebration;
pub use halo::Halo;
pub use main_field::MainField;
pub use snow::Snow;

use crate::choreography::{Choreography, FrameContext};
use crate::config::Palette;
use crate::phase::{PhaseEvent, PhaseUpdate};
use crate::scene::ScenePhase;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitKind {
    Main,
    Halo,
    Snow,
    Celebration,
}

pub trait ChoreographyUnit {
    fn kind(&self) -> UnitKind;

    fn choreography(&self) -> &Choreography;

    fn choreography_mut(&mut self) -> &mut Choreography;

    /// Whether this unit has anything to do during `scene`. Irrelevant units
    /// are not ticked.
    fn is_relevant(&self, scene: ScenePhase) -> bool;

    /// Run the frame driver and write this frame's uniforms.
    fn tick(&mut self, ctx: &FrameContext<'_>) -> PhaseUpdate;

    fn handle(&mut self, event: PhaseEvent, now: f32) -> PhaseUpdate {
        self.choreography_mut().handle(event, now)
    }

    fn start(&mut self, now: f32) -> PhaseUpdate {
        self.choreography_mut().start(now)
    }

    fn recolor(&mut self, palette: &Palette) {
        self.choreography_mut().field_mut().recolor(palette);
    }
}
