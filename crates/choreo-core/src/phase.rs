//! Linear phase state machine with one-shot completion.
//!
//! A machine is a fixed sequence of [`PhaseStep`]s plus an optional loop
//! target for the step after the last one. It only moves forward along that
//! sequence (or back to the first step on an explicit reset). Each traversal
//! of a step reports its completion at most once.

use tracing::debug;

use crate::math::{phase_progress, Easing};

/// Phase identifiers shared by every unit. A unit's step table uses the
/// subset it needs; the numeric value is the `phase_id` uniform.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Hidden = 0,
    Forming = 1,
    Visible = 2,
    Morphing = 3,
    Settled = 4,
    Dispersing = 5,
    Drifting = 6,
    Reforming = 7,
}

impl Phase {
    pub fn id(self) -> u32 {
        self as u32
    }
}

/// How a phase ends.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Exit {
    /// Ends when its duration elapses.
    Timed(f32),
    /// Duration is necessary but not sufficient: also waits for a release.
    Gated(f32),
    /// Holds until an external advance request.
    Held,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PhaseStep {
    pub phase: Phase,
    pub exit: Exit,
    pub easing: Easing,
    /// A request for the successor may cut the duration short.
    pub interruptible: bool,
}

impl PhaseStep {
    pub fn timed(phase: Phase, duration: f32, easing: Easing) -> Self {
        Self {
            phase,
            exit: Exit::Timed(duration),
            easing,
            interruptible: false,
        }
    }

    pub fn gated(phase: Phase, duration: f32, easing: Easing) -> Self {
        Self {
            phase,
            exit: Exit::Gated(duration),
            easing,
            interruptible: false,
        }
    }

    pub fn held(phase: Phase) -> Self {
        Self {
            phase,
            exit: Exit::Held,
            easing: Easing::Linear,
            interruptible: false,
        }
    }

    pub fn interruptible(mut self) -> Self {
        self.interruptible = true;
        self
    }

    pub fn duration(&self) -> Option<f32> {
        match self.exit {
            Exit::Timed(d) | Exit::Gated(d) => Some(d),
            Exit::Held => None,
        }
    }
}

/// External input to a machine.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PhaseEvent {
    /// Move to this phase. Only honoured if it is the immediate successor
    /// and the current phase may be left by request.
    Advance(Phase),
    /// Open the gate of the current gated phase.
    Release,
    /// Restart from the first step.
    Reset,
}

/// What happened during one `update` or `advance` call.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct PhaseUpdate {
    /// Phase whose completion fired during this call.
    pub completed: Option<Phase>,
    /// Phase entered during this call.
    pub entered: Option<Phase>,
}

impl PhaseUpdate {
    pub fn is_noop(&self) -> bool {
        self.completed.is_none() && self.entered.is_none()
    }
}

#[derive(Clone, Copy, Debug)]
struct Active {
    index: usize,
    start_time: f32,
    /// One-shot guard; cleared on every entry.
    completed: bool,
    gate_open: bool,
}

#[derive(Clone, Debug)]
pub struct PhaseMachine {
    steps: Vec<PhaseStep>,
    loop_to: Option<usize>,
    active: Option<Active>,
}

impl PhaseMachine {
    /// `loop_to` names the step entered after the last one; `None` makes the
    /// last step terminal.
    pub fn new(steps: Vec<PhaseStep>, loop_to: Option<Phase>) -> Self {
        let loop_to = loop_to.and_then(|p| steps.iter().position(|s| s.phase == p));
        Self {
            steps,
            loop_to,
            active: None,
        }
    }

    /// Enter the first step. A machine that was never started ignores
    /// updates and reports no phase.
    pub fn start(&mut self, now: f32) -> PhaseUpdate {
        if self.steps.is_empty() {
            return PhaseUpdate::default();
        }
        self.enter(0, now);
        PhaseUpdate {
            completed: None,
            entered: Some(self.steps[0].phase),
        }
    }

    pub fn is_started(&self) -> bool {
        self.active.is_some()
    }

    pub fn current(&self) -> Option<Phase> {
        self.current_step().map(|s| s.phase)
    }

    pub fn current_step(&self) -> Option<&PhaseStep> {
        self.active.and_then(|a| self.steps.get(a.index))
    }

    pub fn start_time(&self) -> Option<f32> {
        self.active.map(|a| a.start_time)
    }

    pub fn elapsed(&self, now: f32) -> Option<f32> {
        self.active.map(|a| now - a.start_time)
    }

    /// Duration progress of the current phase, `None` for held phases or an
    /// unstarted machine.
    pub fn progress(&self, now: f32) -> Option<f32> {
        let step = self.current_step()?;
        let elapsed = self.elapsed(now)?;
        step.duration().map(|d| phase_progress(elapsed, d))
    }

    /// Whether the current phase's completion has already fired.
    pub fn is_complete(&self) -> bool {
        self.active.map(|a| a.completed).unwrap_or(false)
    }

    /// Advance time-driven transitions. Called once per frame.
    pub fn update(&mut self, now: f32) -> PhaseUpdate {
        let Some(active) = self.active else {
            return PhaseUpdate::default();
        };
        let step = self.steps[active.index];
        let Some(duration) = step.duration() else {
            return PhaseUpdate::default();
        };

        let mut update = PhaseUpdate::default();
        if !active.completed && phase_progress(now - active.start_time, duration) >= 1.0 {
            self.mark_complete();
            update.completed = Some(step.phase);
        }

        let ready = match step.exit {
            Exit::Timed(_) => true,
            Exit::Gated(_) => active.gate_open,
            Exit::Held => false,
        };
        if ready && self.is_complete() {
            update.entered = self.enter_successor(now);
        }
        update
    }

    /// Apply an external event. Ineligible requests are ignored.
    pub fn advance(&mut self, event: PhaseEvent, now: f32) -> PhaseUpdate {
        match event {
            PhaseEvent::Reset => {
                let update = self.start(now);
                debug!(phase = ?update.entered, "phase machine reset");
                update
            }
            PhaseEvent::Release => self.release(now),
            PhaseEvent::Advance(target) => self.request(target, now),
        }
    }

    fn request(&mut self, target: Phase, now: f32) -> PhaseUpdate {
        let Some(active) = self.active else {
            debug!(?target, "advance ignored: machine not started");
            return PhaseUpdate::default();
        };
        let step = self.steps[active.index];
        let successor = self.successor(active.index).map(|i| self.steps[i].phase);
        if successor != Some(target) {
            debug!(current = ?step.phase, ?target, "advance ignored: not the next phase");
            return PhaseUpdate::default();
        }

        let leavable = match step.exit {
            Exit::Held => true,
            Exit::Gated(_) => active.completed || step.interruptible,
            Exit::Timed(_) => step.interruptible,
        };
        if !leavable {
            debug!(current = ?step.phase, ?target, "advance ignored: phase not finished");
            return PhaseUpdate::default();
        }

        let mut update = PhaseUpdate::default();
        if !active.completed {
            self.mark_complete();
            update.completed = Some(step.phase);
        }
        update.entered = self.enter_successor(now);
        update
    }

    /// Phases entered, in order, on the way from the current phase to
    /// `target`. Empty when already there, `None` when the sequence never
    /// reaches it.
    pub fn route_to(&self, target: Phase) -> Option<Vec<Phase>> {
        let mut index = self.active?.index;
        let mut route = Vec::new();
        for _ in 0..self.steps.len() {
            if self.steps[index].phase == target {
                return Some(route);
            }
            index = self.successor(index)?;
            route.push(self.steps[index].phase);
        }
        (self.steps[index].phase == target).then_some(route)
    }

    /// Request each phase on the route to `target` in turn, stopping at the
    /// first request the machine refuses. Returns one update per phase entered.
    pub fn follow(&mut self, target: Phase, now: f32) -> Vec<PhaseUpdate> {
        let Some(route) = self.route_to(target) else {
            debug!(current = ?self.current(), ?target, "follow ignored: target unreachable");
            return Vec::new();
        };
        let mut updates = Vec::with_capacity(route.len());
        for phase in route {
            let update = self.request(phase, now);
            if update.entered != Some(phase) {
                break;
            }
            updates.push(update);
        }
        updates
    }

    fn release(&mut self, now: f32) -> PhaseUpdate {
        let Some(active) = self.active.as_mut() else {
            return PhaseUpdate::default();
        };
        let step = self.steps[active.index];
        if !matches!(step.exit, Exit::Gated(_)) {
            debug!(current = ?step.phase, "release ignored: phase is not gated");
            return PhaseUpdate::default();
        }
        active.gate_open = true;
        // Duration may already be done; leave this frame rather than next.
        self.update(now)
    }

    fn mark_complete(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.completed = true;
        }
    }

    fn successor(&self, index: usize) -> Option<usize> {
        if index + 1 < self.steps.len() {
            Some(index + 1)
        } else {
            self.loop_to
        }
    }

    fn enter_successor(&mut self, now: f32) -> Option<Phase> {
        let index = self.successor(self.active?.index)?;
        self.enter(index, now);
        Some(self.steps[index].phase)
    }

    fn enter(&mut self, index: usize, now: f32) {
        self.active = Some(Active {
            index,
            start_time: now,
            completed: false,
            gate_open: false,
        });
    }
}
