//! Pointer-driven scene state: idle detection, drag rotation, hover glow.
//!
//! None of this touches particle attributes. Rotation is handed to the
//! integration layer as a scene transform and hover scales the base-size
//! uniform.

use crate::config::InteractionConfig;

/// Largest step the hover spring integrates at once.
const MAX_SPRING_STEP: f32 = 1.0 / 30.0;
/// Longest frame gap integrated step by step. Anything longer jumps to rest.
const MAX_SPRING_GAP: f32 = 2.0;

/// Pointer input in normalised viewport coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
    /// Pointer entered (`true`) or left (`false`) the particle body.
    Hover(bool),
}

#[derive(Clone, Copy, Debug)]
pub struct IdleDetector {
    last_input: f32,
    idle: bool,
}

impl Default for IdleDetector {
    fn default() -> Self {
        Self {
            last_input: 0.0,
            idle: false,
        }
    }
}

impl IdleDetector {
    pub fn is_idle(&self) -> bool {
        self.idle
    }

    /// Record input. Returns `Some(false)` if this ended an idle period.
    pub fn touch(&mut self, now: f32) -> Option<bool> {
        self.last_input = now;
        if self.idle {
            self.idle = false;
            Some(false)
        } else {
            None
        }
    }

    /// Returns `Some(true)` the first frame the timeout is exceeded.
    pub fn update(&mut self, now: f32, timeout: f32) -> Option<bool> {
        if !self.idle && now - self.last_input >= timeout {
            self.idle = true;
            Some(true)
        } else {
            None
        }
    }
}

/// Yaw around the tree axis, with inertia after release.
#[derive(Clone, Copy, Debug, Default)]
pub struct DragRotation {
    angle: f32,
    velocity: f32,
    dragging: bool,
    last_x: f32,
    last_time: f32,
}

impl DragRotation {
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn begin(&mut self, x: f32, now: f32) {
        self.dragging = true;
        self.velocity = 0.0;
        self.last_x = x;
        self.last_time = now;
    }

    pub fn drag(&mut self, x: f32, now: f32, sensitivity: f32) {
        if !self.dragging {
            return;
        }
        let delta = (x - self.last_x) * sensitivity;
        let dt = (now - self.last_time).max(1.0 / 240.0);
        self.angle += delta;
        self.velocity = delta / dt;
        self.last_x = x;
        self.last_time = now;
    }

    pub fn end(&mut self) {
        self.dragging = false;
    }

    /// Coast on released velocity; drift slowly while idle.
    pub fn update(&mut self, dt: f32, idle: bool, config: &InteractionConfig) {
        if self.dragging || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.angle += self.velocity * dt;
        self.velocity *= (-config.rotation_damping * dt).exp();
        if idle {
            self.angle += config.auto_rotate_speed * dt;
        }
    }
}

/// Critically damped spring toward 0 (away) or 1 (hovering).
#[derive(Clone, Copy, Debug, Default)]
pub struct HoverGlow {
    value: f32,
    velocity: f32,
    target: f32,
}

impl HoverGlow {
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set_hovering(&mut self, hovering: bool) {
        self.target = if hovering { 1.0 } else { 0.0 };
    }

    pub fn update(&mut self, dt: f32, stiffness: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let omega = stiffness.max(0.0).sqrt();
        if dt > MAX_SPRING_GAP {
            self.value = self.target;
            self.velocity = 0.0;
            return;
        }
        let steps = (dt / MAX_SPRING_STEP).ceil().max(1.0) as u32;
        let h = dt / steps as f32;
        for _ in 0..steps {
            let accel = stiffness * (self.target - self.value) - 2.0 * omega * self.velocity;
            self.velocity += accel * h;
            self.value += self.velocity * h;
        }
        self.value = self.value.clamp(0.0, 1.0);
    }
}

/// Everything the scene tracks about the pointer.
#[derive(Clone, Copy, Debug, Default)]
pub struct Interaction {
    idle: IdleDetector,
    rotation: DragRotation,
    hover: HoverGlow,
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        self.idle.is_idle()
    }

    pub fn rotation(&self) -> f32 {
        self.rotation.angle()
    }

    pub fn hover(&self) -> f32 {
        self.hover.value()
    }

    /// Apply one pointer event. Returns an idle-state change, if any.
    pub fn pointer(&mut self, event: PointerEvent, now: f32, config: &InteractionConfig) -> Option<bool> {
        match event {
            PointerEvent::Down { x, .. } => self.rotation.begin(x, now),
            PointerEvent::Move { x, .. } => self.rotation.drag(x, now, config.drag_sensitivity),
            PointerEvent::Up => self.rotation.end(),
            PointerEvent::Hover(hovering) => self.hover.set_hovering(hovering),
        }
        self.idle.touch(now)
    }

    /// Per-frame integration. Returns an idle-state change, if any.
    pub fn update(&mut self, now: f32, dt: f32, config: &InteractionConfig) -> Option<bool> {
        let change = self.idle.update(now, config.idle_timeout);
        self.rotation.update(dt, self.idle.is_idle(), config);
        self.hover.update(dt, config.hover_stiffness);
        change
    }
}
