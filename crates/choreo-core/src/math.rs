/// Hash float to [0,1) - port of GLSL hash11
pub fn hash11(p: f32) -> f32 {
    let mut p = (p * 0.1031).fract();
    p *= p + 33.33;
    p *= p + p;
    fract(p)
}

/// GLSL `fract`: always in [0,1), also for negative input.
#[inline]
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// GLSL-style `mix(a, b, t)` for scalars.
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Smooth interpolation - port of GLSL smoothstep
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Clamp into [0,1], mapping NaN to 0.
///
/// Every progress value that reaches position math goes through here.
#[inline]
pub fn unit_clamp(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// `1 - (1-x)^3`. Zero exit velocity.
pub fn ease_out_cubic(x: f32) -> f32 {
    let inv = 1.0 - unit_clamp(x);
    1.0 - inv * inv * inv
}

/// `1 - (1-x)^4`. Zero exit velocity, snappier start than cubic.
pub fn ease_out_quart(x: f32) -> f32 {
    let inv = 1.0 - unit_clamp(x);
    1.0 - inv * inv * inv * inv
}

/// Symmetric cubic; fastest at the midpoint.
pub fn ease_in_out_cubic(x: f32) -> f32 {
    let x = unit_clamp(x);
    if x < 0.5 {
        4.0 * x * x * x
    } else {
        let f = -2.0 * x + 2.0;
        1.0 - f * f * f / 2.0
    }
}

/// Exponential approach normalised so that `damped(1, rate) == 1`, driven
/// through `ease_out_cubic` so the exit velocity is zero.
///
/// `rate` is the decay rate over the whole phase (damping speed × duration).
pub fn ease_damped(x: f32, rate: f32) -> f32 {
    let x = ease_out_cubic(x);
    if rate <= 1.0e-4 || rate.is_nan() {
        return x;
    }
    unit_clamp((1.0 - (-rate * x).exp()) / (1.0 - (-rate).exp()))
}

/// Easing curve attached to a phase.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    Linear,
    /// Settle: `1 - (1-x)^3`
    OutCubic,
    /// Settle: `1 - (1-x)^4`
    OutQuart,
    /// Morph between two shapes.
    InOutCubic,
    /// Exponential settle with the given whole-phase decay rate.
    Damped(f32),
}

impl Easing {
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Easing::Linear => unit_clamp(x),
            Easing::OutCubic => ease_out_cubic(x),
            Easing::OutQuart => ease_out_quart(x),
            Easing::InOutCubic => ease_in_out_cubic(x),
            Easing::Damped(rate) => ease_damped(x, rate),
        }
    }
}

/// Normalised phase progress: `clamp(elapsed / duration, 0, 1)`, NaN → 0.
///
/// Negative elapsed time (clock reset) reads as 0; a zero duration reads as
/// already finished unless elapsed is also zero.
pub fn phase_progress(elapsed: f32, duration: f32) -> f32 {
    unit_clamp(elapsed / duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easings_hit_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::OutCubic,
            Easing::OutQuart,
            Easing::InOutCubic,
            Easing::Damped(6.0),
        ] {
            assert!(easing.apply(0.0).abs() < 1e-6, "{:?} at 0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{:?} at 1", easing);
        }
    }

    #[test]
    fn test_settle_easing_zero_exit_velocity() {
        let h = 1.0e-3;
        for f in [ease_out_cubic as fn(f32) -> f32, ease_out_quart] {
            let slope = (f(1.0) - f(1.0 - h)) / h;
            assert!(slope < 1.0e-3, "exit slope should vanish, got {}", slope);
        }
    }

    #[test]
    fn test_damped_easing_settles_with_zero_exit_velocity() {
        let h = 1.0e-2;
        for rate in [0.5, 5.0, 12.0] {
            let slope = (ease_damped(1.0, rate) - ease_damped(1.0 - h, rate)) / h;
            assert!(slope < 1.0e-3, "rate {}: exit slope {}", rate, slope);
        }
        // still monotonic on the way in
        let mut prev = 0.0;
        for i in 1..=20 {
            let v = ease_damped(i as f32 / 20.0, 5.0);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn test_in_out_cubic_fastest_at_midpoint() {
        let h = 1.0e-3;
        let slope = |x: f32| (ease_in_out_cubic(x + h) - ease_in_out_cubic(x - h)) / (2.0 * h);
        let mid = slope(0.5);
        for x in [0.1, 0.25, 0.4, 0.6, 0.75, 0.9] {
            assert!(slope(x) < mid, "slope at {} should be below midpoint slope", x);
        }
        // symmetric
        assert!((slope(0.25) - slope(0.75)).abs() < 1e-2);
    }

    #[test]
    fn test_phase_progress_sanitizes() {
        assert_eq!(phase_progress(-1.0, 2.0), 0.0);
        assert_eq!(phase_progress(5.0, 2.0), 1.0);
        assert_eq!(phase_progress(0.0, 0.0), 0.0);
        assert_eq!(phase_progress(1.0, 0.0), 1.0);
        assert_eq!(phase_progress(f32::NAN, 1.0), 0.0);
        assert_eq!(phase_progress(1.0, -2.0), 0.0);
    }

    #[test]
    fn test_fract_negative() {
        assert!((fract(-0.25) - 0.75).abs() < 1e-6);
    }
}
