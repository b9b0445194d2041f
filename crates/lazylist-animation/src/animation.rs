//! Animation specs: easing curves, tweens and springs.

/// Linear interpolation between two values of the same type.
pub trait Lerp {
    fn lerp(&self, target: &Self, fraction: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        self + (target - self) * fraction
    }
}

impl Lerp for f64 {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        self + (target - self) * fraction as f64
    }
}

impl Lerp for i32 {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        (*self as f32).lerp(&(*target as f32), fraction).round() as i32
    }
}

/// Maps linear progress in `[0, 1]` to eased progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Material standard curve.
    FastOutSlowIn,
    LinearOutSlowIn,
    FastOutLinearIn,
    /// Custom curve through control points `(x1, y1)` and `(x2, y2)`.
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    pub fn transform(&self, fraction: f32) -> f32 {
        let (x1, y1, x2, y2) = match *self {
            Easing::Linear => return fraction,
            Easing::EaseIn => (0.42, 0.0, 1.0, 1.0),
            Easing::EaseOut => (0.0, 0.0, 0.58, 1.0),
            Easing::EaseInOut => (0.42, 0.0, 0.58, 1.0),
            Easing::FastOutSlowIn => (0.4, 0.0, 0.2, 1.0),
            Easing::LinearOutSlowIn => (0.0, 0.0, 0.2, 1.0),
            Easing::FastOutLinearIn => (0.4, 0.0, 1.0, 1.0),
            Easing::CubicBezier(x1, y1, x2, y2) => (x1, y1, x2, y2),
        };
        CubicCurve::new(x1, y1, x2, y2).solve(fraction)
    }
}

/// Polynomial coefficients of a unit cubic bezier on one axis.
#[derive(Clone, Copy)]
struct Polynomial {
    a: f32,
    b: f32,
    c: f32,
}

impl Polynomial {
    fn through(p1: f32, p2: f32) -> Self {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        Self { a: 1.0 - c - b, b, c }
    }

    fn sample(self, t: f32) -> f32 {
        ((self.a * t + self.b) * t + self.c) * t
    }

    fn slope(self, t: f32) -> f32 {
        (3.0 * self.a * t + 2.0 * self.b) * t + self.c
    }
}

struct CubicCurve {
    x: Polynomial,
    y: Polynomial,
}

impl CubicCurve {
    const EPSILON: f32 = 1e-6;

    fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: Polynomial::through(x1, x2),
            y: Polynomial::through(y1, y2),
        }
    }

    fn solve(&self, fraction: f32) -> f32 {
        if fraction <= 0.0 {
            return 0.0;
        }
        if fraction >= 1.0 {
            return 1.0;
        }
        let t = self
            .newton(fraction)
            .unwrap_or_else(|| self.bisect(fraction));
        self.y.sample(t)
    }

    fn newton(&self, fraction: f32) -> Option<f32> {
        let mut t = fraction;
        for _ in 0..8 {
            let error = self.x.sample(t) - fraction;
            if error.abs() < Self::EPSILON {
                return Some(t);
            }
            let slope = self.x.slope(t);
            if slope.abs() < Self::EPSILON {
                return None;
            }
            t = (t - error / slope).clamp(0.0, 1.0);
        }
        None
    }

    fn bisect(&self, fraction: f32) -> f32 {
        let (mut low, mut high) = (0.0f32, 1.0f32);
        let mut t = fraction;
        for _ in 0..16 {
            let error = self.x.sample(t) - fraction;
            if error.abs() < Self::EPSILON {
                break;
            }
            if error > 0.0 {
                high = t;
            } else {
                low = t;
            }
            t = 0.5 * (low + high);
        }
        t
    }
}

/// Duration based animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSpec {
    pub duration_millis: u64,
    pub easing: Easing,
    pub delay_millis: u64,
}

impl AnimationSpec {
    pub fn tween(duration_millis: u64, easing: Easing) -> Self {
        Self {
            duration_millis,
            easing,
            delay_millis: 0,
        }
    }

    pub fn linear(duration_millis: u64) -> Self {
        Self::tween(duration_millis, Easing::Linear)
    }

    pub fn with_delay(mut self, delay_millis: u64) -> Self {
        self.delay_millis = delay_millis;
        self
    }

    pub fn total_duration_nanos(&self) -> u64 {
        (self.delay_millis + self.duration_millis) * 1_000_000
    }
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self::tween(300, Easing::FastOutSlowIn)
    }
}

pub const DAMPING_RATIO_NO_BOUNCY: f32 = 1.0;
pub const DAMPING_RATIO_LOW_BOUNCY: f32 = 0.75;

pub const STIFFNESS_HIGH: f32 = 10_000.0;
pub const STIFFNESS_MEDIUM: f32 = 1500.0;
/// Used for item placement and for springs substituted on interruption.
pub const STIFFNESS_MEDIUM_LOW: f32 = 400.0;
pub const STIFFNESS_LOW: f32 = 200.0;

/// Physics based animation.
///
/// `damping_ratio` of 1.0 is critically damped, below that the spring
/// overshoots. The animation ends once both the velocity and the distance to
/// the target drop below their thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringSpec {
    pub damping_ratio: f32,
    pub stiffness: f32,
    pub velocity_threshold: f32,
    pub position_threshold: f32,
}

impl SpringSpec {
    pub fn new(damping_ratio: f32, stiffness: f32) -> Self {
        assert!(stiffness > 0.0, "spring stiffness must be positive");
        assert!(damping_ratio >= 0.0, "damping ratio must not be negative");
        Self {
            damping_ratio,
            stiffness,
            velocity_threshold: 0.01,
            position_threshold: 0.001,
        }
    }

    pub fn default_spring() -> Self {
        Self::new(DAMPING_RATIO_NO_BOUNCY, STIFFNESS_MEDIUM)
    }

    pub fn bouncy() -> Self {
        Self::new(0.5, STIFFNESS_MEDIUM)
    }

    pub fn stiff() -> Self {
        Self::new(DAMPING_RATIO_NO_BOUNCY, 3000.0)
    }

    /// Values within `threshold` of the target (and moving slower than
    /// `threshold` per second) count as settled.
    pub fn with_visibility_threshold(mut self, threshold: f32) -> Self {
        self.position_threshold = threshold;
        self.velocity_threshold = threshold;
        self
    }
}

impl Default for SpringSpec {
    fn default() -> Self {
        Self::default_spring()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationType {
    Tween(AnimationSpec),
    Spring(SpringSpec),
}

impl AnimationType {
    pub fn is_spring(&self) -> bool {
        matches!(self, AnimationType::Spring(_))
    }
}

impl Default for AnimationType {
    fn default() -> Self {
        AnimationType::Spring(SpringSpec::default())
    }
}

impl From<SpringSpec> for AnimationType {
    fn from(spec: SpringSpec) -> Self {
        AnimationType::Spring(spec)
    }
}

impl From<AnimationSpec> for AnimationType {
    fn from(spec: AnimationSpec) -> Self {
        AnimationType::Tween(spec)
    }
}

#[cfg(test)]
#[path = "tests/animation_tests.rs"]
mod tests;
