//! Closed form damped harmonic oscillator.
//!
//! Positions are evaluated analytically from the start state, so sampling at
//! irregular frame times neither accumulates error nor depends on frame rate.

use crate::animation::SpringSpec;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringSimulation {
    spec: SpringSpec,
    target: f32,
}

impl SpringSimulation {
    pub fn new(spec: SpringSpec, target: f32) -> Self {
        Self { spec, target }
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn spec(&self) -> SpringSpec {
        self.spec
    }

    /// Position and velocity (units per second) `elapsed_nanos` after
    /// starting at `start` with `start_velocity`.
    pub fn update(&self, start: f32, start_velocity: f32, elapsed_nanos: u64) -> (f32, f32) {
        let t = elapsed_nanos as f64 / 1_000_000_000.0;
        let displacement = (start - self.target) as f64;
        let velocity = start_velocity as f64;
        let zeta = self.spec.damping_ratio as f64;
        let omega = (self.spec.stiffness as f64).sqrt();

        let (x, v) = if zeta > 1.0 {
            let s = omega * (zeta * zeta - 1.0).sqrt();
            let gamma_plus = -zeta * omega + s;
            let gamma_minus = -zeta * omega - s;
            let coeff_b = (gamma_minus * displacement - velocity) / (gamma_minus - gamma_plus);
            let coeff_a = displacement - coeff_b;
            let e_minus = (gamma_minus * t).exp();
            let e_plus = (gamma_plus * t).exp();
            (
                coeff_a * e_minus + coeff_b * e_plus,
                coeff_a * gamma_minus * e_minus + coeff_b * gamma_plus * e_plus,
            )
        } else if (zeta - 1.0).abs() < f64::EPSILON {
            let coeff_a = displacement;
            let coeff_b = velocity + omega * displacement;
            let decay = (-omega * t).exp();
            let x = (coeff_a + coeff_b * t) * decay;
            (x, x * -omega + coeff_b * decay)
        } else {
            let r = -zeta * omega;
            let damped = omega * (1.0 - zeta * zeta).sqrt();
            let cos_coeff = displacement;
            let sin_coeff = (-r * displacement + velocity) / damped;
            let decay = (r * t).exp();
            let (sin, cos) = (damped * t).sin_cos();
            let x = decay * (cos_coeff * cos + sin_coeff * sin);
            let v = x * r + decay * (-damped * cos_coeff * sin + damped * sin_coeff * cos);
            (x, v)
        };
        ((x + self.target as f64) as f32, v as f32)
    }

    pub fn is_at_rest(&self, value: f32, velocity: f32) -> bool {
        velocity.abs() < self.spec.velocity_threshold
            && (value - self.target).abs() < self.spec.position_threshold
    }
}

#[cfg(test)]
#[path = "tests/spring_simulation_tests.rs"]
mod tests;
