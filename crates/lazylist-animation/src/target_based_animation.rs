use crate::animation::{AnimationType, Lerp};
use crate::spring_simulation::SpringSimulation;

/// A single run from `initial` to `target`, sampled by play time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetBasedAnimation {
    animation: AnimationType,
    initial: f32,
    initial_velocity: f32,
    target: f32,
}

impl TargetBasedAnimation {
    pub fn new(animation: AnimationType, initial: f32, initial_velocity: f32, target: f32) -> Self {
        Self {
            animation,
            initial,
            initial_velocity,
            target,
        }
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn initial(&self) -> f32 {
        self.initial
    }

    pub fn animation(&self) -> AnimationType {
        self.animation
    }

    pub fn value_at(&self, play_time_nanos: u64) -> f32 {
        match self.animation {
            AnimationType::Tween(spec) => {
                let elapsed = play_time_nanos.saturating_sub(spec.delay_millis * 1_000_000);
                let duration = (spec.duration_millis * 1_000_000).max(1);
                let linear = (elapsed as f64 / duration as f64).clamp(0.0, 1.0) as f32;
                if linear >= 1.0 {
                    return self.target;
                }
                self.initial.lerp(&self.target, spec.easing.transform(linear))
            }
            AnimationType::Spring(spec) => {
                let simulation = SpringSimulation::new(spec, self.target);
                let (value, velocity) =
                    simulation.update(self.initial, self.initial_velocity, play_time_nanos);
                if simulation.is_at_rest(value, velocity) {
                    self.target
                } else {
                    value
                }
            }
        }
    }

    /// Velocity in units per second.
    pub fn velocity_at(&self, play_time_nanos: u64) -> f32 {
        match self.animation {
            AnimationType::Tween(_) => {
                if self.is_finished(play_time_nanos) {
                    return 0.0;
                }
                const STEP_NANOS: u64 = 1_000_000;
                let before = play_time_nanos.saturating_sub(STEP_NANOS);
                let span = (play_time_nanos - before).max(1) as f32 / 1_000_000_000.0;
                (self.value_at(play_time_nanos) - self.value_at(before)) / span
            }
            AnimationType::Spring(spec) => {
                let simulation = SpringSimulation::new(spec, self.target);
                let (value, velocity) =
                    simulation.update(self.initial, self.initial_velocity, play_time_nanos);
                if simulation.is_at_rest(value, velocity) {
                    0.0
                } else {
                    velocity
                }
            }
        }
    }

    pub fn is_finished(&self, play_time_nanos: u64) -> bool {
        match self.animation {
            AnimationType::Tween(spec) => play_time_nanos >= spec.total_duration_nanos(),
            AnimationType::Spring(spec) => {
                let simulation = SpringSimulation::new(spec, self.target);
                let (value, velocity) =
                    simulation.update(self.initial, self.initial_velocity, play_time_nanos);
                simulation.is_at_rest(value, velocity)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/target_based_animation_tests.rs"]
mod tests;
