use lazylist_core::FrameClock;

use crate::animation::AnimationType;
use crate::target_based_animation::TargetBasedAnimation;

/// Value and velocity carried between consecutive suspendable animations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    pub value: f32,
    /// Units per second.
    pub velocity: f32,
    pub last_frame_time_nanos: Option<u64>,
    pub is_running: bool,
}

/// Per-frame view handed to the block of [`AnimationState::animate_to`].
#[derive(Debug)]
pub struct AnimationScope {
    value: f32,
    velocity: f32,
    target_value: f32,
    frame_time_nanos: u64,
    running: bool,
}

impl AnimationScope {
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target_value(&self) -> f32 {
        self.target_value
    }

    pub fn frame_time_nanos(&self) -> u64 {
        self.frame_time_nanos
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ends the animation after the current frame. Value and velocity stay
    /// where they are.
    pub fn cancel_animation(&mut self) {
        self.running = false;
    }
}

impl AnimationState {
    pub fn new(value: f32) -> Self {
        Self::with_velocity(value, 0.0)
    }

    pub fn with_velocity(value: f32, velocity: f32) -> Self {
        Self {
            value,
            velocity,
            last_frame_time_nanos: None,
            is_running: false,
        }
    }

    /// Same velocity and frame time, different value.
    pub fn copy_with_value(&self, value: f32) -> Self {
        Self {
            value,
            is_running: false,
            ..*self
        }
    }

    /// Animates towards `target`, calling `block` once per frame after the
    /// value has been updated, including the final frame.
    ///
    /// With `sequential` set and a previous frame on record, play time is
    /// measured from that frame so back to back animations lose no frame.
    /// Dropping the returned future stops the animation at the last value
    /// handed to `block`.
    pub async fn animate_to(
        &mut self,
        target: f32,
        animation: AnimationType,
        clock: &FrameClock,
        sequential: bool,
        mut block: impl FnMut(&mut AnimationScope),
    ) {
        let run = TargetBasedAnimation::new(animation, self.value, self.velocity, target);
        let (start_time, mut pending_first_frame) = match self.last_frame_time_nanos {
            Some(last) if sequential => (last, false),
            _ => (clock.next_frame().await, true),
        };
        self.is_running = true;
        let mut scope = AnimationScope {
            value: self.value,
            velocity: self.velocity,
            target_value: target,
            frame_time_nanos: start_time,
            running: true,
        };
        loop {
            let frame_time = if pending_first_frame {
                pending_first_frame = false;
                start_time
            } else {
                clock.next_frame().await
            };
            let play_time = frame_time.saturating_sub(start_time);
            scope.value = run.value_at(play_time);
            scope.velocity = run.velocity_at(play_time);
            scope.frame_time_nanos = frame_time;
            if run.is_finished(play_time) {
                scope.running = false;
            }
            block(&mut scope);
            self.value = scope.value;
            self.velocity = scope.velocity;
            self.last_frame_time_nanos = Some(frame_time);
            if !scope.running {
                break;
            }
        }
        self.is_running = false;
    }
}

#[cfg(test)]
#[path = "tests/animation_state_tests.rs"]
mod tests;
