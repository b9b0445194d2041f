use std::cell::RefCell;
use std::rc::Rc;

use lazylist_core::{FrameCallbackRegistration, MutableState, RuntimeHandle, State};

use crate::animation::AnimationType;
use crate::target_based_animation::TargetBasedAnimation;

/// A float that animates itself from frame callbacks.
///
/// Starting a new animation while one is running continues from the current
/// value and velocity. The observable [`state`](Self::state) changes on every
/// frame, so subscribers can invalidate whatever depends on the value.
pub struct Animatable {
    inner: Rc<RefCell<AnimatableInner>>,
}

impl Clone for Animatable {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl std::fmt::Debug for Animatable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Animatable")
            .field("value", &inner.value)
            .field("velocity", &inner.velocity)
            .field("target", &inner.target)
            .field("running", &inner.animation.is_some())
            .finish()
    }
}

struct AnimatableInner {
    state: MutableState<f32>,
    runtime: RuntimeHandle,
    value: f32,
    velocity: f32,
    target: f32,
    animation: Option<TargetBasedAnimation>,
    start_time_nanos: Option<u64>,
    registration: Option<FrameCallbackRegistration>,
}

impl Animatable {
    pub fn new(initial: f32, runtime: RuntimeHandle) -> Self {
        let inner = AnimatableInner {
            state: MutableState::new(initial),
            runtime,
            value: initial,
            velocity: 0.0,
            target: initial,
            animation: None,
            start_time_nanos: None,
            registration: None,
        };
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    pub fn value(&self) -> f32 {
        self.inner.borrow().value
    }

    pub fn velocity(&self) -> f32 {
        self.inner.borrow().velocity
    }

    pub fn target(&self) -> f32 {
        self.inner.borrow().target
    }

    pub fn is_running(&self) -> bool {
        self.inner.borrow().animation.is_some()
    }

    pub fn state(&self) -> State<f32> {
        self.inner.borrow().state.as_state()
    }

    /// Animates from the current value and velocity towards `target`.
    pub fn animate_to(&self, target: f32, animation: AnimationType) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.registration = None;
            inner.target = target;
            inner.start_time_nanos = None;
            inner.animation = Some(TargetBasedAnimation::new(
                animation,
                inner.value,
                inner.velocity,
                target,
            ));
        }
        Self::schedule_frame(&self.inner);
    }

    /// Jumps to `value` and stops any running animation.
    pub fn snap_to(&self, value: f32) {
        let state = {
            let mut inner = self.inner.borrow_mut();
            inner.registration = None;
            inner.animation = None;
            inner.start_time_nanos = None;
            inner.value = value;
            inner.target = value;
            inner.velocity = 0.0;
            inner.state.clone()
        };
        state.set(value);
    }

    /// Stops at the current value.
    pub fn stop(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.registration = None;
        inner.animation = None;
        inner.start_time_nanos = None;
        inner.velocity = 0.0;
        inner.target = inner.value;
    }

    fn schedule_frame(this: &Rc<RefCell<AnimatableInner>>) {
        let runtime = {
            let inner = this.borrow();
            if inner.registration.is_some() {
                return;
            }
            inner.runtime.clone()
        };
        let weak = Rc::downgrade(this);
        let registration = runtime.frame_clock().with_frame_nanos(move |time| {
            if let Some(strong) = weak.upgrade() {
                Self::on_frame(&strong, time);
            }
        });
        this.borrow_mut().registration = Some(registration);
    }

    fn on_frame(this: &Rc<RefCell<AnimatableInner>>, frame_time_nanos: u64) {
        let (state, value, running) = {
            let mut inner = this.borrow_mut();
            // Already fired; the runtime dropped its copy of the callback.
            inner.registration = None;
            let Some(animation) = inner.animation else {
                return;
            };
            let start = *inner.start_time_nanos.get_or_insert(frame_time_nanos);
            let play_time = frame_time_nanos.saturating_sub(start);
            if animation.is_finished(play_time) {
                log::trace!(
                    "animation to {} finished after {}ms",
                    animation.target(),
                    play_time / 1_000_000
                );
                inner.value = animation.target();
                inner.velocity = 0.0;
                inner.animation = None;
                inner.start_time_nanos = None;
            } else {
                inner.value = animation.value_at(play_time);
                inner.velocity = animation.velocity_at(play_time);
            }
            (inner.state.clone(), inner.value, inner.animation.is_some())
        };
        if running {
            Self::schedule_frame(this);
        }
        state.set(value);
    }
}

#[cfg(test)]
#[path = "tests/animatable_tests.rs"]
mod tests;
