//! Animation primitives for the lazy list engine.
//!
//! Two drivers share one set of specs:
//! [`Animatable`] advances itself from frame callbacks and is what item
//! placement animations use, while [`AnimationState::animate_to`] is an async
//! loop that a scroll session awaits frame by frame.

mod animatable;
mod animation;
mod animation_state;
mod spring_simulation;
mod target_based_animation;

pub use animatable::Animatable;
pub use animation::{
    AnimationSpec, AnimationType, Easing, Lerp, SpringSpec, DAMPING_RATIO_LOW_BOUNCY,
    DAMPING_RATIO_NO_BOUNCY, STIFFNESS_HIGH, STIFFNESS_LOW, STIFFNESS_MEDIUM,
    STIFFNESS_MEDIUM_LOW,
};
pub use animation_state::{AnimationScope, AnimationState};
pub use spring_simulation::SpringSimulation;
pub use target_based_animation::TargetBasedAnimation;
