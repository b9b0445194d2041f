#![doc = r"Single-threaded runtime pieces shared by the lazy list crates."]
#![allow(clippy::missing_const_for_thread_local)]

pub mod collections;
pub mod frame_clock;
pub mod hash;
pub mod platform;
pub mod runtime;
pub mod state;
pub mod subcompose;

pub use frame_clock::{FrameCallbackRegistration, FrameClock, NextFrame};
pub use platform::RuntimeScheduler;
pub use runtime::{DefaultScheduler, Runtime, RuntimeHandle, TaskHandle, TestScheduler};
pub use state::{observe_reads, MutableState, State, StateId, SubscriptionId};
pub use subcompose::{
    DefaultSlotReusePolicy, DisposedSlots, RetainCountPolicy, SlotId, SlotReusePolicy, SubcomposeState,
    SubcomposeStats,
};

pub type FrameCallbackId = u64;

/// Creates an observable cell holding `value`.
pub fn mutable_state_of<T: 'static>(value: T) -> MutableState<T> {
    MutableState::new(value)
}
