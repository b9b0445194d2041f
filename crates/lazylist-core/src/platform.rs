//! Platform abstraction for runtime scheduling.
//!
//! The runtime never drives frames itself. The host (an event loop, or a test
//! harness) is told that work is pending and then pumps frame callbacks and
//! tasks at a time of its choosing.

/// Schedules work for the runtime.
///
/// Implementations must be safe to use from multiple threads because task
/// wakers may be cloned across threads.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host schedule a new frame.
    fn schedule_frame(&self);
}
