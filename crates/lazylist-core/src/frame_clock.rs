//! Explicit frame ticker handed to every animation.
//!
//! Nothing in the engine reaches for a global scheduler: an animation that
//! wants to advance asks its `FrameClock` for the next frame and is resumed
//! when the host drains frame callbacks with a timestamp.

use crate::runtime::RuntimeHandle;
use crate::FrameCallbackId;
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

#[derive(Clone, Debug)]
pub struct FrameClock {
    runtime: RuntimeHandle,
}

impl FrameClock {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self { runtime }
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.clone()
    }

    /// Runs `callback` with the next frame time in nanoseconds.
    ///
    /// Dropping the returned registration before the frame unregisters the
    /// callback.
    pub fn with_frame_nanos(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> FrameCallbackRegistration {
        let id = self.runtime.register_frame_callback(callback);
        FrameCallbackRegistration {
            runtime: self.runtime.clone(),
            id,
        }
    }

    pub fn with_frame_millis(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> FrameCallbackRegistration {
        self.with_frame_nanos(move |nanos| callback(nanos / 1_000_000))
    }

    /// Suspends until the next frame and yields its time in nanoseconds.
    pub fn next_frame(&self) -> NextFrame {
        NextFrame {
            clock: self.clone(),
            slot: Rc::new(RefCell::new(FrameSlot::Idle)),
        }
    }
}

/// Keeps a frame callback registered for as long as it is alive.
pub struct FrameCallbackRegistration {
    runtime: RuntimeHandle,
    id: Option<FrameCallbackId>,
}

impl FrameCallbackRegistration {
    /// False when the runtime was already gone at registration time, or after
    /// [`cancel`](Self::cancel).
    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_frame_callback(id);
        }
    }
}

impl Drop for FrameCallbackRegistration {
    fn drop(&mut self) {
        self.release();
    }
}

enum FrameSlot {
    Idle,
    Waiting {
        // Dropping the future drops this and unregisters the callback.
        registration: FrameCallbackRegistration,
        waker: Waker,
    },
    Fired(u64),
}

/// Future returned by [`FrameClock::next_frame`].
pub struct NextFrame {
    clock: FrameClock,
    slot: Rc<RefCell<FrameSlot>>,
}

impl Future for NextFrame {
    type Output = u64;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        {
            let mut slot = self.slot.borrow_mut();
            match &mut *slot {
                FrameSlot::Fired(time) => return Poll::Ready(*time),
                FrameSlot::Waiting { waker, .. } => {
                    if !waker.will_wake(cx.waker()) {
                        *waker = cx.waker().clone();
                    }
                    return Poll::Pending;
                }
                FrameSlot::Idle => {}
            }
        }
        let weak = Rc::downgrade(&self.slot);
        let registration = self.clock.with_frame_nanos(move |time| {
            let Some(slot) = weak.upgrade() else {
                return;
            };
            let previous = std::mem::replace(&mut *slot.borrow_mut(), FrameSlot::Fired(time));
            if let FrameSlot::Waiting {
                waker,
                registration,
            } = previous
            {
                drop(registration);
                waker.wake();
            }
        });
        *self.slot.borrow_mut() = FrameSlot::Waiting {
            registration,
            waker: cx.waker().clone(),
        };
        Poll::Pending
    }
}

#[cfg(test)]
#[path = "tests/frame_clock_tests.rs"]
mod tests;
