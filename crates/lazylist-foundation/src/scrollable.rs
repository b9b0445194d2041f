//! Scroll contracts and the single-owner scroll session.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use lazylist_core::{RuntimeHandle, TaskHandle};

/// Receiver for scroll deltas inside a scroll session.
///
/// `pixels` follows the content direction: positive values move towards the
/// end of the content. Returns the part of the delta that was consumed.
pub trait ScrollScope {
    fn scroll_by(&mut self, pixels: f32) -> f32;
}

/// Anything that consumes scroll deltas.
pub trait ScrollableState {
    /// Applies `delta` outside of any scroll session and returns the consumed
    /// amount.
    fn dispatch_raw_delta(&self, delta: f32) -> f32;

    fn is_scroll_in_progress(&self) -> bool;

    fn can_scroll_forward(&self) -> bool;

    fn can_scroll_backward(&self) -> bool;
}

/// Held by a running scroll session; dropping it ends the session.
#[derive(Debug)]
pub struct MutationGuard {
    current: Rc<Cell<Option<u64>>>,
    session: u64,
}

impl MutationGuard {
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Whether this guard still owns the session. Once another session has
    /// started this turns false.
    pub fn is_current(&self) -> bool {
        self.current.get() == Some(self.session)
    }
}

impl Drop for MutationGuard {
    fn drop(&mut self) {
        if self.current.get() == Some(self.session) {
            self.current.set(None);
        }
    }
}

/// Allows one scroll session at a time.
///
/// Starting a session cancels the previous one. Tasks are dropped when
/// cancelled, so the previous session has fully terminated by the time the
/// new one is spawned.
#[derive(Debug, Default)]
pub struct MutatorMutex {
    current: Rc<Cell<Option<u64>>>,
    task: RefCell<Option<TaskHandle>>,
    next_session: Cell<u64>,
}

impl MutatorMutex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels whatever session is running and spawns `block` as the new one.
    ///
    /// Returns `None` when the runtime is gone; the session is not started
    /// in that case.
    pub fn mutate<Fut>(
        &self,
        runtime: &RuntimeHandle,
        block: impl FnOnce(MutationGuard) -> Fut,
    ) -> Option<TaskHandle>
    where
        Fut: Future<Output = ()> + 'static,
    {
        self.cancel();
        let session = self.next_session.get() + 1;
        self.next_session.set(session);
        self.current.set(Some(session));
        let guard = MutationGuard {
            current: self.current.clone(),
            session,
        };
        let handle = runtime.spawn_ui(block(guard));
        if handle.is_none() {
            log::debug!("runtime dropped, scroll session {session} not started");
            self.current.set(None);
        }
        *self.task.borrow_mut() = handle.clone();
        handle
    }

    /// Stops the running session, if any.
    pub fn cancel(&self) {
        let task = self.task.borrow_mut().take();
        if let Some(task) = task {
            if task.is_active() {
                log::trace!("cancelling scroll task {}", task.id());
            }
            task.cancel();
        }
        self.current.set(None);
    }

    pub fn is_mutating(&self) -> bool {
        self.current.get().is_some()
    }
}

#[cfg(test)]
#[path = "tests/scrollable_tests.rs"]
mod tests;
