use crate::collections::map::HashSet;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use crate::frame_clock::FrameClock;
use crate::platform::RuntimeScheduler;
use crate::FrameCallbackId;

/// Upper bound on poll rounds performed by a single [`RuntimeHandle::drain_ui`].
///
/// A task that wakes itself on every poll would otherwise spin forever.
const MAX_DRAIN_ROUNDS: usize = 64;

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    needs_frame: Cell<bool>,
    frame_callbacks: RefCell<VecDeque<FrameCallbackEntry>>,
    next_frame_callback_id: Cell<u64>,
    local_tasks: RefCell<VecDeque<Box<dyn FnOnce() + 'static>>>,
    tasks: RefCell<Vec<TaskEntry>>,
    live_tasks: RefCell<HashSet<u64>>,
    next_task_id: Cell<u64>,
    task_waker: RefCell<Option<Waker>>,
    woken: Arc<AtomicBool>,
    // Tasks are moved out of `tasks` while they are polled; cancellations that
    // arrive during that window are parked here and applied after the poll.
    polling: Cell<bool>,
    cancelled_while_polling: RefCell<HashSet<u64>>,
}

struct TaskEntry {
    id: u64,
    future: Pin<Box<dyn Future<Output = ()> + 'static>>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            scheduler,
            needs_frame: Cell::new(false),
            frame_callbacks: RefCell::new(VecDeque::new()),
            next_frame_callback_id: Cell::new(1),
            local_tasks: RefCell::new(VecDeque::new()),
            tasks: RefCell::new(Vec::new()),
            live_tasks: RefCell::new(HashSet::default()),
            next_task_id: Cell::new(1),
            task_waker: RefCell::new(None),
            woken: Arc::new(AtomicBool::new(false)),
            polling: Cell::new(false),
            cancelled_while_polling: RefCell::new(HashSet::default()),
        }
    }

    fn init_task_waker(this: &Rc<Self>) {
        let waker = RuntimeTaskWaker {
            scheduler: this.scheduler.clone(),
            woken: this.woken.clone(),
        }
        .into_waker();
        *this.task_waker.borrow_mut() = Some(waker);
    }

    fn schedule(&self) {
        self.needs_frame.set(true);
        self.scheduler.schedule_frame();
    }

    fn has_frame_callbacks(&self) -> bool {
        !self.frame_callbacks.borrow().is_empty()
    }

    fn has_pending_tasks(&self) -> bool {
        !self.live_tasks.borrow().is_empty() || !self.local_tasks.borrow().is_empty()
    }

    fn enqueue_ui_task(&self, task: Box<dyn FnOnce() + 'static>) {
        self.local_tasks.borrow_mut().push_back(task);
        self.schedule();
    }

    fn spawn_ui_task(&self, future: Pin<Box<dyn Future<Output = ()> + 'static>>) -> u64 {
        let id = self.next_task_id.get();
        self.next_task_id.set(id + 1);
        self.tasks.borrow_mut().push(TaskEntry { id, future });
        self.live_tasks.borrow_mut().insert(id);
        self.schedule();
        id
    }

    fn is_task_active(&self, id: u64) -> bool {
        self.live_tasks.borrow().contains(&id)
    }

    fn cancel_task(&self, id: u64) {
        if !self.live_tasks.borrow_mut().remove(&id) {
            return;
        }
        let removed = {
            let mut tasks = self.tasks.borrow_mut();
            tasks
                .iter()
                .position(|entry| entry.id == id)
                .map(|index| tasks.remove(index))
        };
        match removed {
            // Dropped outside the borrow: the future's destructors may call
            // back into the runtime.
            Some(entry) => drop(entry),
            None => {
                if self.polling.get() {
                    self.cancelled_while_polling.borrow_mut().insert(id);
                }
            }
        }
    }

    fn run_local_tasks(&self) -> bool {
        let mut executed = false;
        loop {
            let task = self.local_tasks.borrow_mut().pop_front();
            match task {
                Some(task) => {
                    executed = true;
                    task();
                }
                None => break,
            }
        }
        executed
    }

    fn poll_async_tasks(&self) -> bool {
        let waker = match self.task_waker.borrow().as_ref() {
            Some(waker) => waker.clone(),
            None => return false,
        };
        let mut cx = Context::from_waker(&waker);
        let tasks = std::mem::take(&mut *self.tasks.borrow_mut());
        if tasks.is_empty() {
            return false;
        }
        self.polling.set(true);
        let mut pending = Vec::with_capacity(tasks.len());
        let mut made_progress = false;
        for mut entry in tasks {
            if self.cancelled_while_polling.borrow().contains(&entry.id) {
                continue;
            }
            match entry.future.as_mut().poll(&mut cx) {
                Poll::Ready(()) => {
                    made_progress = true;
                    self.live_tasks.borrow_mut().remove(&entry.id);
                }
                Poll::Pending => {
                    if self.cancelled_while_polling.borrow().contains(&entry.id) {
                        made_progress = true;
                    } else {
                        pending.push(entry);
                    }
                }
            }
        }
        self.polling.set(false);
        self.cancelled_while_polling.borrow_mut().clear();
        if !pending.is_empty() {
            let mut tasks = self.tasks.borrow_mut();
            // Tasks spawned during this round were pushed behind our back; keep
            // the older ones first so polling order stays stable.
            let spawned = std::mem::take(&mut *tasks);
            tasks.extend(pending);
            tasks.extend(spawned);
        }
        made_progress
    }

    fn drain_ui(&self) {
        let mut rounds = 0;
        loop {
            let ran_local = self.run_local_tasks();
            self.woken.store(false, Ordering::Release);
            let completed = self.poll_async_tasks();
            let woken = self.woken.load(Ordering::Acquire);
            if !ran_local && !completed && !woken {
                break;
            }
            rounds += 1;
            if rounds >= MAX_DRAIN_ROUNDS {
                log::warn!(
                    "drain_ui stopped after {} rounds with tasks still waking",
                    MAX_DRAIN_ROUNDS
                );
                self.schedule();
                return;
            }
        }
        self.refresh_needs_frame();
    }

    fn register_frame_callback(&self, callback: Box<dyn FnOnce(u64) + 'static>) -> FrameCallbackId {
        let id = self.next_frame_callback_id.get();
        self.next_frame_callback_id.set(id + 1);
        self.frame_callbacks
            .borrow_mut()
            .push_back(FrameCallbackEntry {
                id,
                callback: Some(callback),
            });
        self.schedule();
        id
    }

    fn cancel_frame_callback(&self, id: FrameCallbackId) {
        let removed = {
            let mut callbacks = self.frame_callbacks.borrow_mut();
            callbacks
                .iter()
                .position(|entry| entry.id == id)
                .and_then(|index| callbacks.remove(index))
        };
        drop(removed);
        self.refresh_needs_frame();
    }

    fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        let pending: Vec<Box<dyn FnOnce(u64) + 'static>> = {
            let mut callbacks = self.frame_callbacks.borrow_mut();
            callbacks
                .drain(..)
                .filter_map(|mut entry| entry.callback.take())
                .collect()
        };
        for callback in pending {
            callback(frame_time_nanos);
        }
        self.refresh_needs_frame();
    }

    fn refresh_needs_frame(&self) {
        let callbacks_pending = self
            .frame_callbacks
            .try_borrow()
            .map(|callbacks| !callbacks.is_empty())
            .unwrap_or(true);
        let local_pending = self
            .local_tasks
            .try_borrow()
            .map(|tasks| !tasks.is_empty())
            .unwrap_or(true);
        if !callbacks_pending && !local_pending && !self.woken.load(Ordering::Acquire) {
            self.needs_frame.set(false);
        }
    }
}

/// Owner of the single-threaded runtime.
///
/// Everything the lazy list engine schedules (frame callbacks for animations,
/// scroll sessions, placement animations) lives here. Dropping the runtime
/// drops every pending task and callback.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        let inner = Rc::new(RuntimeInner::new(scheduler));
        RuntimeInner::init_task_waker(&inner);
        Self { inner }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn needs_frame(&self) -> bool {
        self.inner.needs_frame.get()
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.handle())
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(Arc::new(DefaultScheduler))
    }
}

/// Scheduler that ignores frame requests. The host polls `needs_frame`.
#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}

/// Scheduler that counts frame requests, for tests and headless hosts.
#[derive(Default)]
pub struct TestScheduler {
    requested: AtomicUsize,
}

impl TestScheduler {
    pub fn frames_requested(&self) -> usize {
        self.requested.load(Ordering::Relaxed)
    }
}

impl RuntimeScheduler for TestScheduler {
    fn schedule_frame(&self) {
        self.requested.fetch_add(1, Ordering::Relaxed);
    }
}

/// Weak handle to a [`Runtime`].
///
/// All operations become no-ops once the runtime has been dropped.
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Weak<RuntimeInner>,
}

impl std::fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Handle to a task spawned with [`RuntimeHandle::spawn_ui`].
#[derive(Clone, Debug)]
pub struct TaskHandle {
    id: u64,
    runtime: RuntimeHandle,
}

impl RuntimeHandle {
    /// A handle that was never attached to a runtime.
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn schedule(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.schedule();
        }
    }

    /// Queues a closure that runs on the next [`drain_ui`](Self::drain_ui).
    pub fn enqueue_ui_task(&self, task: Box<dyn FnOnce() + 'static>) {
        if let Some(inner) = self.inner.upgrade() {
            inner.enqueue_ui_task(task);
        } else {
            task();
        }
    }

    pub fn spawn_ui<F>(&self, fut: F) -> Option<TaskHandle>
    where
        F: Future<Output = ()> + 'static,
    {
        self.inner.upgrade().map(|inner| {
            let id = inner.spawn_ui_task(Box::pin(fut));
            TaskHandle {
                id,
                runtime: self.clone(),
            }
        })
    }

    /// Cancels a task. The future is dropped at its current suspension point;
    /// if the task is being polled right now it is dropped once that poll
    /// returns.
    pub fn cancel_task(&self, id: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_task(id);
        }
    }

    pub fn is_task_active(&self, id: u64) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.is_task_active(id))
            .unwrap_or(false)
    }

    /// Runs queued closures and polls spawned tasks until none of them make
    /// further progress.
    pub fn drain_ui(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.drain_ui();
        }
    }

    pub fn has_pending_tasks(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.has_pending_tasks())
            .unwrap_or(false)
    }

    pub fn register_frame_callback(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> Option<FrameCallbackId> {
        self.inner
            .upgrade()
            .map(|inner| inner.register_frame_callback(Box::new(callback)))
    }

    pub fn cancel_frame_callback(&self, id: FrameCallbackId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_frame_callback(id);
        }
    }

    /// Invokes every frame callback registered before this call.
    ///
    /// Callbacks registered while draining run on the next frame.
    pub fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.drain_frame_callbacks(frame_time_nanos);
        }
    }

    pub fn has_frame_callbacks(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.has_frame_callbacks())
            .unwrap_or(false)
    }

    pub fn needs_frame(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.needs_frame.get())
            .unwrap_or(false)
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.clone())
    }
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.runtime.is_task_active(self.id)
    }

    pub fn cancel(self) {
        self.runtime.cancel_task(self.id);
    }
}

struct FrameCallbackEntry {
    id: FrameCallbackId,
    callback: Option<Box<dyn FnOnce(u64) + 'static>>,
}

struct RuntimeTaskWaker {
    scheduler: Arc<dyn RuntimeScheduler>,
    woken: Arc<AtomicBool>,
}

impl RuntimeTaskWaker {
    fn into_waker(self) -> Waker {
        futures_task::waker(Arc::new(self))
    }
}

impl futures_task::ArcWake for RuntimeTaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.woken.store(true, Ordering::Release);
        arc_self.scheduler.schedule_frame();
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
