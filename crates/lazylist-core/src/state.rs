//! Observable value cells.
//!
//! A [`MutableState`] is a shared, versioned cell: every read is reported to
//! the innermost [`observe_reads`] scope and every effective write bumps the
//! version and notifies subscribers. Values that must be readable without
//! being observed should live in plain `Cell`s next to the state instead.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

static NEXT_STATE_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static READ_SCOPES: RefCell<Vec<Vec<StateId>>> = const { RefCell::new(Vec::new()) };
}

fn record_read(id: StateId) {
    READ_SCOPES.with(|scopes| {
        if let Some(scope) = scopes.borrow_mut().last_mut() {
            if !scope.contains(&id) {
                scope.push(id);
            }
        }
    });
}

struct ReadScopeGuard;

impl Drop for ReadScopeGuard {
    fn drop(&mut self) {
        READ_SCOPES.with(|scopes| {
            scopes.borrow_mut().pop();
        });
    }
}

/// Runs `block` and returns the ids of the states it read, in first-read
/// order. Scopes nest; reads are only reported to the innermost one.
pub fn observe_reads<R>(block: impl FnOnce() -> R) -> (R, Vec<StateId>) {
    READ_SCOPES.with(|scopes| scopes.borrow_mut().push(Vec::new()));
    let guard = ReadScopeGuard;
    let result = block();
    let reads = READ_SCOPES.with(|scopes| scopes.borrow_mut().last_mut().map(std::mem::take));
    drop(guard);
    (result, reads.unwrap_or_default())
}

struct StateCell<T> {
    id: StateId,
    value: RefCell<T>,
    version: Cell<u64>,
    subscribers: RefCell<Vec<(SubscriptionId, Rc<dyn Fn()>)>>,
    next_subscription: Cell<u64>,
}

pub struct MutableState<T> {
    inner: Rc<StateCell<T>>,
}

impl<T> Clone for MutableState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for MutableState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableState")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.borrow())
            .field("version", &self.inner.version.get())
            .finish()
    }
}

impl<T: 'static> MutableState<T> {
    pub fn new(value: T) -> Self {
        let id = StateId(NEXT_STATE_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            inner: Rc::new(StateCell {
                id,
                value: RefCell::new(value),
                version: Cell::new(0),
                subscribers: RefCell::new(Vec::new()),
                next_subscription: Cell::new(1),
            }),
        }
    }

    pub fn id(&self) -> StateId {
        self.inner.id
    }

    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(|value| value.clone())
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        record_read(self.inner.id);
        f(&self.inner.value.borrow())
    }

    /// Stores `value`; subscribers hear about it only when it differs from
    /// the current one.
    pub fn set(&self, value: T)
    where
        T: PartialEq,
    {
        let changed = {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        };
        if changed {
            self.notify();
        }
    }

    /// Mutates in place and always notifies.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.inner.value.borrow_mut());
        self.notify();
        result
    }

    pub fn subscribe(&self, callback: impl Fn() + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_subscription.get());
        self.inner.next_subscription.set(id.0 + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Rc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .subscribers
            .borrow_mut()
            .retain(|(candidate, _)| *candidate != id);
    }

    pub fn as_state(&self) -> State<T> {
        State {
            inner: self.clone(),
        }
    }

    fn notify(&self) {
        self.inner.version.set(self.inner.version.get() + 1);
        // Callbacks may subscribe, unsubscribe or write again.
        let callbacks: Vec<Rc<dyn Fn()>> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in callbacks {
            callback();
        }
    }
}

/// Read-only view of a [`MutableState`].
pub struct State<T> {
    inner: MutableState<T>,
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl<T: 'static> State<T> {
    pub fn id(&self) -> StateId {
        self.inner.id()
    }

    pub fn version(&self) -> u64 {
        self.inner.version()
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.with(f)
    }

    pub fn subscribe(&self, callback: impl Fn() + 'static) -> SubscriptionId {
        self.inner.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.unsubscribe(id)
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
