//! Keyed cache for measure-time subcomposition.
//!
//! [`SubcomposeState`] maps a caller supplied [`SlotId`] to whatever the
//! caller materialized for it (a composed subtree, a list of measurables).
//! Within one pass every slot may be requested at most once; across passes a
//! slot that is requested again gets its cached value back instead of being
//! materialized from scratch. Slots that drop out of a pass are parked in a
//! bounded reusable pool and disposed once the pool overflows.

use crate::collections::map::{HashMap, HashSet};
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::fmt;

/// Identifier for a subcomposed slot.
///
/// Callers provide stable identifiers (usually derived from item keys) so
/// that cached content follows the item rather than its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u64);

impl SlotId {
    #[inline]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Decides how many slots that were active in an earlier pass but not in the
/// current one stay cached.
pub trait SlotReusePolicy: 'static {
    fn max_reusable(&self) -> usize;
}

/// Default maximum of deactivated slots kept for reuse.
const DEFAULT_MAX_REUSABLE: usize = 10;

#[derive(Debug, Default)]
pub struct DefaultSlotReusePolicy;

impl SlotReusePolicy for DefaultSlotReusePolicy {
    fn max_reusable(&self) -> usize {
        DEFAULT_MAX_REUSABLE
    }
}

/// Keeps a fixed number of deactivated slots.
#[derive(Debug, Clone, Copy)]
pub struct RetainCountPolicy(pub usize);

impl SlotReusePolicy for RetainCountPolicy {
    fn max_reusable(&self) -> usize {
        self.0
    }
}

/// Slots dropped from the cache by one call.
pub type DisposedSlots = SmallVec<[SlotId; 4]>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubcomposeStats {
    /// Slots requested in the current (or last finished) pass.
    pub active: usize,
    /// Deactivated slots still cached.
    pub reusable: usize,
    /// Times a slot had to be materialized from scratch.
    pub total_composed: usize,
    /// Times a request was served from the cache.
    pub reuse_count: usize,
}

pub struct SubcomposeState<T> {
    cache: HashMap<SlotId, T>,
    active: HashSet<SlotId>,
    active_order: Vec<SlotId>,
    previous_order: Vec<SlotId>,
    // Most recently deactivated at the front.
    reusable: VecDeque<SlotId>,
    policy: Box<dyn SlotReusePolicy>,
    in_pass: bool,
    total_composed: usize,
    reuse_count: usize,
}

impl<T> fmt::Debug for SubcomposeState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubcomposeState")
            .field("cached", &self.cache.len())
            .field("active_order", &self.active_order)
            .field("reusable", &self.reusable)
            .field("in_pass", &self.in_pass)
            .finish()
    }
}

impl<T> Default for SubcomposeState<T> {
    fn default() -> Self {
        Self::new(Box::new(DefaultSlotReusePolicy))
    }
}

impl<T> SubcomposeState<T> {
    pub fn new(policy: Box<dyn SlotReusePolicy>) -> Self {
        Self {
            cache: HashMap::default(),
            active: HashSet::default(),
            active_order: Vec::new(),
            previous_order: Vec::new(),
            reusable: VecDeque::new(),
            policy,
            in_pass: false,
            total_composed: 0,
            reuse_count: 0,
        }
    }

    pub fn set_policy(&mut self, policy: Box<dyn SlotReusePolicy>) {
        self.policy = policy;
    }

    /// Starts a new pass. Every slot may be subcomposed once until
    /// [`finish_pass`](Self::finish_pass).
    pub fn begin_pass(&mut self) {
        if self.in_pass {
            log::warn!("begin_pass called twice without finish_pass");
        }
        self.in_pass = true;
        self.previous_order = std::mem::take(&mut self.active_order);
        self.active.clear();
    }

    pub fn is_in_pass(&self) -> bool {
        self.in_pass
    }

    /// Returns the value for `slot`, materializing it with `create` only when
    /// nothing is cached.
    ///
    /// # Panics
    ///
    /// Panics if `slot` was already subcomposed in the current pass.
    pub fn subcompose(&mut self, slot: SlotId, create: impl FnOnce() -> T) -> T
    where
        T: Clone,
    {
        self.activate(slot);
        if let Some(value) = self.cache.get(&slot) {
            self.reuse_count += 1;
            return value.clone();
        }
        let value = create();
        self.total_composed += 1;
        self.cache.insert(slot, value.clone());
        value
    }

    /// Marks `slot` active for this pass and stores `value` for it,
    /// replacing anything cached.
    ///
    /// # Panics
    ///
    /// Panics if `slot` was already subcomposed in the current pass.
    pub fn insert(&mut self, slot: SlotId, value: T) -> Option<T> {
        self.activate(slot);
        self.total_composed += 1;
        self.cache.insert(slot, value)
    }

    /// Drops the cached value of `slot` regardless of its state.
    pub fn evict(&mut self, slot: SlotId) -> Option<T> {
        self.reusable.retain(|candidate| *candidate != slot);
        self.cache.remove(&slot)
    }

    pub fn contains(&self, slot: SlotId) -> bool {
        self.cache.contains_key(&slot)
    }

    pub fn get(&self, slot: SlotId) -> Option<&T> {
        self.cache.get(&slot)
    }

    pub fn is_active(&self, slot: SlotId) -> bool {
        self.active.contains(&slot)
    }

    /// Slots subcomposed in the current pass, in request order.
    pub fn active_slots(&self) -> &[SlotId] {
        &self.active_order
    }

    /// Ends the pass. Slots not requested in it move to the reusable pool;
    /// the overflow of that pool is disposed and returned.
    pub fn finish_pass(&mut self) -> DisposedSlots {
        self.in_pass = false;
        let previous = std::mem::take(&mut self.previous_order);
        for slot in previous.into_iter().rev() {
            if !self.active.contains(&slot) && self.cache.contains_key(&slot) {
                self.reusable.retain(|candidate| *candidate != slot);
                self.reusable.push_front(slot);
            }
        }
        let max = self.policy.max_reusable();
        let mut disposed = DisposedSlots::new();
        while self.reusable.len() > max {
            if let Some(slot) = self.reusable.pop_back() {
                self.cache.remove(&slot);
                disposed.push(slot);
            }
        }
        disposed
    }

    /// Drops every cached value, active or not.
    pub fn clear(&mut self) -> DisposedSlots {
        let disposed: DisposedSlots = self.cache.keys().copied().collect();
        self.cache.clear();
        self.reusable.clear();
        self.active.clear();
        self.active_order.clear();
        self.previous_order.clear();
        disposed
    }

    pub fn stats(&self) -> SubcomposeStats {
        SubcomposeStats {
            active: self.active_order.len(),
            reusable: self.reusable.len(),
            total_composed: self.total_composed,
            reuse_count: self.reuse_count,
        }
    }

    fn activate(&mut self, slot: SlotId) {
        assert!(
            self.active.insert(slot),
            "slot {slot:?} subcomposed twice in one pass"
        );
        self.active_order.push(slot);
        self.reusable.retain(|candidate| *candidate != slot);
    }
}

#[cfg(test)]
#[path = "tests/subcompose_tests.rs"]
mod tests;
