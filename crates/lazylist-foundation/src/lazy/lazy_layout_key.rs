//! Stable item identity.

use std::hash::Hash;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use lazylist_core::hash::hash_key;
use lazylist_core::SlotId;

static USER_OVERFLOW_LOGGED: AtomicBool = AtomicBool::new(false);
static INDEX_OVERFLOW_LOGGED: AtomicBool = AtomicBool::new(false);

/// Identity of a list item across data changes.
///
/// Items without a caller supplied key fall back to their position, wrapped
/// in a separate variant so a positional key never equals a caller key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LazyLayoutKey {
    User(u64),
    Index(usize),
}

impl LazyLayoutKey {
    const USER_TAG: u64 = 0b00 << 62;
    const INDEX_TAG: u64 = 0b01 << 62;
    const VALUE_MASK: u64 = (1u64 << 62) - 1;

    /// Key derived from any hashable value (string ids, tuples).
    pub fn of<K: Hash + ?Sized>(key: &K) -> Self {
        LazyLayoutKey::User(hash_key(key))
    }

    /// Slot used to cache the item's materialized content.
    ///
    /// The top two bits tag the variant so user and positional keys land in
    /// disjoint ranges. Payloads wider than 62 bits are mixed down, which
    /// can collide; a warning is logged once per variant when that happens.
    pub fn slot_id(self) -> SlotId {
        let raw = match self {
            LazyLayoutKey::User(key) => {
                Self::USER_TAG | Self::fit(key, "user", &USER_OVERFLOW_LOGGED)
            }
            LazyLayoutKey::Index(index) => {
                Self::INDEX_TAG | Self::fit(index as u64, "index", &INDEX_OVERFLOW_LOGGED)
            }
        };
        SlotId::new(raw)
    }

    pub fn is_user_key(self) -> bool {
        matches!(self, LazyLayoutKey::User(_))
    }

    fn fit(value: u64, kind: &'static str, logged: &AtomicBool) -> u64 {
        if value <= Self::VALUE_MASK {
            return value;
        }
        if !logged.swap(true, Ordering::Relaxed) {
            log::warn!("{kind} key {value:#018x} does not fit in 62 bits, mixing it down");
        }
        let mut mixed = value;
        mixed ^= mixed >> 33;
        mixed = mixed.wrapping_mul(0xff51_afd7_ed55_8ccd);
        mixed ^= mixed >> 33;
        mixed = mixed.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
        mixed ^= mixed >> 33;
        mixed & Self::VALUE_MASK
    }
}

/// Produces the key of an item that has none of its own, given its global
/// index.
pub type KeyFactory = Rc<dyn Fn(usize) -> LazyLayoutKey>;

pub fn default_key_factory() -> KeyFactory {
    Rc::new(LazyLayoutKey::Index)
}
