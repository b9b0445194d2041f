use super::*;
use std::cell::Cell;

#[test]
fn cached_value_is_reused_across_passes() {
    let mut state: SubcomposeState<u32> = SubcomposeState::default();
    let created = Cell::new(0);
    let make = || {
        created.set(created.get() + 1);
        created.get() * 100
    };
    state.begin_pass();
    assert_eq!(state.subcompose(SlotId::new(1), make), 100);
    state.finish_pass();
    state.begin_pass();
    assert_eq!(state.subcompose(SlotId::new(1), make), 100);
    state.finish_pass();
    assert_eq!(created.get(), 1);
    let stats = state.stats();
    assert_eq!(stats.total_composed, 1);
    assert_eq!(stats.reuse_count, 1);
}

#[test]
#[should_panic(expected = "subcomposed twice in one pass")]
fn duplicate_slot_in_one_pass_panics() {
    let mut state: SubcomposeState<u32> = SubcomposeState::default();
    state.begin_pass();
    state.subcompose(SlotId::new(7), || 1);
    state.subcompose(SlotId::new(7), || 2);
}

#[test]
fn inactive_slots_move_to_reusable_pool() {
    let mut state: SubcomposeState<u32> = SubcomposeState::default();
    state.begin_pass();
    state.subcompose(SlotId::new(1), || 1);
    state.subcompose(SlotId::new(2), || 2);
    state.finish_pass();
    state.begin_pass();
    state.subcompose(SlotId::new(2), || 20);
    let disposed = state.finish_pass();
    assert!(disposed.is_empty());
    let stats = state.stats();
    assert_eq!(stats.active, 1);
    assert_eq!(stats.reusable, 1);
    assert!(state.contains(SlotId::new(1)));
    assert!(!state.is_active(SlotId::new(1)));
}

#[test]
fn pool_overflow_disposes_oldest_slots() {
    let mut state: SubcomposeState<u64> = SubcomposeState::new(Box::new(RetainCountPolicy(2)));
    state.begin_pass();
    for raw in 0..4 {
        state.subcompose(SlotId::new(raw), || raw);
    }
    state.finish_pass();
    state.begin_pass();
    let disposed = state.finish_pass();
    // Slots requested earlier in the last pass sit at the front of the pool.
    assert_eq!(disposed.as_slice(), &[SlotId::new(3), SlotId::new(2)]);
    assert!(state.contains(SlotId::new(0)));
    assert!(state.contains(SlotId::new(1)));
}

#[test]
fn explicit_insert_and_evict() {
    let mut state: SubcomposeState<&'static str> = SubcomposeState::default();
    state.begin_pass();
    assert_eq!(state.insert(SlotId::new(3), "a"), None);
    state.finish_pass();
    assert_eq!(state.get(SlotId::new(3)), Some(&"a"));
    assert_eq!(state.evict(SlotId::new(3)), Some("a"));
    assert!(!state.contains(SlotId::new(3)));
}
