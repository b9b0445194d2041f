use super::*;

#[test]
fn set_notifies_only_on_change() {
    let state = MutableState::new(1);
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    state.subscribe(move || counter.set(counter.get() + 1));
    state.set(1);
    assert_eq!(calls.get(), 0);
    assert_eq!(state.version(), 0);
    state.set(2);
    assert_eq!(calls.get(), 1);
    assert_eq!(state.version(), 1);
    assert_eq!(state.get(), 2);
}

#[test]
fn update_always_notifies() {
    let state = MutableState::new(vec![1]);
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    state.subscribe(move || counter.set(counter.get() + 1));
    state.update(|values| values.push(2));
    assert_eq!(calls.get(), 1);
    assert_eq!(state.with(|values| values.len()), 2);
}

#[test]
fn unsubscribed_callback_is_not_called() {
    let state = MutableState::new(0);
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let id = state.subscribe(move || counter.set(counter.get() + 1));
    state.unsubscribe(id);
    state.set(5);
    assert_eq!(calls.get(), 0);
}

#[test]
fn subscriber_may_write_back_during_notification() {
    let state = MutableState::new(0);
    let mirror = MutableState::new(0);
    let source = state.clone();
    let target = mirror.clone();
    state.subscribe(move || target.set(source.get() * 10));
    state.set(3);
    assert_eq!(mirror.get(), 30);
}

#[test]
fn observe_reads_reports_innermost_scope_only() {
    let a = MutableState::new(1);
    let b = MutableState::new(2);
    let ((_, inner), outer) = observe_reads(|| {
        a.get();
        observe_reads(|| b.get())
    });
    assert_eq!(outer, vec![a.id()]);
    assert_eq!(inner, vec![b.id()]);
}

#[test]
fn read_only_view_shares_value() {
    let state = MutableState::new("a".to_string());
    let view = state.as_state();
    state.set("b".to_string());
    assert_eq!(view.get(), "b");
    assert_eq!(view.id(), state.id());
}
