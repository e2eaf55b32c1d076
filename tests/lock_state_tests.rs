use cursorlock::app_state::LockState;
use std::thread;
use std::time::Duration;

#[test]
fn test_initial_state() {
    let state = LockState::new();
    assert!(!state.is_engaged());
    assert!(!state.is_muted());
    assert!(state.get_engaged_elapsed_secs().is_none());
}

#[test]
fn test_engage_disengage_cycle() {
    let state = LockState::new();
    state.set_engaged(true);
    assert!(state.is_engaged());
    state.set_engaged(false);
    assert!(!state.is_engaged());
}

#[test]
fn test_engaged_elapsed_tracks_time() {
    let state = LockState::new();
    state.set_engaged(true);
    thread::sleep(Duration::from_millis(1100));
    assert!(
        state.get_engaged_elapsed_secs().unwrap() >= 1,
        "Elapsed seconds should advance while engaged"
    );

    state.set_engaged(false);
    assert!(
        state.get_engaged_elapsed_secs().is_none(),
        "Elapsed should be cleared on disengage"
    );
}

#[test]
fn test_state_is_shared_across_clones() {
    let state = LockState::new();
    let view = state.clone();

    state.set_engaged(true);
    assert!(view.is_engaged(), "Clones must observe the same lock state");

    view.set_muted(true);
    assert!(state.is_muted());
}
