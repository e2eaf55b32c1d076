use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Lock state shared between the condition loop, the re-centering loop and
/// the UI-facing façade.
///
/// Single writer: only the engine flips `engaged`, on state transitions.
/// Other threads read it for display and for the re-centering cadence.
#[derive(Clone)]
pub struct LockState {
    inner: Arc<Mutex<LockStateInner>>,
}

pub struct LockStateInner {
    /// Whether cursor confinement is currently engaged
    pub engaged: bool,
    /// When the current engagement started (None while disengaged)
    pub engaged_since: Option<Instant>,
    /// Whether notification tones are suppressed
    pub muted: bool,
}

impl LockState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(LockStateInner {
                engaged: false,
                engaged_since: None,
                muted: false,
            })),
        }
    }

    pub fn lock(&self) -> parking_lot::MutexGuard<'_, LockStateInner> {
        self.inner.lock()
    }

    pub fn is_engaged(&self) -> bool {
        self.inner.lock().engaged
    }

    pub fn set_engaged(&self, engaged: bool) {
        let mut state = self.inner.lock();
        state.engaged = engaged;

        if engaged {
            state.engaged_since = Some(Instant::now());
            log::debug!("Lock engaged at {:?}", state.engaged_since);
        } else {
            state.engaged_since = None;
            log::debug!("Lock disengaged");
        }
    }

    pub fn is_muted(&self) -> bool {
        self.inner.lock().muted
    }

    pub fn set_muted(&self, muted: bool) {
        self.inner.lock().muted = muted;
    }

    /// Elapsed time since the lock engaged (in seconds), None while disengaged
    pub fn get_engaged_elapsed_secs(&self) -> Option<u64> {
        let state = self.inner.lock();
        state.engaged_since.map(|t| t.elapsed().as_secs())
    }
}

impl Default for LockState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = LockState::new();
        assert!(!state.is_engaged());
        assert!(!state.is_muted());
        assert!(state.get_engaged_elapsed_secs().is_none());
    }

    #[test]
    fn test_engage_disengage() {
        let state = LockState::new();
        state.set_engaged(true);
        assert!(state.is_engaged());
        state.set_engaged(false);
        assert!(!state.is_engaged());
    }

    #[test]
    fn test_engaged_since_recorded() {
        let state = LockState::new();

        state.set_engaged(true);
        {
            let inner = state.lock();
            assert!(
                inner.engaged_since.is_some(),
                "Engagement time should be recorded"
            );
        }

        state.set_engaged(false);
        {
            let inner = state.lock();
            assert!(
                inner.engaged_since.is_none(),
                "Engagement time should be cleared on disengage"
            );
        }
    }

    #[test]
    fn test_mute_flag() {
        let state = LockState::new();
        state.set_muted(true);
        assert!(state.is_muted());
        state.set_muted(false);
        assert!(!state.is_muted());
    }
}
