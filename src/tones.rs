//! Transition notification tones
//!
//! A short ascending pair marks engagement, the descending pair marks
//! disengagement. Played exactly once per transition, never on unchanged
//! ticks, and suppressed entirely while muted.

use crate::app_state::LockState;
use crate::constants::{TONE_DURATION_MS, TONE_HIGH_HZ, TONE_LOW_HZ};
use crate::system::TonePlayer;
use std::sync::Arc;

pub struct ToneSink {
    player: Arc<dyn TonePlayer>,
    state: LockState,
}

impl ToneSink {
    pub fn new(player: Arc<dyn TonePlayer>, state: LockState) -> Self {
        Self { player, state }
    }

    /// Ascending pair (lock engaged).
    pub fn play_engage(&self) {
        if self.state.is_muted() {
            return;
        }
        self.player.play_tone(TONE_LOW_HZ, TONE_DURATION_MS);
        self.player.play_tone(TONE_HIGH_HZ, TONE_DURATION_MS);
    }

    /// Descending pair (lock disengaged).
    pub fn play_disengage(&self) {
        if self.state.is_muted() {
            return;
        }
        self.player.play_tone(TONE_HIGH_HZ, TONE_DURATION_MS);
        self.player.play_tone(TONE_LOW_HZ, TONE_DURATION_MS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::mock::MockSystem;

    #[test]
    fn test_tone_pairs() {
        let mock = MockSystem::new();
        let state = LockState::new();
        let sink = ToneSink::new(Arc::new(mock.clone()), state.clone());

        sink.play_engage();
        sink.play_disengage();
        assert_eq!(
            mock.ops(),
            vec![
                "tone(500,20)",
                "tone(700,20)",
                "tone(700,20)",
                "tone(500,20)"
            ]
        );
    }

    #[test]
    fn test_muted_suppresses_tones() {
        let mock = MockSystem::new();
        let state = LockState::new();
        state.set_muted(true);
        let sink = ToneSink::new(Arc::new(mock.clone()), state);

        sink.play_engage();
        sink.play_disengage();
        assert_eq!(mock.count("tone"), 0, "Muted sink must stay silent");
    }
}
