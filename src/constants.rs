//! Centralized constants for the cursorlock application
//!
//! This module contains all configurable numerical values used throughout
//! the application. Each constant includes documentation on its purpose,
//! unit, and recommended value range.

// ============================================================================
// POLLING INTERVALS
// ============================================================================

/// Condition poll interval for hotkey sources (registered and polled).
/// Unit: milliseconds
/// Recommended range: 50-150 (lower = more responsive toggle, higher = less CPU)
pub const HOTKEY_POLL_INTERVAL_MS: u64 = 75;

/// Condition poll interval for process-presence and window-title sources.
/// Unit: milliseconds
/// Recommended range: 500-1000 (process enumeration is comparatively expensive)
pub const CONDITION_POLL_INTERVAL_MS: u64 = 750;

/// Re-centering loop interval. Must stay fast enough to counteract user
/// mouse movement, independent of the condition cadence.
/// Unit: milliseconds
/// Recommended range: 15-50
pub const RECENTER_INTERVAL_MS: u64 = 30;

/// Condition loop sleep while no condition is selected.
/// Unit: milliseconds
/// Recommended range: 100-500
pub const IDLE_POLL_INTERVAL_MS: u64 = 250;

/// Sleep between message-pump passes on the hotkey-owning thread. Must stay
/// below HOTKEY_POLL_INTERVAL_MS so pressed hotkeys reach the event receiver
/// before the next condition poll.
/// Unit: milliseconds
/// Recommended range: 5-50
pub const MESSAGE_PUMP_INTERVAL_MS: u64 = 10;

// ============================================================================
// HOTKEY DEBOUNCE
// ============================================================================

/// Refractory window after a detected key press in the polled hotkey
/// fallback. A single physical press must never register multiple toggles.
/// Unit: milliseconds
/// Recommended range: 300-800
pub const HOTKEY_REFRACTORY_MS: u64 = 500;

// ============================================================================
// NOTIFICATION TONES
// ============================================================================

/// Lower pitch of the transition tone pair.
/// Unit: hertz
pub const TONE_LOW_HZ: u32 = 500;

/// Higher pitch of the transition tone pair.
/// Unit: hertz
pub const TONE_HIGH_HZ: u32 = 700;

/// Duration of each tone in a transition pair.
/// Unit: milliseconds
/// Recommended range: 10-100 (playback blocks the condition loop briefly)
pub const TONE_DURATION_MS: u32 = 20;

// ============================================================================
// INTERVAL BOUNDS (config/env validation)
// ============================================================================

/// Minimum accepted condition poll interval override.
/// Unit: milliseconds
pub const CONDITION_POLL_MIN_MS: u64 = 100;

/// Maximum accepted condition poll interval override.
/// Unit: milliseconds
pub const CONDITION_POLL_MAX_MS: u64 = 5000;

/// Minimum accepted re-center interval override.
/// Unit: milliseconds
pub const RECENTER_MIN_MS: u64 = 10;

/// Maximum accepted re-center interval override.
/// Unit: milliseconds
pub const RECENTER_MAX_MS: u64 = 200;
