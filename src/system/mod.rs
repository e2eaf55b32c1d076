//! System collaborator interfaces
//!
//! The engine never talks to the OS directly; it goes through these traits so
//! the core can run against the real Win32 backend or the in-memory mock.

pub mod mock;

#[cfg(windows)]
pub mod windows;

use anyhow::Result;

/// Screen-space rectangle in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point of the rectangle.
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// Read-only queries about what is currently running / focused.
///
/// All calls are bounded, non-cancelable OS queries. Failures are transient
/// by contract: callers hold their previous state and retry on the next tick.
pub trait SystemInventory: Send + Sync {
    /// Image names of all running processes (e.g. "Game.exe").
    /// Callers compare case-insensitively.
    fn running_process_names(&self) -> Result<Vec<String>>;

    /// Title of the current foreground window. Empty string if untitled.
    fn foreground_window_title(&self) -> Result<String>;

    /// Bounds of the current foreground window.
    fn foreground_window_rect(&self) -> Result<Rect>;

    /// Bounds of the primary display.
    fn screen_rect(&self) -> Result<Rect>;
}

/// Global cursor manipulation.
pub trait CursorControl: Send + Sync {
    fn set_cursor_position(&self, x: i32, y: i32) -> Result<()>;

    /// Restrict cursor movement to `rect` until released.
    fn confine_cursor(&self, rect: Rect) -> Result<()>;

    /// Remove any active confinement. Safe to call when none is active.
    fn release_confinement(&self) -> Result<()>;
}

/// Fire-and-forget tone output.
pub trait TonePlayer: Send + Sync {
    fn play_tone(&self, frequency_hz: u32, duration_ms: u32);
}

/// Raw key-down sampling, used by the polled hotkey fallback.
pub trait KeyStateProbe: Send + Sync {
    fn is_key_down(&self, vk: u32) -> bool;
}
