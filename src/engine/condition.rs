//! Activation conditions and their poll sources
//!
//! Exactly one condition is active at a time. Process and window-title
//! sources are level-driven: the polled value IS the desired lock state.
//! Hotkey sources are edge-triggered: each physical press inverts the lock.

use crate::constants::{
    CONDITION_POLL_INTERVAL_MS, HOTKEY_POLL_INTERVAL_MS, HOTKEY_REFRACTORY_MS,
};
use crate::system::{KeyStateProbe, SystemInventory};
use anyhow::{Context, Result};
use global_hotkey::{
    hotkey::{Code, HotKey, Modifiers},
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use log::info;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Key combination for the hotkey condition.
///
/// Carries both the `global_hotkey` code (for OS registration) and the raw
/// Windows virtual-key id (for the polled fallback). Modifiers are the
/// general bitmask form; a single modifier is just a one-bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeySpec {
    pub code: Code,
    pub modifiers: Modifiers,
    pub vk: u32,
}

/// User-selected activation condition. Plain value handed in by the
/// configuration layer; validation happens at that boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationCondition {
    /// Engine idle, lock always off.
    None,
    /// Toggled by an edge-triggered global key press.
    Hotkey(HotkeySpec),
    /// Locked while a process with this image name is running.
    ProcessPresence { image_name: String },
    /// Locked while the foreground window title exactly matches.
    WindowTitle { title: String },
}

/// What a single poll of a condition source produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Desired lock state right now (level-driven sources).
    Level(bool),
    /// Number of press edges since the last poll; each one inverts the lock.
    Toggles(u32),
}

/// Pollable view of one activation condition.
pub trait ConditionSource: Send {
    /// Evaluate the condition once. A failure means "no information this
    /// tick": the caller holds its previous state and keeps polling.
    fn poll(&mut self, system: &dyn SystemInventory) -> Result<Signal>;

    /// How long the condition loop sleeps between polls of this source.
    fn poll_interval(&self) -> Duration;

    /// Release any OS-level registration. Called before the source is
    /// replaced and on shutdown.
    fn teardown(&mut self) {}

    fn describe(&self) -> String;
}

// ============================================================================
// Hotkey (OS-registered)
// ============================================================================

/// Owns the OS hotkey registration. Lives with the façade on the caller's
/// thread; the engine's source only consumes the event stream by id.
pub struct HotkeyManager {
    manager: GlobalHotKeyManager,
    current: Option<HotKey>,
}

impl HotkeyManager {
    pub fn new() -> Result<Self> {
        let manager =
            GlobalHotKeyManager::new().context("Failed to create global hotkey manager")?;
        Ok(Self {
            manager,
            current: None,
        })
    }

    /// Register `spec`, unregistering any previous combination first.
    /// Returns the event id the engine should match against.
    ///
    /// Failure (e.g. the combination is already claimed by another
    /// application) is non-fatal to the engine; the caller decides how to
    /// surface it.
    pub fn register(&mut self, spec: &HotkeySpec) -> Result<u32> {
        self.unregister()?;

        let modifiers = if spec.modifiers.is_empty() {
            None
        } else {
            Some(spec.modifiers)
        };
        let hotkey = HotKey::new(modifiers, spec.code);

        self.manager
            .register(hotkey)
            .with_context(|| format!("Failed to register hotkey {:?}", spec.code))?;

        self.current = Some(hotkey);
        info!("Hotkey registered: {:?}+{:?}", spec.modifiers, spec.code);
        Ok(hotkey.id())
    }

    /// Unregister the current combination, if any. Idempotent.
    pub fn unregister(&mut self) -> Result<()> {
        if let Some(hotkey) = self.current.take() {
            self.manager
                .unregister(hotkey)
                .context("Failed to unregister hotkey")?;
            info!("Hotkey unregistered");
        }
        Ok(())
    }
}

/// Edge source fed by the OS "hotkey fired" event queue.
///
/// `hotkey_id` is None when registration failed: the condition stays
/// selected but inert until re-registration succeeds.
pub struct RegisteredHotkeySource {
    hotkey_id: Option<u32>,
}

impl RegisteredHotkeySource {
    pub fn new(hotkey_id: Option<u32>) -> Self {
        Self { hotkey_id }
    }
}

impl ConditionSource for RegisteredHotkeySource {
    fn poll(&mut self, _system: &dyn SystemInventory) -> Result<Signal> {
        let mut presses = 0u32;
        while let Ok(event) = GlobalHotKeyEvent::receiver().try_recv() {
            if self.hotkey_id == Some(event.id) && event.state == HotKeyState::Pressed {
                presses += 1;
            }
        }
        Ok(Signal::Toggles(presses))
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(HOTKEY_POLL_INTERVAL_MS)
    }

    fn describe(&self) -> String {
        match self.hotkey_id {
            Some(id) => format!("hotkey (registered, id {})", id),
            None => "hotkey (registration failed, inert)".to_string(),
        }
    }
}

// ============================================================================
// Hotkey (polled fallback)
// ============================================================================

/// Edge source sampling raw key-down state, for when OS hotkey registration
/// is unavailable.
///
/// The full chord must be down at once: the main key plus every configured
/// modifier. A refractory window after each detected press keeps a single
/// physical press from registering multiple toggles.
pub struct PolledHotkeySource {
    vk: u32,
    modifier_vks: Vec<u32>,
    probe: Arc<dyn KeyStateProbe>,
    was_down: bool,
    last_toggle: Option<Instant>,
    refractory: Duration,
}

impl PolledHotkeySource {
    pub fn new(vk: u32, modifier_vks: Vec<u32>, probe: Arc<dyn KeyStateProbe>) -> Self {
        Self {
            vk,
            modifier_vks,
            probe,
            was_down: false,
            last_toggle: None,
            refractory: Duration::from_millis(HOTKEY_REFRACTORY_MS),
        }
    }

    /// Override the refractory window (primarily for tests).
    pub fn with_refractory(mut self, refractory: Duration) -> Self {
        self.refractory = refractory;
        self
    }
}

impl ConditionSource for PolledHotkeySource {
    fn poll(&mut self, _system: &dyn SystemInventory) -> Result<Signal> {
        let down = self.probe.is_key_down(self.vk)
            && self.modifier_vks.iter().all(|&vk| self.probe.is_key_down(vk));
        let edge = down && !self.was_down;
        self.was_down = down;

        if !edge {
            return Ok(Signal::Toggles(0));
        }

        let in_refractory = self
            .last_toggle
            .is_some_and(|t| t.elapsed() < self.refractory);
        if in_refractory {
            return Ok(Signal::Toggles(0));
        }

        self.last_toggle = Some(Instant::now());
        Ok(Signal::Toggles(1))
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(HOTKEY_POLL_INTERVAL_MS)
    }

    fn describe(&self) -> String {
        format!("hotkey (polled, vk 0x{:02X})", self.vk)
    }
}

// ============================================================================
// Process presence
// ============================================================================

/// Level source: locked while a process with the configured image name runs.
pub struct ProcessPresenceSource {
    image_name: String,
    interval: Duration,
}

impl ProcessPresenceSource {
    pub fn new(image_name: String, interval: Option<Duration>) -> Self {
        Self {
            image_name,
            interval: interval.unwrap_or(Duration::from_millis(CONDITION_POLL_INTERVAL_MS)),
        }
    }
}

impl ConditionSource for ProcessPresenceSource {
    fn poll(&mut self, system: &dyn SystemInventory) -> Result<Signal> {
        let names = system.running_process_names()?;
        let present = names
            .iter()
            .any(|n| n.eq_ignore_ascii_case(&self.image_name));
        Ok(Signal::Level(present))
    }

    fn poll_interval(&self) -> Duration {
        self.interval
    }

    fn describe(&self) -> String {
        format!("process presence ({})", self.image_name)
    }
}

// ============================================================================
// Window title
// ============================================================================

/// Level source: locked while the foreground window title matches exactly
/// (case-sensitive).
pub struct WindowTitleSource {
    title: String,
    interval: Duration,
}

impl WindowTitleSource {
    pub fn new(title: String, interval: Option<Duration>) -> Self {
        Self {
            title,
            interval: interval.unwrap_or(Duration::from_millis(CONDITION_POLL_INTERVAL_MS)),
        }
    }
}

impl ConditionSource for WindowTitleSource {
    fn poll(&mut self, system: &dyn SystemInventory) -> Result<Signal> {
        let title = system.foreground_window_title()?;
        Ok(Signal::Level(title == self.title))
    }

    fn poll_interval(&self) -> Duration {
        self.interval
    }

    fn describe(&self) -> String {
        format!("window title ({:?})", self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::mock::MockSystem;
    use std::thread;

    #[test]
    fn test_process_presence_is_case_insensitive() {
        let mock = MockSystem::new();
        let mut source = ProcessPresenceSource::new("Game.exe".to_string(), None);

        mock.set_processes(&["explorer.exe", "GAME.EXE"]);
        assert_eq!(source.poll(&mock).unwrap(), Signal::Level(true));

        mock.set_processes(&["explorer.exe"]);
        assert_eq!(source.poll(&mock).unwrap(), Signal::Level(false));
    }

    #[test]
    fn test_window_title_is_case_sensitive() {
        let mock = MockSystem::new();
        let mut source = WindowTitleSource::new("Notepad".to_string(), None);

        mock.set_foreground_title("notepad");
        assert_eq!(
            source.poll(&mock).unwrap(),
            Signal::Level(false),
            "Lowercase title must not match"
        );

        mock.set_foreground_title("Notepad");
        assert_eq!(source.poll(&mock).unwrap(), Signal::Level(true));
    }

    #[test]
    fn test_polled_hotkey_edge_and_refractory() {
        let mock = MockSystem::new();
        let mut source = PolledHotkeySource::new(0x77, vec![], Arc::new(mock.clone()))
            .with_refractory(Duration::from_millis(200));

        // Press: one toggle on the edge, none while held
        mock.set_key_down(0x77, true);
        assert_eq!(source.poll(&mock).unwrap(), Signal::Toggles(1));
        assert_eq!(source.poll(&mock).unwrap(), Signal::Toggles(0));

        // Release and bounce back within the refractory window: suppressed
        mock.set_key_down(0x77, false);
        assert_eq!(source.poll(&mock).unwrap(), Signal::Toggles(0));
        mock.set_key_down(0x77, true);
        assert_eq!(
            source.poll(&mock).unwrap(),
            Signal::Toggles(0),
            "Press inside refractory window must not toggle"
        );

        // After the window passes, a fresh press toggles again
        mock.set_key_down(0x77, false);
        source.poll(&mock).unwrap();
        thread::sleep(Duration::from_millis(250));
        mock.set_key_down(0x77, true);
        assert_eq!(source.poll(&mock).unwrap(), Signal::Toggles(1));
    }

    #[test]
    fn test_polled_hotkey_requires_full_chord() {
        let mock = MockSystem::new();
        // ctrl+alt+F8: VK_CONTROL and VK_MENU must be down with the key
        let mut source = PolledHotkeySource::new(0x77, vec![0x11, 0x12], Arc::new(mock.clone()))
            .with_refractory(Duration::from_millis(0));

        mock.set_key_down(0x77, true);
        assert_eq!(
            source.poll(&mock).unwrap(),
            Signal::Toggles(0),
            "Bare key without modifiers must not toggle"
        );

        mock.set_key_down(0x11, true);
        assert_eq!(
            source.poll(&mock).unwrap(),
            Signal::Toggles(0),
            "Partial chord must not toggle"
        );

        mock.set_key_down(0x12, true);
        assert_eq!(source.poll(&mock).unwrap(), Signal::Toggles(1));

        // Dropping one modifier while the key stays held is a release
        mock.set_key_down(0x11, false);
        assert_eq!(source.poll(&mock).unwrap(), Signal::Toggles(0));
    }

    #[test]
    fn test_inert_registered_hotkey_never_toggles() {
        let mock = MockSystem::new();
        let mut source = RegisteredHotkeySource::new(None);
        assert_eq!(source.poll(&mock).unwrap(), Signal::Toggles(0));
    }
}
