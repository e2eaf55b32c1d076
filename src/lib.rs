// Library interface for cursorlock
// This allows tests and other modules to access the crate's functionality

pub mod app_state;
pub mod config;
pub mod config_file;
pub mod confine;
pub mod constants;
pub mod engine;
pub mod system;
pub mod tones;
pub mod utils;

use anyhow::Result;
use app_state::LockState;
use engine::condition::{
    ActivationCondition, HotkeyManager, PolledHotkeySource, ProcessPresenceSource,
    RegisteredHotkeySource, WindowTitleSource,
};
use engine::{ActivationEngine, EngineConfig};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use system::{CursorControl, KeyStateProbe, SystemInventory, TonePlayer};
use utils::keycode;

/// Options resolved by the configuration layer (file, env, CLI).
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreOptions {
    pub engine: EngineConfig,
    /// Use raw key-state polling instead of OS hotkey registration.
    pub poll_hotkey: bool,
    /// Override for the level-driven condition poll cadence.
    pub condition_interval: Option<Duration>,
    pub muted: bool,
}

/// Core cursorlock functionality shared by the CLI and any future front end.
///
/// Owns the lock state, the activation engine and the OS hotkey
/// registration. Condition changes go through [`set_condition`], which tears
/// the previous condition down synchronously before the next one can ever be
/// evaluated.
///
/// [`set_condition`]: CursorLockCore::set_condition
pub struct CursorLockCore {
    pub state: LockState,
    engine: ActivationEngine,
    hotkey_manager: Option<HotkeyManager>,
    key_probe: Arc<dyn KeyStateProbe>,
    condition: ActivationCondition,
    poll_hotkey: bool,
    condition_interval: Option<Duration>,
}

impl CursorLockCore {
    pub fn new(
        inventory: Arc<dyn SystemInventory>,
        cursor: Arc<dyn CursorControl>,
        player: Arc<dyn TonePlayer>,
        key_probe: Arc<dyn KeyStateProbe>,
        options: CoreOptions,
    ) -> Self {
        let state = LockState::new();
        state.set_muted(options.muted);

        let engine =
            ActivationEngine::new(state.clone(), inventory, cursor, player, options.engine);

        Self {
            state,
            engine,
            hotkey_manager: None,
            key_probe,
            condition: ActivationCondition::None,
            poll_hotkey: options.poll_hotkey,
            condition_interval: options.condition_interval,
        }
    }

    /// Start the condition and re-centering loops.
    pub fn start_background_loops(&mut self) {
        self.engine.start();
        info!("Background loops started");
    }

    /// Select the activation condition, replacing the previous one.
    ///
    /// The previous condition's OS registration is torn down before this
    /// returns; if the lock was engaged it is disengaged (with the usual
    /// side effects) before the new condition is first evaluated.
    ///
    /// A hotkey registration failure is non-fatal: the condition stays
    /// selected but inert, and the error is returned so the caller can
    /// surface it.
    pub fn set_condition(&mut self, condition: ActivationCondition) -> Result<()> {
        // A failed unregister must not strand a half-switched condition; the
        // engine source is replaced below either way.
        if let Some(manager) = self.hotkey_manager.as_mut() {
            if let Err(e) = manager.unregister() {
                warn!("Failed to unregister previous hotkey: {:#}", e);
            }
        }

        let result = match &condition {
            ActivationCondition::None => {
                self.engine.set_source(None);
                Ok(())
            }
            ActivationCondition::Hotkey(spec) => {
                if self.poll_hotkey {
                    self.engine.set_source(Some(Box::new(PolledHotkeySource::new(
                        spec.vk,
                        keycode::modifier_vks(spec.modifiers),
                        self.key_probe.clone(),
                    ))));
                    Ok(())
                } else {
                    let registration = match self.hotkey_manager.as_mut() {
                        Some(manager) => manager.register(spec),
                        None => match HotkeyManager::new() {
                            Ok(manager) => self.hotkey_manager.insert(manager).register(spec),
                            Err(e) => Err(e.context("Failed to initialize hotkey support")),
                        },
                    };

                    match registration {
                        Ok(id) => {
                            self.engine
                                .set_source(Some(Box::new(RegisteredHotkeySource::new(Some(id)))));
                            Ok(())
                        }
                        Err(e) => {
                            // Condition stays selected but can never fire
                            // until re-registration succeeds.
                            warn!("Hotkey registration failed, condition is inert: {:#}", e);
                            self.engine
                                .set_source(Some(Box::new(RegisteredHotkeySource::new(None))));
                            Err(e)
                        }
                    }
                }
            }
            ActivationCondition::ProcessPresence { image_name } => {
                self.engine
                    .set_source(Some(Box::new(ProcessPresenceSource::new(
                        image_name.clone(),
                        self.condition_interval,
                    ))));
                Ok(())
            }
            ActivationCondition::WindowTitle { title } => {
                self.engine.set_source(Some(Box::new(WindowTitleSource::new(
                    title.clone(),
                    self.condition_interval,
                ))));
                Ok(())
            }
        };

        self.condition = condition;
        result
    }

    /// Currently selected condition.
    pub fn condition(&self) -> &ActivationCondition {
        &self.condition
    }

    pub fn is_engaged(&self) -> bool {
        self.state.is_engaged()
    }

    pub fn set_muted(&self, muted: bool) {
        self.state.set_muted(muted);
        info!("Notification tones {}", if muted { "muted" } else { "unmuted" });
    }

    /// Elapsed time since the lock engaged (in seconds)
    pub fn get_engaged_elapsed_secs(&self) -> Option<u64> {
        self.state.get_engaged_elapsed_secs()
    }

    /// Drive one engine step manually (the background loops do this on their
    /// own cadence once started).
    pub fn tick(&self) {
        self.engine.tick();
    }

    /// Stop the loops, tear down the condition and release confinement.
    pub fn shutdown(&mut self) {
        self.engine.shutdown();
        if let Some(manager) = self.hotkey_manager.as_mut() {
            if let Err(e) = manager.unregister() {
                warn!("Failed to unregister hotkey during shutdown: {:#}", e);
            }
        }
        self.condition = ActivationCondition::None;
        info!("Core shut down");
    }
}
