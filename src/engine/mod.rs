//! Condition-driven activation engine
//!
//! Polls the selected activation condition on its own cadence, maintains the
//! engaged/disengaged state machine and drives cursor confinement plus
//! notification tones exactly on state transitions. A second, faster loop
//! handles cursor re-centering independently; the two loops share only the
//! lock state and the confiner.

pub mod condition;

use crate::app_state::LockState;
use crate::confine::{CursorConfiner, Region};
use crate::constants::{IDLE_POLL_INTERVAL_MS, RECENTER_INTERVAL_MS};
use crate::system::{CursorControl, SystemInventory, TonePlayer};
use crate::tones::ToneSink;
use condition::{ConditionSource, Signal};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How the lock restricts the cursor once engaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfineMode {
    /// Clip the cursor to the target rectangle.
    Clip,
    /// Repeatedly force the cursor back to the target's center point.
    Recenter,
}

/// Engine tunables, resolved by the configuration layer.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub confine_mode: ConfineMode,
    pub recenter_interval: Duration,
    pub idle_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confine_mode: ConfineMode::Clip,
            recenter_interval: Duration::from_millis(RECENTER_INTERVAL_MS),
            idle_interval: Duration::from_millis(IDLE_POLL_INTERVAL_MS),
        }
    }
}

struct EngineShared {
    state: LockState,
    source: Mutex<Option<Box<dyn ConditionSource>>>,
    confiner: CursorConfiner,
    system: Arc<dyn SystemInventory>,
    tones: ToneSink,
    terminate: AtomicBool,
    config: EngineConfig,
}

impl EngineShared {
    /// One evaluate-then-act step. Strictly sequential within a tick; a
    /// failed evaluation holds the previous lock state and the loop goes on.
    fn tick(&self) {
        let mut slot = self.source.lock();
        let Some(source) = slot.as_mut() else {
            return;
        };

        match source.poll(self.system.as_ref()) {
            Ok(Signal::Level(want)) => {
                let engaged = self.state.is_engaged();
                if want && !engaged {
                    self.engage();
                } else if !want && engaged {
                    self.disengage();
                } else if want && engaged {
                    self.refresh_region();
                }
            }
            Ok(Signal::Toggles(presses)) => {
                for _ in 0..presses {
                    if self.state.is_engaged() {
                        self.disengage();
                    } else {
                        self.engage();
                    }
                }
            }
            Err(e) => {
                warn!("Condition evaluation failed, holding lock state: {:#}", e);
            }
        }
    }

    /// Region for the current engagement, recomputed from the foreground
    /// window (the desktop as fallback) so a moved window gets fresh bounds.
    fn target_region(&self) -> anyhow::Result<Region> {
        let rect = match self.system.foreground_window_rect() {
            Ok(rect) => rect,
            Err(e) => {
                debug!("No foreground window rect ({}), using screen bounds", e);
                self.system.screen_rect()?
            }
        };

        Ok(match self.config.confine_mode {
            ConfineMode::Clip => Region::Clip(rect),
            ConfineMode::Recenter => {
                let (x, y) = rect.center();
                Region::Recenter { x, y }
            }
        })
    }

    fn engage(&self) {
        let region = match self.target_region() {
            Ok(region) => region,
            Err(e) => {
                warn!("Cannot engage, target region unavailable: {:#}", e);
                return;
            }
        };
        if let Err(e) = self.confiner.enable(region) {
            warn!("Cannot engage, confinement failed: {:#}", e);
            return;
        }
        self.tones.play_engage();
        self.state.set_engaged(true);
        info!("Cursor lock engaged: {:?}", region);
    }

    fn disengage(&self) {
        if let Err(e) = self.confiner.disable() {
            warn!("Failed to release confinement, staying engaged: {:#}", e);
            return;
        }
        self.tones.play_disengage();
        self.state.set_engaged(false);
        info!("Cursor lock disengaged");
    }

    fn refresh_region(&self) {
        match self.target_region() {
            Ok(region) => {
                if let Err(e) = self.confiner.refresh(region) {
                    warn!("Failed to refresh confinement region: {:#}", e);
                }
            }
            Err(e) => debug!("Region refresh skipped: {}", e),
        }
    }
}

pub struct ActivationEngine {
    shared: Arc<EngineShared>,
    condition_thread: Option<JoinHandle<()>>,
    recenter_thread: Option<JoinHandle<()>>,
}

impl ActivationEngine {
    pub fn new(
        state: LockState,
        system: Arc<dyn SystemInventory>,
        cursor: Arc<dyn CursorControl>,
        player: Arc<dyn TonePlayer>,
        config: EngineConfig,
    ) -> Self {
        let tones = ToneSink::new(player, state.clone());
        Self {
            shared: Arc::new(EngineShared {
                state,
                source: Mutex::new(None),
                confiner: CursorConfiner::new(cursor),
                system,
                tones,
                terminate: AtomicBool::new(false),
                config,
            }),
            condition_thread: None,
            recenter_thread: None,
        }
    }

    /// Install a new condition source, or None to go idle.
    ///
    /// Synchronous teardown: if the lock is engaged the disengage side
    /// effects run first, then the old source's OS registration is released,
    /// and only then is the new source installed. No tick ever sees old and
    /// new conditions overlap.
    pub fn set_source(&self, new_source: Option<Box<dyn ConditionSource>>) {
        let mut slot = self.shared.source.lock();

        if self.shared.state.is_engaged() {
            self.shared.disengage();
        }
        if let Some(mut old) = slot.take() {
            old.teardown();
        }

        match &new_source {
            Some(source) => info!("Activation condition set: {}", source.describe()),
            None => info!("Activation condition cleared"),
        }
        *slot = new_source;
    }

    /// Single engine step, exposed so callers (and tests) can drive the
    /// state machine without the background threads.
    pub fn tick(&self) {
        self.shared.tick();
    }

    pub fn is_engaged(&self) -> bool {
        self.shared.state.is_engaged()
    }

    /// Start the condition loop and the re-centering loop.
    pub fn start(&mut self) {
        let shared = self.shared.clone();
        self.condition_thread = Some(
            thread::Builder::new()
                .name("condition-loop".to_string())
                .spawn(move || {
                    info!("Condition loop started");
                    loop {
                        if shared.terminate.load(Ordering::Acquire) {
                            break;
                        }
                        shared.tick();

                        let interval = shared
                            .source
                            .lock()
                            .as_ref()
                            .map(|s| s.poll_interval())
                            .unwrap_or(shared.config.idle_interval);
                        thread::sleep(interval);
                    }
                    info!("Condition loop stopped");
                })
                .expect("Failed to spawn condition loop thread"),
        );

        let shared = self.shared.clone();
        self.recenter_thread = Some(
            thread::Builder::new()
                .name("recenter-loop".to_string())
                .spawn(move || {
                    info!("Re-centering loop started");
                    loop {
                        if shared.terminate.load(Ordering::Acquire) {
                            break;
                        }
                        if let Err(e) = shared.confiner.recenter_tick() {
                            debug!("Re-centering failed this tick: {}", e);
                        }
                        thread::sleep(shared.config.recenter_interval);
                    }
                    info!("Re-centering loop stopped");
                })
                .expect("Failed to spawn re-centering loop thread"),
        );
    }

    /// Cooperative shutdown: flag both loops, join them (latency bounded by
    /// one poll interval each), tear down the source, then release cursor
    /// confinement unconditionally as the very last step.
    pub fn shutdown(&mut self) {
        self.shared.terminate.store(true, Ordering::Release);

        if let Some(handle) = self.condition_thread.take() {
            if handle.join().is_err() {
                warn!("Condition loop panicked before shutdown");
            }
        }
        if let Some(handle) = self.recenter_thread.take() {
            if handle.join().is_err() {
                warn!("Re-centering loop panicked before shutdown");
            }
        }

        if let Some(mut source) = self.shared.source.lock().take() {
            source.teardown();
        }
        self.shared.state.set_engaged(false);

        // Last step, no matter what happened above: never leave the user's
        // cursor trapped.
        self.shared.confiner.force_release();
        info!("Engine shut down, cursor confinement released");
    }
}

impl Drop for ActivationEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
