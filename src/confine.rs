//! Cursor confinement executor
//!
//! Applies and removes the OS-level cursor restriction. Two modes: a rect
//! clip held by the OS, and repeated re-centering to a point driven by the
//! engine's fast loop. The confiner itself holds no policy; the engine
//! decides when to enable/disable.

use crate::system::{CursorControl, Rect};
use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;

/// Active confinement region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Restrict the cursor to a rectangle.
    Clip(Rect),
    /// Repeatedly force the cursor back to a point.
    Recenter { x: i32, y: i32 },
}

pub struct CursorConfiner {
    control: Arc<dyn CursorControl>,
    active: Mutex<Option<Region>>,
}

impl CursorConfiner {
    pub fn new(control: Arc<dyn CursorControl>) -> Self {
        Self {
            control,
            active: Mutex::new(None),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Apply confinement. Calling while already active simply refreshes the
    /// region.
    pub fn enable(&self, region: Region) -> Result<()> {
        if let Region::Clip(rect) = region {
            self.control.confine_cursor(rect)?;
        }
        *self.active.lock() = Some(region);
        Ok(())
    }

    /// Re-apply the region only if it changed since the last application.
    ///
    /// Keeps a moved/resized foreground window from leaving a stale clip
    /// behind, without re-issuing the OS call on every tick. No-op while
    /// disabled.
    pub fn refresh(&self, region: Region) -> Result<()> {
        let mut active = self.active.lock();
        match *active {
            Some(current) if current == region => Ok(()),
            Some(_) => {
                if let Region::Clip(rect) = region {
                    self.control.confine_cursor(rect)?;
                }
                *active = Some(region);
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Remove confinement. Idempotent: calling while already disabled is not
    /// an error and produces no OS call.
    pub fn disable(&self) -> Result<()> {
        let mut active = self.active.lock();
        if active.take().is_some() {
            self.control.release_confinement()?;
        }
        Ok(())
    }

    /// Release the OS restriction regardless of tracked state.
    ///
    /// Shutdown path only: the cursor must never stay trapped after exit,
    /// even if internal bookkeeping was lost to a panicked loop.
    pub fn force_release(&self) {
        *self.active.lock() = None;
        if let Err(e) = self.control.release_confinement() {
            log::warn!("Failed to release cursor confinement: {}", e);
        }
    }

    /// One step of the fast loop: push the cursor back to the stored point
    /// when in re-centering mode.
    pub fn recenter_tick(&self) -> Result<()> {
        let point = match *self.active.lock() {
            Some(Region::Recenter { x, y }) => Some((x, y)),
            _ => None,
        };
        if let Some((x, y)) = point {
            self.control.set_cursor_position(x, y)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::mock::MockSystem;

    #[test]
    fn test_disable_is_idempotent() {
        let mock = MockSystem::new();
        let confiner = CursorConfiner::new(Arc::new(mock.clone()));

        confiner.enable(Region::Clip(Rect::new(0, 0, 100, 100))).unwrap();
        confiner.disable().unwrap();
        confiner.disable().unwrap();

        assert!(mock.confined_to().is_none());
        assert_eq!(
            mock.count("release"),
            1,
            "Second disable should not re-issue the OS release"
        );
    }

    #[test]
    fn test_refresh_only_reapplies_on_change() {
        let mock = MockSystem::new();
        let confiner = CursorConfiner::new(Arc::new(mock.clone()));

        let rect = Rect::new(10, 10, 200, 100);
        confiner.enable(Region::Clip(rect)).unwrap();
        confiner.refresh(Region::Clip(rect)).unwrap();
        confiner.refresh(Region::Clip(rect)).unwrap();
        assert_eq!(mock.count("confine"), 1, "Unchanged region must not re-clip");

        let moved = Rect::new(50, 50, 200, 100);
        confiner.refresh(Region::Clip(moved)).unwrap();
        assert_eq!(mock.count("confine"), 2);
        assert_eq!(mock.confined_to(), Some(moved));
    }

    #[test]
    fn test_refresh_while_disabled_is_noop() {
        let mock = MockSystem::new();
        let confiner = CursorConfiner::new(Arc::new(mock.clone()));

        confiner
            .refresh(Region::Clip(Rect::new(0, 0, 10, 10)))
            .unwrap();
        assert_eq!(mock.count("confine"), 0);
        assert!(!confiner.is_active());
    }

    #[test]
    fn test_recenter_tick_drives_cursor_only_while_active() {
        let mock = MockSystem::new();
        let confiner = CursorConfiner::new(Arc::new(mock.clone()));

        confiner.recenter_tick().unwrap();
        assert_eq!(mock.count("set_cursor"), 0);

        confiner.enable(Region::Recenter { x: 960, y: 540 }).unwrap();
        confiner.recenter_tick().unwrap();
        confiner.recenter_tick().unwrap();
        assert_eq!(mock.count("set_cursor"), 2);

        confiner.disable().unwrap();
        confiner.recenter_tick().unwrap();
        assert_eq!(mock.count("set_cursor"), 2);
    }
}
