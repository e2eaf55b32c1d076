//! In-memory system backend for tests
//!
//! Scriptable stand-in for the Win32 backend. Tests mutate the inputs
//! (process list, foreground title, key state) and observe the ordered call
//! log to verify that side effects happen exactly on state transitions.

use super::{CursorControl, KeyStateProbe, Rect, SystemInventory, TonePlayer};
use anyhow::{bail, Result};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct MockInner {
    processes: Vec<String>,
    foreground_title: String,
    foreground_rect: Option<Rect>,
    screen_rect: Rect,
    keys_down: Vec<u32>,
    fail_queries: bool,
    confined_to: Option<Rect>,
    ops: Vec<String>,
}

/// Shared scriptable backend implementing every collaborator trait.
#[derive(Clone, Default)]
pub struct MockSystem {
    inner: Arc<Mutex<MockInner>>,
}

impl MockSystem {
    pub fn new() -> Self {
        let mock = Self::default();
        mock.inner.lock().screen_rect = Rect::new(0, 0, 1920, 1080);
        mock
    }

    pub fn set_processes(&self, names: &[&str]) {
        self.inner.lock().processes = names.iter().map(|s| s.to_string()).collect();
    }

    pub fn set_foreground_title(&self, title: &str) {
        self.inner.lock().foreground_title = title.to_string();
    }

    pub fn set_foreground_rect(&self, rect: Rect) {
        self.inner.lock().foreground_rect = Some(rect);
    }

    pub fn set_key_down(&self, vk: u32, down: bool) {
        let mut inner = self.inner.lock();
        if down {
            if !inner.keys_down.contains(&vk) {
                inner.keys_down.push(vk);
            }
        } else {
            inner.keys_down.retain(|&k| k != vk);
        }
    }

    /// When set, every inventory query fails (transient-failure simulation).
    pub fn set_fail_queries(&self, fail: bool) {
        self.inner.lock().fail_queries = fail;
    }

    /// Currently confined rectangle, if any.
    pub fn confined_to(&self) -> Option<Rect> {
        self.inner.lock().confined_to
    }

    /// Ordered log of side-effecting and query calls.
    pub fn ops(&self) -> Vec<String> {
        self.inner.lock().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.inner.lock().ops.clear();
    }

    /// Number of logged calls whose name matches `op` exactly.
    pub fn count(&self, op: &str) -> usize {
        self.inner
            .lock()
            .ops
            .iter()
            .filter(|o| o.split('(').next() == Some(op))
            .count()
    }
}

impl SystemInventory for MockSystem {
    fn running_process_names(&self) -> Result<Vec<String>> {
        let mut inner = self.inner.lock();
        inner.ops.push("process_snapshot".to_string());
        if inner.fail_queries {
            bail!("process snapshot unavailable");
        }
        Ok(inner.processes.clone())
    }

    fn foreground_window_title(&self) -> Result<String> {
        let mut inner = self.inner.lock();
        inner.ops.push("foreground_title".to_string());
        if inner.fail_queries {
            bail!("foreground window unavailable");
        }
        Ok(inner.foreground_title.clone())
    }

    fn foreground_window_rect(&self) -> Result<Rect> {
        let mut inner = self.inner.lock();
        if inner.fail_queries {
            bail!("foreground window unavailable");
        }
        match inner.foreground_rect {
            Some(rect) => Ok(rect),
            None => bail!("no foreground window"),
        }
    }

    fn screen_rect(&self) -> Result<Rect> {
        Ok(self.inner.lock().screen_rect)
    }
}

impl CursorControl for MockSystem {
    fn set_cursor_position(&self, x: i32, y: i32) -> Result<()> {
        self.inner.lock().ops.push(format!("set_cursor({},{})", x, y));
        Ok(())
    }

    fn confine_cursor(&self, rect: Rect) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.confined_to = Some(rect);
        inner.ops.push(format!(
            "confine({},{},{},{})",
            rect.x, rect.y, rect.width, rect.height
        ));
        Ok(())
    }

    fn release_confinement(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.confined_to = None;
        inner.ops.push("release".to_string());
        Ok(())
    }
}

impl TonePlayer for MockSystem {
    fn play_tone(&self, frequency_hz: u32, duration_ms: u32) {
        self.inner
            .lock()
            .ops
            .push(format!("tone({},{})", frequency_hz, duration_ms));
    }
}

impl KeyStateProbe for MockSystem {
    fn is_key_down(&self, vk: u32) -> bool {
        self.inner.lock().keys_down.contains(&vk)
    }
}
