//! Win32 backend for the system collaborator traits

use super::{CursorControl, KeyStateProbe, Rect, SystemInventory, TonePlayer};
use anyhow::{bail, Context, Result};
use windows::Win32::Foundation::{CloseHandle, ERROR_NO_MORE_FILES, RECT};
use windows::Win32::System::Diagnostics::Debug::Beep;
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
    TH32CS_SNAPPROCESS,
};
use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;
use windows::Win32::UI::WindowsAndMessaging::{
    ClipCursor, DispatchMessageW, GetForegroundWindow, GetSystemMetrics, GetWindowRect,
    GetWindowTextW, PeekMessageW, SetCursorPos, TranslateMessage, MSG, PM_REMOVE, SM_CXSCREEN,
    SM_CYSCREEN,
};

/// Drain the calling thread's pending window messages.
///
/// Registered hotkeys are delivered through the message queue of the thread
/// that created the registration; that thread must keep pumping or the
/// events never reach the global receiver. Non-blocking: returns as soon as
/// the queue is empty.
pub fn pump_pending_messages() {
    let mut msg = MSG::default();
    unsafe {
        while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}

/// Real Win32 implementation of every collaborator trait.
#[derive(Clone, Copy, Default)]
pub struct WindowsSystem;

impl WindowsSystem {
    pub fn new() -> Self {
        Self
    }
}

fn win32_rect_to_rect(rect: &RECT) -> Rect {
    Rect {
        x: rect.left,
        y: rect.top,
        width: rect.right - rect.left,
        height: rect.bottom - rect.top,
    }
}

fn rect_to_win32_rect(rect: &Rect) -> RECT {
    RECT {
        left: rect.x,
        top: rect.y,
        right: rect.x + rect.width,
        bottom: rect.y + rect.height,
    }
}

impl SystemInventory for WindowsSystem {
    fn running_process_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        unsafe {
            let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0)
                .context("Failed to create process snapshot")?;

            let mut entry = PROCESSENTRY32W {
                dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
                ..Default::default()
            };

            if let Err(e) = Process32FirstW(snapshot, &mut entry) {
                let _ = CloseHandle(snapshot);
                // An empty snapshot ends with ERROR_NO_MORE_FILES; anything
                // else is a transient failure and the caller holds state.
                if e.code() == ERROR_NO_MORE_FILES.to_hresult() {
                    return Ok(names);
                }
                return Err(e).context("Process32FirstW failed");
            }

            loop {
                let len = entry
                    .szExeFile
                    .iter()
                    .position(|&c| c == 0)
                    .unwrap_or(entry.szExeFile.len());
                names.push(String::from_utf16_lossy(&entry.szExeFile[..len]));

                if Process32NextW(snapshot, &mut entry).is_err() {
                    break;
                }
            }

            let _ = CloseHandle(snapshot);
        }
        Ok(names)
    }

    fn foreground_window_title(&self) -> Result<String> {
        unsafe {
            let hwnd = GetForegroundWindow();
            if hwnd.0.is_null() {
                bail!("No foreground window");
            }

            let mut buf = [0u16; 512];
            let len = GetWindowTextW(hwnd, &mut buf);
            Ok(String::from_utf16_lossy(&buf[..len.max(0) as usize]))
        }
    }

    fn foreground_window_rect(&self) -> Result<Rect> {
        unsafe {
            let hwnd = GetForegroundWindow();
            if hwnd.0.is_null() {
                bail!("No foreground window");
            }

            let mut rect = RECT::default();
            GetWindowRect(hwnd, &mut rect).context("GetWindowRect failed")?;
            Ok(win32_rect_to_rect(&rect))
        }
    }

    fn screen_rect(&self) -> Result<Rect> {
        let (width, height) = unsafe {
            (
                GetSystemMetrics(SM_CXSCREEN),
                GetSystemMetrics(SM_CYSCREEN),
            )
        };
        if width <= 0 || height <= 0 {
            bail!("Failed to query primary display metrics");
        }
        Ok(Rect::new(0, 0, width, height))
    }
}

impl CursorControl for WindowsSystem {
    fn set_cursor_position(&self, x: i32, y: i32) -> Result<()> {
        unsafe { SetCursorPos(x, y).context("SetCursorPos failed") }
    }

    fn confine_cursor(&self, rect: Rect) -> Result<()> {
        let win_rect = rect_to_win32_rect(&rect);
        unsafe { ClipCursor(Some(&win_rect)).context("ClipCursor failed") }
    }

    fn release_confinement(&self) -> Result<()> {
        unsafe { ClipCursor(None).context("ClipCursor(None) failed") }
    }
}

impl TonePlayer for WindowsSystem {
    fn play_tone(&self, frequency_hz: u32, duration_ms: u32) {
        unsafe {
            let _ = Beep(frequency_hz, duration_ms);
        }
    }
}

impl KeyStateProbe for WindowsSystem {
    fn is_key_down(&self, vk: u32) -> bool {
        unsafe { GetAsyncKeyState(vk as i32) < 0 }
    }
}
