//! Key-name parsing for hotkey configuration
//!
//! Maps user-facing key names (letters, digits, function keys) to the
//! `global_hotkey` Code used for OS registration and the Windows virtual-key
//! id used by the polled fallback.

use crate::engine::condition::HotkeySpec;
use anyhow::{anyhow, Result};
use global_hotkey::hotkey::{Code, Modifiers};

/// Convert a key name to its registration Code and Windows VKID.
/// Returns None for unsupported keys.
pub fn key_name_to_code_vk(name: &str) -> Option<(Code, u32)> {
    match name.to_ascii_uppercase().as_str() {
        "A" => Some((Code::KeyA, 0x41)),
        "B" => Some((Code::KeyB, 0x42)),
        "C" => Some((Code::KeyC, 0x43)),
        "D" => Some((Code::KeyD, 0x44)),
        "E" => Some((Code::KeyE, 0x45)),
        "F" => Some((Code::KeyF, 0x46)),
        "G" => Some((Code::KeyG, 0x47)),
        "H" => Some((Code::KeyH, 0x48)),
        "I" => Some((Code::KeyI, 0x49)),
        "J" => Some((Code::KeyJ, 0x4A)),
        "K" => Some((Code::KeyK, 0x4B)),
        "L" => Some((Code::KeyL, 0x4C)),
        "M" => Some((Code::KeyM, 0x4D)),
        "N" => Some((Code::KeyN, 0x4E)),
        "O" => Some((Code::KeyO, 0x4F)),
        "P" => Some((Code::KeyP, 0x50)),
        "Q" => Some((Code::KeyQ, 0x51)),
        "R" => Some((Code::KeyR, 0x52)),
        "S" => Some((Code::KeyS, 0x53)),
        "T" => Some((Code::KeyT, 0x54)),
        "U" => Some((Code::KeyU, 0x55)),
        "V" => Some((Code::KeyV, 0x56)),
        "W" => Some((Code::KeyW, 0x57)),
        "X" => Some((Code::KeyX, 0x58)),
        "Y" => Some((Code::KeyY, 0x59)),
        "Z" => Some((Code::KeyZ, 0x5A)),
        "0" => Some((Code::Digit0, 0x30)),
        "1" => Some((Code::Digit1, 0x31)),
        "2" => Some((Code::Digit2, 0x32)),
        "3" => Some((Code::Digit3, 0x33)),
        "4" => Some((Code::Digit4, 0x34)),
        "5" => Some((Code::Digit5, 0x35)),
        "6" => Some((Code::Digit6, 0x36)),
        "7" => Some((Code::Digit7, 0x37)),
        "8" => Some((Code::Digit8, 0x38)),
        "9" => Some((Code::Digit9, 0x39)),
        "F1" => Some((Code::F1, 0x70)),
        "F2" => Some((Code::F2, 0x71)),
        "F3" => Some((Code::F3, 0x72)),
        "F4" => Some((Code::F4, 0x73)),
        "F5" => Some((Code::F5, 0x74)),
        "F6" => Some((Code::F6, 0x75)),
        "F7" => Some((Code::F7, 0x76)),
        "F8" => Some((Code::F8, 0x77)),
        "F9" => Some((Code::F9, 0x78)),
        "F10" => Some((Code::F10, 0x79)),
        "F11" => Some((Code::F11, 0x7A)),
        "F12" => Some((Code::F12, 0x7B)),
        _ => None, // Not a supported hotkey key
    }
}

/// Convert a modifier name to its bitmask flag.
pub fn modifier_name_to_flag(name: &str) -> Option<Modifiers> {
    match name.to_ascii_lowercase().as_str() {
        "alt" => Some(Modifiers::ALT),
        "ctrl" | "control" => Some(Modifiers::CONTROL),
        "shift" => Some(Modifiers::SHIFT),
        "win" | "super" => Some(Modifiers::SUPER),
        _ => None,
    }
}

/// Windows virtual-key ids for every modifier set in the bitmask, for raw
/// key-state sampling.
pub fn modifier_vks(modifiers: Modifiers) -> Vec<u32> {
    let mut vks = Vec::new();
    if modifiers.contains(Modifiers::CONTROL) {
        vks.push(0x11); // VK_CONTROL
    }
    if modifiers.contains(Modifiers::ALT) {
        vks.push(0x12); // VK_MENU
    }
    if modifiers.contains(Modifiers::SHIFT) {
        vks.push(0x10); // VK_SHIFT
    }
    if modifiers.contains(Modifiers::SUPER) {
        vks.push(0x5B); // VK_LWIN
    }
    vks
}

/// Parse a hotkey description like `"F8"`, `"alt+F8"` or `"ctrl+shift+L"`
/// into a [`HotkeySpec`]. The last segment is the key, everything before it
/// is a modifier.
pub fn parse_hotkey(spec: &str) -> Result<HotkeySpec> {
    let mut parts: Vec<&str> = spec.split('+').map(str::trim).collect();
    let key_name = parts
        .pop()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("Empty hotkey specification"))?;

    let (code, vk) = key_name_to_code_vk(key_name)
        .ok_or_else(|| anyhow!("Unsupported hotkey key: '{}'", key_name))?;

    let mut modifiers = Modifiers::empty();
    for part in parts {
        let flag = modifier_name_to_flag(part)
            .ok_or_else(|| anyhow!("Unknown hotkey modifier: '{}'", part))?;
        modifiers |= flag;
    }

    Ok(HotkeySpec {
        code,
        modifiers,
        vk,
    })
}
