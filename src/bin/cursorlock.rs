// cursorlock CLI - confine the mouse cursor based on an activation condition

use anyhow::{Context, Result};
use clap::Parser;
use cursorlock::config_file::Config;
use cursorlock::utils::keycode;
use log::info;
use std::io::{self, Write};

/// Windows utility to confine the mouse cursor to the active window or
/// screen center
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Windows utility to confine the mouse cursor to the active window or screen center",
    long_about = "Windows utility to confine the mouse cursor to a region of the screen based
on an activation condition.

Conditions (exactly one active at a time):
 - a global toggle hotkey, e.g. --hotkey alt+F8
 - a running process, e.g. --process Game.exe (locked while it runs)
 - the foreground window title, e.g. --title \"My Game\" (exact match)

While engaged, the cursor is either clipped to the foreground window's
rectangle (default) or repeatedly re-centered on it (--recenter). A short
ascending tone pair marks engagement, the descending pair disengagement.

SETUP:
  Run 'cursorlock --setup' once to write the config file; command-line
  flags override it. Configuration is stored at:
    %APPDATA%\\cursorlock\\config.toml

Press Enter to quit; cursor confinement is always released on exit."
)]
struct Args {
    /// Lock while a process with this image name is running (e.g. "Game.exe")
    #[arg(long, conflicts_with_all = ["title", "hotkey"])]
    process: Option<String>,

    /// Lock while the foreground window title matches exactly (case-sensitive)
    #[arg(long, conflicts_with = "hotkey")]
    title: Option<String>,

    /// Toggle the lock with a global hotkey (e.g. "F8", "ctrl+alt+L")
    #[arg(long)]
    hotkey: Option<String>,

    /// Re-center the cursor on the target instead of clipping to its rectangle
    #[arg(long)]
    recenter: bool,

    /// Suppress notification tones
    #[arg(long)]
    mute: bool,

    /// Sample raw key state instead of registering an OS hotkey
    /// (for environments where hotkey registration is unavailable)
    #[arg(long)]
    poll_hotkey: bool,

    /// Run interactive setup to write the config file
    #[arg(long)]
    setup: bool,
}

/// Helper function to prompt for a line with a default value
fn prompt_line(prompt: &str, default: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input.to_string())
    }
}

/// Run interactive setup to configure the activation condition
fn run_setup() -> Result<()> {
    println!("cursorlock Setup");
    println!("================\n");

    let mode = prompt_line(
        "Activation mode [hotkey/process/window-title/none] (default: hotkey): ",
        "hotkey",
    )?;

    let mut cfg = Config {
        mode: mode.clone(),
        ..Default::default()
    };

    match mode.as_str() {
        "hotkey" => {
            let spec = prompt_line("Hotkey combination (default: alt+F8): ", "alt+F8")?;
            keycode::parse_hotkey(&spec).context("Invalid hotkey combination")?;
            cfg.hotkey = Some(spec);
        }
        "process" => {
            let name = prompt_line("Process image name (e.g. Game.exe): ", "")?;
            if name.is_empty() {
                anyhow::bail!("Error: Process name cannot be empty");
            }
            cfg.process_name = Some(name);
        }
        "window-title" => {
            let title = prompt_line("Exact window title: ", "")?;
            if title.is_empty() {
                anyhow::bail!("Error: Window title cannot be empty");
            }
            cfg.window_title = Some(title);
        }
        "none" => {}
        other => anyhow::bail!("Error: Unknown mode '{}'", other),
    }

    cfg.confine_mode = prompt_line("Confine mode [clip/recenter] (default: clip): ", "clip")?;
    cfg.parsed_confine_mode().context("Invalid confine mode")?;

    let mute = prompt_line("Mute notification tones? [y/N]: ", "n")?;
    cfg.muted = mute.eq_ignore_ascii_case("y");

    // Re-validate the whole selection before persisting
    cfg.activation_condition()
        .context("Invalid condition selection")?;
    cfg.save().context("Failed to save configuration")?;

    println!("\nConfiguration saved to: {}", Config::config_path().display());
    println!("Setup complete! You can now run 'cursorlock'.");

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.setup {
        return run_setup();
    }

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting cursorlock");

    #[cfg(windows)]
    return run(args);

    #[cfg(not(windows))]
    {
        let _ = args;
        anyhow::bail!("cursorlock requires Windows (Win32 cursor clipping)");
    }
}

#[cfg(windows)]
fn run(args: Args) -> Result<()> {
    use cursorlock::config;
    use cursorlock::constants::MESSAGE_PUMP_INTERVAL_MS;
    use cursorlock::engine::condition::ActivationCondition;
    use cursorlock::engine::{ConfineMode, EngineConfig};
    use cursorlock::system::windows::{pump_pending_messages, WindowsSystem};
    use cursorlock::{CoreOptions, CursorLockCore};
    use log::{error, warn};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    // Load configuration; CLI flags can stand in for a missing file
    let cfg = match Config::load() {
        Ok(cfg) => {
            info!("Configuration loaded from: {}", Config::config_path().display());
            cfg
        }
        Err(e) => {
            if args.process.is_none() && args.title.is_none() && args.hotkey.is_none() {
                error!("Failed to load configuration: {:#}", e);
                error!("Run 'cursorlock --setup' or pass --process/--title/--hotkey.");
                std::process::exit(1);
            }
            info!("No usable config file, using command-line settings only");
            Config::default()
        }
    };

    // Condition precedence: CLI flag > config file
    let condition = if let Some(name) = &args.process {
        ActivationCondition::ProcessPresence {
            image_name: name.clone(),
        }
    } else if let Some(title) = &args.title {
        ActivationCondition::WindowTitle {
            title: title.clone(),
        }
    } else if let Some(spec) = &args.hotkey {
        ActivationCondition::Hotkey(
            keycode::parse_hotkey(spec).context("Invalid --hotkey value")?,
        )
    } else {
        cfg.activation_condition()?
    };

    let confine_mode = if args.recenter {
        ConfineMode::Recenter
    } else {
        cfg.parsed_confine_mode()?
    };

    let mut engine_config = EngineConfig {
        confine_mode,
        ..Default::default()
    };
    if let Some(ms) = config::parse_recenter_override() {
        engine_config.recenter_interval = Duration::from_millis(ms);
    }

    let options = CoreOptions {
        engine: engine_config,
        poll_hotkey: args.poll_hotkey || cfg.poll_hotkey,
        condition_interval: config::parse_condition_poll_override().map(Duration::from_millis),
        muted: args.mute || cfg.muted,
    };

    let backend = Arc::new(WindowsSystem::new());
    let mut core = CursorLockCore::new(
        backend.clone(),
        backend.clone(),
        backend.clone(),
        backend,
        options,
    );

    // Hotkey registration failure is non-fatal: the condition stays selected
    // but inert until the combination is freed up and re-selected
    if let Err(e) = core.set_condition(condition) {
        warn!("Condition is selected but inert: {:#}", e);
    }

    core.start_background_loops();

    // Registered hotkeys arrive on the message queue of this thread (the one
    // that created the hotkey manager), so the Enter-to-quit wait moves to a
    // helper thread and this one keeps pumping.
    let quit = Arc::new(AtomicBool::new(false));
    {
        let quit = quit.clone();
        thread::Builder::new()
            .name("quit-watch".to_string())
            .spawn(move || {
                let mut line = String::new();
                let _ = io::stdin().read_line(&mut line);
                quit.store(true, Ordering::Release);
            })
            .context("Failed to spawn quit watcher thread")?;
    }

    info!("cursorlock is running - press Enter to quit");
    while !quit.load(Ordering::Acquire) {
        pump_pending_messages();
        thread::sleep(Duration::from_millis(MESSAGE_PUMP_INTERVAL_MS));
    }

    core.shutdown();
    info!("CLI shutdown complete");
    Ok(())
}
