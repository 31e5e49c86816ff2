//! Entry point for **hyprslots**.
//!
//! Starts the sync thread and presents its resolve passes on the main
//! thread.  With the `bar-gtk` feature the main thread runs the GLib main
//! loop (GTK4 requires it); with `--headless` (or without the feature)
//! every pass is printed to stdout as one line of JSON.
//!
//! # Usage
//!
//! ```text
//! hyprslots [--config <path>] [--output <monitor>] [--headless]
//! ```
//!
//! `SIGUSR1` makes a running instance re-fetch its whole state.

use hyprslots::bar::JsonLines;
use hyprslots::config::Config;
use hyprslots::fetch::resolve_identity;
use hyprslots::hyprland::ctl::HyprlandCtl;
use hyprslots::hyprland::events::EventStream;
use hyprslots::model::MonitorIdentity;
use hyprslots::sync::SyncHandle;
use hyprslots::traits::SlotDisplay;
use log::{error, info, warn};
use signal_hook::consts::SIGUSR1;
use std::path::PathBuf;
use std::sync::mpsc;

/// Command-line options.
#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    output: Option<String>,
    headless: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => args.config = iter.next().map(PathBuf::from),
            "--output" => args.output = iter.next(),
            "--headless" => args.headless = true,
            other => error!("ignoring unknown argument {:?}", other),
        }
    }
    args
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/hyprslots`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("hyprslots")
}

/// Load the config from `path` (default
/// `$XDG_CONFIG_HOME/hyprslots/config.json`), falling back to compiled-in
/// defaults.
fn load_config(path: Option<PathBuf>) -> Config {
    let path = path.unwrap_or_else(|| config_dir().join("config.json"));
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

//  Main

fn main() {
    env_logger::init();

    let args = parse_args();
    let mut config = load_config(args.config);
    if let Some(output) = args.output {
        config.monitor_name_override = Some(output);
    }
    info!(
        "config: show-all-outputs={}, show-empty-workspaces={}, monitor={:?}",
        config.show_all_outputs, config.show_empty_workspaces, config.monitor_name_override
    );

    let located = HyprlandCtl::from_env().and_then(|ctl| Ok((ctl, EventStream::from_env()?)));
    let (ctl, stream) = match located {
        Ok(pair) => pair,
        Err(e) => {
            error!("cannot locate Hyprland: {}", e);
            std::process::exit(1);
        }
    };

    if args.headless || cfg!(not(feature = "bar-gtk")) {
        run_headless(config, ctl, stream);
    } else {
        run_bar(config, ctl, stream);
    }
}

/// Print every resolve pass to stdout.
fn run_headless(config: Config, ctl: HyprlandCtl, stream: EventStream) {
    // No surface to measure, so the focused monitor stands in for "ours".
    let found = resolve_identity(
        &ctl,
        config.monitor_name_override.as_deref(),
        &config.bar.namespace,
        None,
    );
    let monitor = match found {
        Some(name) => MonitorIdentity::resolved(name),
        None => MonitorIdentity::unresolved(),
    };

    let (tx, rx) = mpsc::channel::<()>();
    let mut handle = match SyncHandle::spawn(ctl, &config, monitor, stream, move || {
        let _ = tx.send(());
    }) {
        Ok(handle) => handle,
        Err(e) => {
            error!("failed to start sync thread: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = handle.resync_on_signal(SIGUSR1) {
        warn!("SIGUSR1 refresh unavailable: {}", e);
    }

    info!("hyprslots running headless");
    let mut display = JsonLines::new(std::io::stdout().lock());
    for () in rx {
        display.present(&handle.resolve_pass(&config));
    }
    info!("sync thread gone, exiting");
}

#[cfg(feature = "bar-gtk")]
fn run_bar(config: Config, ctl: HyprlandCtl, stream: EventStream) {
    let css_path = Some(config_dir().join("style.css"));
    if let Err(e) = hyprslots::bar::gtk::run_main_loop(config, ctl, stream, css_path) {
        error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "bar-gtk"))]
fn run_bar(config: Config, ctl: HyprlandCtl, stream: EventStream) {
    run_headless(config, ctl, stream);
}
