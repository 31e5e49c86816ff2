//! Hyprland-specific implementations.
//!
//! This module provides the concrete
//! [`ControlInterface`](crate::traits::ControlInterface) and the event
//! stream reader, both talking to Hyprland's IPC sockets directly.
//!
//! Nothing outside this module should reference Hyprland's socket layout.

pub mod ctl;
pub mod events;
pub mod replies;

use std::path::PathBuf;

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandError(String);

/// Resolve the directory holding this Hyprland instance's sockets.
///
/// Hyprland ≥ 0.40 stores its sockets at
/// `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/`.
pub fn instance_dir() -> Result<PathBuf, HyprlandError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandError("XDG_RUNTIME_DIR not set".into()))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(PathBuf::from(runtime_dir).join("hypr").join(his))
}
