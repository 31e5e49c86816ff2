//! **hyprslots** — per-monitor workspace buttons for Hyprland.
//!
//! Each running instance belongs to one monitor and shows nine slots, one
//! per regular workspace.  A slot is highlighted when its workspace is
//! active on this monitor, dimmed when it has no windows, and marked when
//! its paired satellite (special) workspace holds windows.
//!
//! # Architecture
//!
//! State follows Hyprland's event stream instead of polling:
//!
//! ```text
//! socket2 ─► hyprland::events ─► interpreter ─┐
//!                                 fetch ──────┴─► model ─► resolver ─► bar
//! ```
//!
//! * [`sync`] owns the single background thread: it reads events, applies
//!   them to the [`model`] and runs re-fetches through [`fetch`] when an
//!   event only says that something changed.
//! * [`resolver`] turns the model into per-slot display decisions; the
//!   front ends in [`bar`] run it on their own thread when told to.
//!
//! The compositor is reached through [`traits::ControlInterface`], the
//! widgets through [`traits::SlotDisplay`]; concrete implementations live
//! in [`hyprland`] and [`bar`].

pub mod bar;
pub mod config;
pub mod fetch;
pub mod hyprland;
pub mod interpreter;
pub mod model;
pub mod resolver;
pub mod sync;
pub mod traits;

#[cfg(test)]
mod testing;
