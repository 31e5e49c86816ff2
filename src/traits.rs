//! Core traits that decouple hyprslots from the compositor, the event
//! transport, and the widget toolkit.
//!
//! The sync core (fetcher, interpreter, synchronizer) only depends on
//! these abstractions.  Concrete implementations live in
//! [`hyprland`](crate::hyprland) (compositor sockets) and
//! [`bar`](crate::bar) (GTK and headless front ends).

use crate::model::WORKSPACE_COUNT;
use crate::resolver::SlotView;
use log::{debug, warn};

/// Synchronous request/response access to the window manager.
///
/// An implementation might talk to Hyprland's command socket, or it might
/// be a table of canned documents used in tests.
pub trait ControlInterface: Send + Sync {
    /// The error type produced by this interface.
    type Error: std::error::Error + Send + 'static;

    /// Run a data query (`monitors`, `workspaces`, `clients`, …) and
    /// return its JSON document.
    fn query(&self, what: &str) -> Result<String, Self::Error>;

    /// Run a dispatch command for its side effect.
    fn dispatch(&self, args: &str) -> Result<(), Self::Error>;

    /// Ask the window manager to show workspace `n` on the focused monitor.
    ///
    /// Fire-and-forget: a failure is logged and otherwise dropped.
    fn switch_workspace(&self, n: usize) {
        debug!("switching to workspace {}", n);
        if let Err(e) = self.dispatch(&format!("workspace {}", n)) {
            warn!("switch to workspace {} failed: {}", n, e);
        }
    }
}

/// Receiver of one resolve pass worth of display instructions.
pub trait SlotDisplay {
    /// Apply the decision for every slot, index `n - 1` for slot `n`.
    fn present(&mut self, views: &[SlotView; WORKSPACE_COUNT]);
}

/// Consumer of the compositor's event stream.
///
/// [`EventStream::run`](crate::hyprland::events::EventStream::run) drives
/// an implementation from the background thread.
pub trait EventSink {
    /// One complete event line, delivered in arrival order.
    fn line(&mut self, line: &str);

    /// Every complete line of the last read has been delivered.
    fn batch_end(&mut self);

    /// A (re)connection to the event stream was established.
    fn connected(&mut self) {}

    /// A read timed out without data.
    fn tick(&mut self) {}
}
