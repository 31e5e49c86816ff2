//! Incremental interpretation of Hyprland's event stream.
//!
//! Event lines have the form `TAG>>PAYLOAD`.  Switch and focus events
//! carry everything needed and are applied to the [`LocalContext`]
//! directly; window and topology events only say *that* something changed,
//! so they ask for a targeted re-fetch instead.
//!
//! | Tag                                           | Effect                   |
//! |-----------------------------------------------|--------------------------|
//! | `workspace`                                   | set active, focus here   |
//! | `focusedmon`                                  | set focus (and active)   |
//! | `activespecial`                               | re-fetch window counts   |
//! | `openwindow` `closewindow` `movewindow`       | re-fetch window counts   |
//! | `createworkspace` `destroyworkspace`          | re-fetch topology        |
//! | `moveworkspace` `monitoradded` `monitorremoved` | re-fetch topology      |
//!
//! Anything else is ignored.
//!
//! [`LocalContext`]: crate::model::LocalContext

use crate::model::{slot_number, Model};
use log::debug;

/// A recognized event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    /// The focused monitor switched to the named workspace.
    Workspace(&'a str),
    /// Input focus moved to `monitor`, which shows `workspace`.
    FocusedMonitor { monitor: &'a str, workspace: &'a str },
    /// Windows were opened, closed, moved, or a satellite was toggled.
    WindowsChanged,
    /// Workspaces were created, destroyed, or moved between monitors.
    TopologyChanged,
}

/// What the caller has to do after [`apply_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// The model changed; a redisplay is due.
    Redisplay,
    /// Window counts must be re-fetched.
    RefreshWindows,
    /// Workspace-to-monitor assignments must be re-fetched.
    RefreshTopology,
}

/// Split an event line into tag and payload.
pub fn split_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(">>")
}

/// Classify one event line.  Unknown tags and lines without a `>>`
/// separator return `None`.
pub fn classify(line: &str) -> Option<Event<'_>> {
    let (tag, payload) = split_line(line)?;
    let event = match tag {
        "workspace" => Event::Workspace(payload),
        "focusedmon" => {
            let (monitor, workspace) = payload.split_once(',')?;
            Event::FocusedMonitor { monitor, workspace }
        }
        "activespecial" | "openwindow" | "closewindow" | "movewindow" => Event::WindowsChanged,
        "createworkspace" | "destroyworkspace" | "moveworkspace" | "monitoradded"
        | "monitorremoved" => Event::TopologyChanged,
        _ => return None,
    };
    Some(event)
}

/// Apply `event` to `model`.
///
/// Only the local context is touched here; re-fetch effects are left to
/// the caller, which runs the queries without holding the model.
pub fn apply_event(model: &mut Model, event: &Event<'_>) -> Effect {
    let local = &mut model.local;
    match *event {
        Event::Workspace(name) => {
            local.active_workspace = slot_number(name);
            local.focus_here = true;
            debug!("workspace -> {:?}", local.active_workspace);
            Effect::Redisplay
        }
        Event::FocusedMonitor { monitor, workspace } => {
            local.focus_here = local.monitor.is(monitor);
            if local.focus_here {
                local.active_workspace = slot_number(workspace);
            }
            debug!(
                "focus on {} (here: {}), active {:?}",
                monitor, local.focus_here, local.active_workspace
            );
            Effect::Redisplay
        }
        Event::WindowsChanged => Effect::RefreshWindows,
        Event::TopologyChanged => Effect::RefreshTopology,
    }
}
