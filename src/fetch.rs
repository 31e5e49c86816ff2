//! Full and partial re-synchronization from the window manager's data
//! queries.
//!
//! Decoding is split from querying: the free functions turn a query's JSON
//! document into model values and never fail (malformed input decodes as
//! zero/default), while [`Fetcher`] issues the queries and reports
//! transport errors so the caller can keep its previous state instead.

use crate::hyprland::replies::{self, ClientJson, MonitorJson, WorkspaceJson, WorkspaceRef};
use crate::model::{
    slot_for_id, ActiveState, MonitorIdentity, Snapshot, Topology, WindowCounts,
};
use crate::traits::ControlInterface;
use log::{debug, info, warn};

/// Active workspace and focus of monitor `name` from a `monitors` reply.
///
/// A monitor missing from the reply reads as "no active slot, not
/// focused".
pub fn active_on(monitors_doc: &str, name: &str) -> ActiveState {
    let monitors: Vec<MonitorJson> = replies::decode("monitors", monitors_doc);
    match monitors.into_iter().find(|m| m.name == name) {
        Some(monitor) => ActiveState {
            workspace: slot_for_id(monitor.active_workspace.id),
            focus_here: monitor.focused,
        },
        None => {
            info!("monitor {} missing from monitors query", name);
            ActiveState {
                workspace: None,
                focus_here: false,
            }
        }
    }
}

/// Active workspace from an `activeworkspace` reply, used while this
/// instance's monitor is still unknown.  Focus is assumed to be here.
pub fn active_fallback(activeworkspace_doc: &str) -> ActiveState {
    let active: WorkspaceRef = replies::decode("activeworkspace", activeworkspace_doc);
    ActiveState {
        workspace: slot_for_id(active.id),
        focus_here: true,
    }
}

/// Owning monitor of every regular workspace from a `workspaces` reply.
pub fn topology(workspaces_doc: &str) -> Topology {
    let mut topology = Topology::default();
    let workspaces: Vec<WorkspaceJson> = replies::decode("workspaces", workspaces_doc);
    for ws in workspaces {
        let Some(n) = slot_for_id(ws.id) else {
            continue;
        };
        topology.owners[n - 1] = ws.monitor.filter(|m| !m.is_empty());
    }
    topology
}

/// Satellite slot number of a workspace named `<prefix>:N`.
fn satellite_slot(name: &str, prefix: &str) -> Option<usize> {
    let rest = name.strip_prefix(prefix)?.strip_prefix(':')?;
    rest.parse::<i64>().ok().and_then(slot_for_id)
}

/// Per-slot window counts from a `clients` reply.
///
/// Every client is counted once: on its regular workspace if the id is in
/// range, or on the satellite of slot `N` if the workspace is named
/// `<satellite_prefix>:N`.
pub fn count_windows(clients_doc: &str, satellite_prefix: &str) -> WindowCounts {
    let mut counts = WindowCounts::default();
    let clients: Vec<ClientJson> = replies::decode("clients", clients_doc);
    for client in clients {
        let ws = client.workspace;
        if let Some(n) = slot_for_id(ws.id) {
            counts.regular[n - 1] += 1;
        } else if let Some(n) = satellite_slot(&ws.name, satellite_prefix) {
            counts.satellite[n - 1] += 1;
        }
    }
    counts
}

/// Issues the data queries that rebuild (parts of) the model.
pub struct Fetcher<C: ControlInterface> {
    ctl: C,
    monitor: MonitorIdentity,
    satellite_prefix: String,
}

impl<C: ControlInterface> Fetcher<C> {
    pub fn new(ctl: C, monitor: MonitorIdentity, satellite_prefix: impl Into<String>) -> Self {
        Self {
            ctl,
            monitor,
            satellite_prefix: satellite_prefix.into(),
        }
    }

    pub fn ctl(&self) -> &C {
        &self.ctl
    }

    /// This monitor's active workspace and whether it holds input focus.
    pub fn fetch_active(&self) -> Result<ActiveState, C::Error> {
        match self.monitor.name() {
            Some(name) => Ok(active_on(&self.ctl.query("monitors")?, name)),
            None => {
                debug!("monitor unresolved, using global active workspace");
                Ok(active_fallback(&self.ctl.query("activeworkspace")?))
            }
        }
    }

    /// Owning monitor of every regular workspace (one query for all slots).
    pub fn fetch_topology(&self) -> Result<Topology, C::Error> {
        debug!("refreshing workspace topology");
        Ok(topology(&self.ctl.query("workspaces")?))
    }

    /// Window counts of every slot from one bulk client listing.
    pub fn fetch_window_counts(&self) -> Result<WindowCounts, C::Error> {
        debug!("refreshing window counts");
        Ok(count_windows(
            &self.ctl.query("clients")?,
            &self.satellite_prefix,
        ))
    }

    /// Rebuild the whole model.  Every counter and owner starts from zero,
    /// so state that disappeared since the last fetch is dropped.
    pub fn fetch_full_state(&self) -> Result<Snapshot, C::Error> {
        let active = self.fetch_active()?;
        let topology = self.fetch_topology()?;
        let counts = self.fetch_window_counts()?;
        debug!(
            "snapshot: active={:?} focus_here={}",
            active.workspace, active.focus_here
        );
        Ok(Snapshot {
            active,
            topology,
            counts,
        })
    }
}

/// Work out which monitor a bar surface of `width` pixels is on.
///
/// Order: explicit `override_name`, then a layer surface in `namespace`
/// whose width matches, then the focused monitor.  Several monitors
/// carrying a matching surface cannot be told apart; the first one wins.
pub fn resolve_identity<C: ControlInterface>(
    ctl: &C,
    override_name: Option<&str>,
    namespace: &str,
    width: Option<i32>,
) -> Option<String> {
    if let Some(name) = override_name.filter(|n| !n.is_empty()) {
        info!("using configured monitor {}", name);
        return Some(name.to_string());
    }

    if let Some(width) = width {
        match ctl.query("layers") {
            Ok(doc) => {
                let matches = monitors_with_layer(&doc, namespace, width);
                if matches.len() > 1 {
                    warn!(
                        "{} monitors carry a {}px '{}' surface ({}); picking {}",
                        matches.len(),
                        width,
                        namespace,
                        matches.join(", "),
                        matches[0]
                    );
                }
                if let Some(name) = matches.into_iter().next() {
                    info!("detected monitor {} from layer width {}", name, width);
                    return Some(name);
                }
            }
            Err(e) => warn!("layers query failed: {}", e),
        }
    }

    match ctl.query("monitors") {
        Ok(doc) => {
            let focused = focused_monitor(&doc);
            if let Some(name) = &focused {
                info!("falling back to focused monitor {}", name);
            }
            focused
        }
        Err(e) => {
            warn!("monitors query failed: {}", e);
            None
        }
    }
}

/// Monitors (in reply order) holding a layer surface in `namespace` that
/// is exactly `width` pixels wide, from a `layers` reply.
pub fn monitors_with_layer(layers_doc: &str, namespace: &str, width: i32) -> Vec<String> {
    replies::layer_monitors(layers_doc)
        .into_iter()
        .filter(|(_, monitor)| {
            monitor
                .surfaces()
                .any(|layer| layer.namespace == namespace && layer.w == i64::from(width))
        })
        .map(|(name, _)| name)
        .collect()
}

/// Name of the focused monitor from a `monitors` reply.
pub fn focused_monitor(monitors_doc: &str) -> Option<String> {
    let monitors: Vec<MonitorJson> = replies::decode("monitors", monitors_doc);
    monitors.into_iter().find(|m| m.focused).map(|m| m.name)
}
