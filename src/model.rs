//! The in-memory model of workspace state as seen from one bar instance.
//!
//! The model is a fixed table of [`WORKSPACE_COUNT`] slots plus the
//! [`LocalContext`] of the monitor this instance lives on.  Only the
//! background sync thread writes it; the UI thread reads it during a
//! resolve pass.

use std::sync::{Arc, OnceLock};

/// Number of regular workspaces (and paired satellite workspaces).
pub const WORKSPACE_COUNT: usize = 9;

/// Map a workspace id or name to its 1-based slot number.
///
/// Returns `None` for anything outside `1..=WORKSPACE_COUNT`, including
/// non-numeric names.
pub fn slot_number(raw: &str) -> Option<usize> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=WORKSPACE_COUNT).contains(n))
}

/// Same as [`slot_number`] for an already-decoded integer id.
pub fn slot_for_id(id: i64) -> Option<usize> {
    usize::try_from(id)
        .ok()
        .filter(|n| (1..=WORKSPACE_COUNT).contains(n))
}

/// State of one regular workspace and its satellite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceSlot {
    /// Windows on the regular workspace.
    pub window_count: u32,
    /// Windows on the paired satellite workspace.
    pub satellite_window_count: u32,
    /// Monitor the workspace is assigned to.  `None` means unknown, which
    /// the resolver treats as "on every monitor".
    pub owning_monitor: Option<String>,
}

impl WorkspaceSlot {
    /// `true` when neither the workspace nor its satellite hold windows.
    pub fn is_empty(&self) -> bool {
        self.window_count == 0 && self.satellite_window_count == 0
    }
}

/// Name of the monitor this instance is displayed on.
///
/// Starts out unresolved and can be resolved exactly once; every clone
/// observes the same value.  Until then, comparisons against it fail
/// closed (see [`MonitorIdentity::is`]).
#[derive(Debug, Clone, Default)]
pub struct MonitorIdentity(Arc<OnceLock<String>>);

impl MonitorIdentity {
    /// An identity that has not been resolved yet.
    pub fn unresolved() -> Self {
        Self::default()
    }

    /// An identity fixed to `name` from the start.
    pub fn resolved(name: impl Into<String>) -> Self {
        let id = Self::default();
        id.resolve(name);
        id
    }

    /// Fix the monitor name.  Returns `false` (and changes nothing) when
    /// the identity was already resolved or `name` is empty.
    pub fn resolve(&self, name: impl Into<String>) -> bool {
        let name = name.into();
        if name.is_empty() {
            return false;
        }
        self.0.set(name).is_ok()
    }

    /// The resolved name, if any.
    pub fn name(&self) -> Option<&str> {
        self.0.get().map(String::as_str)
    }

    pub fn is_resolved(&self) -> bool {
        self.0.get().is_some()
    }

    /// Whether `monitor` is this instance's monitor.  Always `false`
    /// while unresolved.
    pub fn is(&self, monitor: &str) -> bool {
        self.name() == Some(monitor)
    }
}

/// Per-instance view of "what is active here".
#[derive(Debug, Clone)]
pub struct LocalContext {
    pub monitor: MonitorIdentity,
    /// Slot currently shown on this monitor.  `None` when the active
    /// workspace is not one of the regular slots (or is unknown).
    pub active_workspace: Option<usize>,
    /// Whether the global input focus is on this monitor.
    pub focus_here: bool,
}

impl LocalContext {
    pub fn new(monitor: MonitorIdentity) -> Self {
        Self {
            monitor,
            active_workspace: Some(1),
            focus_here: true,
        }
    }
}

/// Active workspace and focus as reported by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveState {
    pub workspace: Option<usize>,
    pub focus_here: bool,
}

/// Owning monitor of every slot, index `n - 1` for slot `n`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    pub owners: [Option<String>; WORKSPACE_COUNT],
}

/// Window counts of every slot, index `n - 1` for slot `n`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowCounts {
    pub regular: [u32; WORKSPACE_COUNT],
    pub satellite: [u32; WORKSPACE_COUNT],
}

/// Everything a full re-fetch produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub active: ActiveState,
    pub topology: Topology,
    pub counts: WindowCounts,
}

/// The complete state shared between the sync thread and the UI.
#[derive(Debug, Clone)]
pub struct Model {
    pub slots: [WorkspaceSlot; WORKSPACE_COUNT],
    pub local: LocalContext,
}

impl Model {
    pub fn new(monitor: MonitorIdentity) -> Self {
        Self {
            slots: Default::default(),
            local: LocalContext::new(monitor),
        }
    }

    /// Slot `n` (1-based).
    ///
    /// # Panics
    ///
    /// Panics if `n` is outside `1..=WORKSPACE_COUNT`.
    pub fn slot(&self, n: usize) -> &WorkspaceSlot {
        &self.slots[n - 1]
    }

    pub fn apply_active(&mut self, active: ActiveState) {
        self.local.active_workspace = active.workspace;
        self.local.focus_here = active.focus_here;
    }

    /// Replace every owning monitor, clearing slots absent from `topology`.
    pub fn apply_topology(&mut self, topology: Topology) {
        for (slot, owner) in self.slots.iter_mut().zip(topology.owners) {
            slot.owning_monitor = owner;
        }
    }

    /// Replace every window count, so workspaces that lost all their
    /// windows read as empty.
    pub fn apply_counts(&mut self, counts: &WindowCounts) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.window_count = counts.regular[i];
            slot.satellite_window_count = counts.satellite[i];
        }
    }

    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.apply_active(snapshot.active);
        self.apply_topology(snapshot.topology);
        self.apply_counts(&snapshot.counts);
    }
}
