//! Declared shapes of the `j/` query replies this crate reads.
//!
//! Only the fields we use are declared; everything else Hyprland sends is
//! ignored.  Every field has a default, so a reply that lacks one still
//! decodes.  A reply that does not decode at all is logged at info level
//! and read as empty.

use log::info;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

/// Reference to a workspace embedded in a monitor or client entry, and
/// the whole reply of `j/activeworkspace`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WorkspaceRef {
    pub id: i64,
    pub name: String,
}

/// Subset of an entry of `j/monitors`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonitorJson {
    pub name: String,
    pub focused: bool,
    pub active_workspace: WorkspaceRef,
}

/// Subset of an entry of `j/workspaces`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WorkspaceJson {
    pub id: i64,
    pub monitor: Option<String>,
}

/// Subset of an entry of `j/clients`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClientJson {
    pub workspace: WorkspaceRef,
}

/// One layer surface from `j/layers`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LayerJson {
    pub namespace: String,
    pub w: i64,
}

/// Layer surfaces of one monitor from `j/layers`, grouped by level.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LayerMonitorJson {
    pub levels: HashMap<String, Vec<LayerJson>>,
}

impl LayerMonitorJson {
    pub fn surfaces(&self) -> impl Iterator<Item = &LayerJson> {
        self.levels.values().flatten()
    }
}

/// Decode the reply of query `what`, falling back to the empty value.
pub fn decode<T: DeserializeOwned + Default>(what: &str, doc: &str) -> T {
    match serde_json::from_str(doc) {
        Ok(value) => value,
        Err(e) => {
            info!("ignoring malformed {} reply ({} bytes): {}", what, doc.len(), e);
            T::default()
        }
    }
}

/// Monitors of a `j/layers` reply in the order Hyprland lists them.
///
/// The reply is an object keyed by monitor name.  A monitor entry that
/// does not decode is skipped.
pub fn layer_monitors(doc: &str) -> Vec<(String, LayerMonitorJson)> {
    let monitors: serde_json::Map<String, serde_json::Value> = decode("layers", doc);
    monitors
        .into_iter()
        .filter_map(|(name, entry)| match LayerMonitorJson::deserialize(&entry) {
            Ok(monitor) => Some((name, monitor)),
            Err(e) => {
                info!("ignoring layers of monitor {}: {}", name, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_fields_come_from_their_own_entry() {
        let doc = r#"[{
            "id": 0,
            "activeWorkspace": {"id": 7, "name": "7"},
            "specialWorkspace": {"id": -98, "name": "special:2"},
            "name": "DP-1",
            "focused": true
        }]"#;
        let monitors: Vec<MonitorJson> = decode("monitors", doc);
        assert_eq!(monitors.len(), 1);
        assert_eq!(monitors[0].name, "DP-1");
        assert!(monitors[0].focused);
        assert_eq!(monitors[0].active_workspace.id, 7);
    }

    #[test]
    fn nested_ids_do_not_leak_into_missing_fields() {
        // A client without a workspace must not pick up an id nested
        // somewhere else in its entry.
        let doc = r#"[{"address":"0x1","grouped":[{"id":3}],"title":"x"}]"#;
        let clients: Vec<ClientJson> = decode("clients", doc);
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].workspace.id, 0);
        assert_eq!(clients[0].workspace.name, "");
    }

    #[test]
    fn missing_fields_take_defaults() {
        let workspaces: Vec<WorkspaceJson> = decode("workspaces", r#"[{"id":4},{}]"#);
        assert_eq!(workspaces[0].id, 4);
        assert_eq!(workspaces[0].monitor, None);
        assert_eq!(workspaces[1].id, 0);

        let active: WorkspaceRef = decode("activeworkspace", r#"{"name":"3"}"#);
        assert_eq!(active.id, 0);
        assert_eq!(active.name, "3");
    }

    #[test]
    fn malformed_replies_read_as_empty() {
        assert!(decode::<Vec<ClientJson>>("clients", "").is_empty());
        assert!(decode::<Vec<ClientJson>>("clients", "[{\"workspace\":").is_empty());
        assert!(decode::<Vec<MonitorJson>>("monitors", "unknown request").is_empty());
        assert!(decode::<Vec<WorkspaceJson>>("workspaces", r#"{"id":1}"#).is_empty());
        assert!(decode::<Vec<WorkspaceJson>>("workspaces", r#"[{"id":"four"}]"#).is_empty());
        assert_eq!(decode::<WorkspaceRef>("activeworkspace", "").id, 0);
    }

    #[test]
    fn layer_monitors_keep_reply_order() {
        let doc = r#"{
          "HDMI-A-1": {"levels": {"2": [{"namespace":"hyprslots","w":1920,"h":30}]}},
          "DP-1": {"levels": {
            "0": [{"namespace":"wallpaper","w":2560}],
            "2": [{"namespace":"hyprslots","w":2560}]
          }},
          "broken": {"levels": 5}
        }"#;
        let monitors = layer_monitors(doc);
        let names: Vec<&str> = monitors.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["HDMI-A-1", "DP-1"]);
        assert_eq!(monitors[1].1.surfaces().count(), 2);
        assert!(layer_monitors("[]").is_empty());
    }
}
