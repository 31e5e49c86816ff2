//! Test doubles shared by the unit tests.

use crate::traits::ControlInterface;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
#[error("canned ctl error")]
pub struct CannedError;

/// A [`ControlInterface`] that answers queries from a table of canned
/// documents and records everything it is asked.
///
/// Unknown queries answer with an empty document.
#[derive(Debug, Default)]
pub struct CannedCtl {
    responses: Mutex<HashMap<String, String>>,
    queries: Mutex<Vec<String>>,
    dispatches: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl CannedCtl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `what` with `doc`.
    pub fn with(self, what: &str, doc: &str) -> Self {
        self.set(what, doc);
        self
    }

    /// Make every call fail.
    pub fn failing(self) -> Self {
        self.set_failing(true);
        self
    }

    pub fn set(&self, what: &str, doc: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(what.to_string(), doc.to_string());
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn clear_queries(&self) {
        self.queries.lock().unwrap().clear();
    }

    pub fn dispatched(&self) -> Vec<String> {
        self.dispatches.lock().unwrap().clone()
    }
}

impl ControlInterface for CannedCtl {
    type Error = CannedError;

    fn query(&self, what: &str) -> Result<String, CannedError> {
        self.queries.lock().unwrap().push(what.to_string());
        if self.failing.load(Ordering::SeqCst) {
            return Err(CannedError);
        }
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(what)
            .cloned()
            .unwrap_or_default())
    }

    fn dispatch(&self, args: &str) -> Result<(), CannedError> {
        self.dispatches.lock().unwrap().push(args.to_string());
        if self.failing.load(Ordering::SeqCst) {
            return Err(CannedError);
        }
        Ok(())
    }
}

impl<C: ControlInterface> ControlInterface for std::sync::Arc<C> {
    type Error = C::Error;

    fn query(&self, what: &str) -> Result<String, C::Error> {
        (**self).query(what)
    }

    fn dispatch(&self, args: &str) -> Result<(), C::Error> {
        (**self).dispatch(args)
    }
}

/// `j/monitors` for two monitors; DP-1 is focused and shows workspace 1,
/// HDMI-A-1 shows workspace 5.
pub const MONITORS: &str = r#"[
  {"id":0,"name":"DP-1","width":2560,"height":1440,"x":0,"y":0,
   "activeWorkspace":{"id":1,"name":"1"},"specialWorkspace":{"id":0,"name":""},
   "focused":true},
  {"id":1,"name":"HDMI-A-1","width":1920,"height":1080,"x":2560,"y":0,
   "activeWorkspace":{"id":5,"name":"5"},"specialWorkspace":{"id":0,"name":""},
   "focused":false}
]"#;

/// `j/workspaces`: 1-3 on DP-1, 5 on HDMI-A-1, plus a special workspace.
pub const WORKSPACES: &str = r#"[
  {"id":1,"name":"1","monitor":"DP-1","monitorID":0,"windows":2},
  {"id":2,"name":"2","monitor":"DP-1","monitorID":0,"windows":1},
  {"id":3,"name":"3","monitor":"DP-1","monitorID":0,"windows":0},
  {"id":5,"name":"5","monitor":"HDMI-A-1","monitorID":1,"windows":1},
  {"id":-98,"name":"special:2","monitor":"DP-1","monitorID":0,"windows":1}
]"#;

/// `j/clients`: two windows on 1, one on 2, one on 5, one on special:2.
pub const CLIENTS: &str = r#"[
  {"address":"0x1","workspace":{"id":1,"name":"1"},"monitor":0,"class":"kitty"},
  {"address":"0x2","workspace":{"id":1,"name":"1"},"monitor":0,"class":"kitty"},
  {"address":"0x3","workspace":{"id":2,"name":"2"},"monitor":0,"class":"firefox"},
  {"address":"0x4","workspace":{"id":5,"name":"5"},"monitor":1,"class":"mpv"},
  {"address":"0x5","workspace":{"id":-98,"name":"special:2"},"monitor":0,"class":"btop"}
]"#;

/// A control interface loaded with the documents above.
pub fn two_monitor_ctl() -> CannedCtl {
    CannedCtl::new()
        .with("monitors", MONITORS)
        .with("workspaces", WORKSPACES)
        .with("clients", CLIENTS)
        .with("activeworkspace", r#"{"id":1,"name":"1","monitor":"DP-1"}"#)
}
