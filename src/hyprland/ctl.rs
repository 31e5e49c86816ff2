//! [`ControlInterface`] implementation backed by Hyprland's command socket.
//!
//! Communicates directly with Hyprland through
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`,
//! avoiding any `hyprctl` child process.

use super::{instance_dir, HyprlandError};
use crate::traits::ControlInterface;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for one request, so a stalled compositor cannot hang the
/// caller.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Hyprland command socket client.
///
/// No connection is kept open; every request opens a short-lived one, as
/// Hyprland closes the socket after each response.
#[derive(Debug, Clone)]
pub struct HyprlandCtl {
    path: PathBuf,
}

impl HyprlandCtl {
    /// Client for the running Hyprland instance.
    pub fn from_env() -> Result<Self, HyprlandError> {
        Ok(Self::new(instance_dir()?.join(".socket.sock")))
    }

    /// Client for the command socket at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Send a raw request and return the response.
    fn request(&self, command: &str) -> Result<String, HyprlandError> {
        let mut stream = UnixStream::connect(&self.path).map_err(|e| {
            HyprlandError(format!("connect to {}: {}", self.path.display(), e))
        })?;
        stream
            .set_read_timeout(Some(REQUEST_TIMEOUT))
            .and_then(|_| stream.set_write_timeout(Some(REQUEST_TIMEOUT)))
            .map_err(|e| HyprlandError(format!("timeout: {}", e)))?;

        stream
            .write_all(command.as_bytes())
            .map_err(|e| HyprlandError(format!("write: {}", e)))?;

        let mut response = Vec::new();
        stream
            .read_to_end(&mut response)
            .map_err(|e| HyprlandError(format!("read: {}", e)))?;

        String::from_utf8(response).map_err(|e| HyprlandError(format!("utf-8: {}", e)))
    }
}

impl ControlInterface for HyprlandCtl {
    type Error = HyprlandError;

    /// Send a JSON data query (`j/<what>`).
    fn query(&self, what: &str) -> Result<String, HyprlandError> {
        self.request(&format!("j/{}", what))
    }

    /// Send a dispatch command and check for `"ok"`.
    fn dispatch(&self, args: &str) -> Result<(), HyprlandError> {
        let response = self.request(&format!("/dispatch {}", args))?;
        if response.trim() == "ok" {
            Ok(())
        } else {
            Err(HyprlandError(format!("dispatch error: {}", response)))
        }
    }
}

//  Tests
