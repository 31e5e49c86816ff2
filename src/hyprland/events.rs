//! Reader for Hyprland's event socket (`socket2`).
//!
//! Hyprland broadcasts every state change as a line of the form
//! `EVENT>>DATA\n` on
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket2.sock`.
//!
//! [`EventStream`] keeps a connection to that socket open for as long as
//! its [`StreamControl`] says so:
//!
//! 1. **Connect**, reporting [`EventSink::connected`].  A failed connect
//!    waits [`RECONNECT_DELAY`] and tries again, forever.
//! 2. **Read** whatever is available.  A read can end in the middle of a
//!    line, so bytes go through a [`LineBuffer`] which holds the partial
//!    tail until the rest arrives.  Complete lines reach
//!    [`EventSink::line`] in arrival order, followed by one
//!    [`EventSink::batch_end`].
//! 3. **Disconnect** on EOF or a read error, pause, go back to 1.
//!
//! Reads time out every [`READ_TICK`] so the loop notices
//! [`StreamControl::stop`] even if the socket shutdown raced the connect.

use super::{instance_dir, HyprlandError};
use crate::traits::EventSink;
use log::{debug, info, warn};
use std::io::{ErrorKind, Read};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Pause between two connection attempts.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Read timeout; an idle connection reports [`EventSink::tick`] this often.
pub const READ_TICK: Duration = Duration::from_millis(250);

/// Bytes requested per read.
const READ_CHUNK: usize = 4096;

/// A partial line longer than this is dropped.
const MAX_PARTIAL: usize = 64 * 1024;

/// Splits a byte stream into lines across arbitrary read boundaries.
#[derive(Debug, Default)]
pub struct LineBuffer {
    partial: Vec<u8>,
}

impl LineBuffer {
    /// Append `chunk` and hand every line it completes to `on_line`.
    ///
    /// Empty lines are skipped and a trailing `\r` is removed.  Whatever
    /// follows the last newline is kept for the next call.
    pub fn feed(&mut self, chunk: &[u8], mut on_line: impl FnMut(&str)) {
        self.partial.extend_from_slice(chunk);

        let mut start = 0;
        while let Some(pos) = self.partial[start..].iter().position(|&b| b == b'\n') {
            let end = start + pos;
            let text = String::from_utf8_lossy(&self.partial[start..end]);
            let line = text.trim_end_matches('\r');
            if !line.is_empty() {
                on_line(line);
            }
            start = end + 1;
        }
        self.partial.drain(..start);

        if self.partial.len() > MAX_PARTIAL {
            warn!("dropping {} bytes without a line break", self.partial.len());
            self.partial.clear();
        }
    }

    /// Forget the partial line, e.g. after the connection it came from died.
    pub fn clear(&mut self) {
        self.partial.clear();
    }

    /// Bytes waiting for their line break.
    #[cfg(test)]
    fn pending(&self) -> usize {
        self.partial.len()
    }
}

/// Run/stop switch shared between an [`EventStream`] and its owner.
#[derive(Debug)]
pub struct StreamControl {
    running: AtomicBool,
    stream: Mutex<Option<UnixStream>>,
    sleep: Mutex<()>,
    wake: Condvar,
}

impl Default for StreamControl {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamControl {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            stream: Mutex::new(None),
            sleep: Mutex::new(()),
            wake: Condvar::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the stream: interrupt a pending reconnect pause and shut down
    /// the current connection so a blocked read returns.
    pub fn stop(&self) {
        {
            let _guard = self.sleep.lock().unwrap_or_else(PoisonError::into_inner);
            self.running.store(false, Ordering::SeqCst);
        }
        self.wake.notify_all();

        let attached = self
            .stream
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(stream) = attached {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    fn attach(&self, stream: &UnixStream) {
        if let Ok(handle) = stream.try_clone() {
            *self.stream.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        }
        if !self.is_running() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    fn detach(&self) {
        self.stream
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Sleep for `duration`, returning early once stopped.
    fn pause(&self, duration: Duration) {
        let guard = self.sleep.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = self
            .wake
            .wait_timeout_while(guard, duration, |_| self.is_running())
            .unwrap_or_else(PoisonError::into_inner);
    }
}

/// Long-lived reader of the Hyprland event socket.
#[derive(Debug, Clone)]
pub struct EventStream {
    path: PathBuf,
}

impl EventStream {
    /// Reader for the running Hyprland instance's `socket2`.
    pub fn from_env() -> Result<Self, HyprlandError> {
        Ok(Self::new(instance_dir()?.join(".socket2.sock")))
    }

    /// Reader for the event socket at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<UnixStream, HyprlandError> {
        let stream = UnixStream::connect(&self.path)
            .map_err(|e| HyprlandError(format!("connect to {}: {}", self.path.display(), e)))?;
        stream
            .set_read_timeout(Some(READ_TICK))
            .map_err(|e| HyprlandError(format!("read timeout: {}", e)))?;
        Ok(stream)
    }

    /// Feed events into `sink` until `control` is stopped.
    ///
    /// This method **blocks**, reconnecting as often as needed.  Run it on
    /// a dedicated thread.
    pub fn run<S: EventSink>(&self, control: &StreamControl, sink: &mut S) {
        let mut buf = [0u8; READ_CHUNK];
        let mut lines = LineBuffer::default();
        let mut failures = 0u32;

        while control.is_running() {
            let mut stream = match self.connect() {
                Ok(stream) => stream,
                Err(e) => {
                    if failures == 0 {
                        warn!("{}; retrying every {:?}", e, RECONNECT_DELAY);
                    } else {
                        debug!("{} (attempt {})", e, failures + 1);
                    }
                    failures += 1;
                    control.pause(RECONNECT_DELAY);
                    continue;
                }
            };
            info!("connected to {}", self.path.display());
            failures = 0;
            control.attach(&stream);
            lines.clear();
            sink.connected();

            while control.is_running() {
                match stream.read(&mut buf) {
                    Ok(0) => {
                        if control.is_running() {
                            warn!("event stream closed");
                        }
                        break;
                    }
                    Ok(n) => {
                        lines.feed(&buf[..n], |line| sink.line(line));
                        sink.batch_end();
                    }
                    Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                        sink.tick();
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        if control.is_running() {
                            warn!("event stream read error: {}", e);
                        }
                        break;
                    }
                }
            }

            control.detach();
            if control.is_running() {
                control.pause(RECONNECT_DELAY);
            }
        }
        info!("event stream stopped");
    }
}

//  Tests
