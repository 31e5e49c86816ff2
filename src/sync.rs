//! The background synchronizer that ties the event stream, the fetcher,
//! and the model together.
//!
//! [`SyncHandle::spawn`] starts one thread which fetches a full snapshot,
//! then follows the event stream.  That thread is the only writer of the
//! [`Model`].  Whenever it changed something it calls the `notify`
//! callback, which the front end uses to schedule a resolve pass on its own
//! thread; further changes before that pass ran do not notify again.
//!
//! The model lock is held for short mutations and for one resolve pass,
//! never across a socket read or a query.

use crate::config::Config;
use crate::fetch::Fetcher;
use crate::hyprland::events::{EventStream, StreamControl};
use crate::interpreter::{apply_event, classify, Effect};
use crate::model::{Model, MonitorIdentity, WORKSPACE_COUNT};
use crate::resolver::{resolve_all, SlotView};
use crate::traits::{ControlInterface, EventSink};
use log::{debug, info, warn};
use signal_hook::SigId;
use std::os::raw::c_int;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

/// State shared between the sync thread and its owner.
#[derive(Debug)]
struct Shared {
    model: Mutex<Model>,
    /// A notification was sent and its resolve pass has not started yet.
    redisplay_pending: AtomicBool,
    /// The owner asked for a full re-fetch.  Shared with signal handlers.
    resync_requested: Arc<AtomicBool>,
}

impl Shared {
    fn model(&self) -> MutexGuard<'_, Model> {
        self.model.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The sync thread's side: consumes event lines and keeps the model
/// current.
struct Worker<C: ControlInterface, N: Fn()> {
    fetcher: Fetcher<C>,
    shared: Arc<Shared>,
    notify: N,
    /// Model changed since the last notification.
    dirty: bool,
    refresh_windows: bool,
    refresh_topology: bool,
    /// A full snapshot has been applied at least once.
    synced: bool,
    connections: u32,
}

impl<C: ControlInterface, N: Fn()> Worker<C, N> {
    fn new(fetcher: Fetcher<C>, shared: Arc<Shared>, notify: N) -> Self {
        Self {
            fetcher,
            shared,
            notify,
            dirty: false,
            refresh_windows: false,
            refresh_topology: false,
            synced: false,
            connections: 0,
        }
    }

    /// Re-fetch everything.  On a query failure the previous state stays.
    fn resync(&mut self) {
        match self.fetcher.fetch_full_state() {
            Ok(snapshot) => {
                self.shared.model().apply_snapshot(snapshot);
                self.dirty = true;
                self.synced = true;
                // A full fetch covers any partial refresh still queued.
                self.refresh_windows = false;
                self.refresh_topology = false;
            }
            Err(e) => warn!("full re-fetch failed, keeping previous state: {}", e),
        }
    }

    /// Run the re-fetches queued by the lines of the last chunk.
    fn run_refreshes(&mut self) {
        if std::mem::take(&mut self.refresh_topology) {
            match self.fetcher.fetch_topology() {
                Ok(topology) => {
                    self.shared.model().apply_topology(topology);
                    self.dirty = true;
                }
                Err(e) => warn!("topology re-fetch failed: {}", e),
            }
        }
        if std::mem::take(&mut self.refresh_windows) {
            match self.fetcher.fetch_window_counts() {
                Ok(counts) => {
                    self.shared.model().apply_counts(&counts);
                    self.dirty = true;
                }
                Err(e) => warn!("window count re-fetch failed: {}", e),
            }
        }
    }

    /// Notify the owner if the model changed and no pass is pending.
    fn flush(&mut self) {
        if !std::mem::take(&mut self.dirty) {
            return;
        }
        if !self.shared.redisplay_pending.swap(true, Ordering::SeqCst) {
            (self.notify)();
        }
    }

    fn take_resync_request(&mut self) {
        if self.shared.resync_requested.swap(false, Ordering::SeqCst) {
            debug!("resync requested");
            self.resync();
            self.flush();
        }
    }
}

impl<C: ControlInterface, N: Fn()> EventSink for Worker<C, N> {
    fn line(&mut self, line: &str) {
        let Some(event) = classify(line) else {
            return;
        };
        debug!("event {}", line);
        let effect = apply_event(&mut self.shared.model(), &event);
        match effect {
            Effect::Redisplay => self.dirty = true,
            Effect::RefreshWindows => self.refresh_windows = true,
            Effect::RefreshTopology => self.refresh_topology = true,
        }
    }

    fn batch_end(&mut self) {
        self.run_refreshes();
        self.flush();
        self.take_resync_request();
    }

    fn connected(&mut self) {
        self.connections += 1;
        let requested = self.shared.resync_requested.swap(false, Ordering::SeqCst);
        // Events sent while we were away are lost; start from the truth.
        if self.connections > 1 {
            info!("reconnected, re-fetching full state");
        } else if !self.synced {
            info!("no snapshot yet, re-fetching full state");
        } else if !requested {
            return;
        }
        self.resync();
        self.flush();
    }

    fn tick(&mut self) {
        self.take_resync_request();
    }
}

/// Owner's handle on the sync thread.
///
/// Dropping the handle stops the thread and waits for it, so no write can
/// land after the owner let go of the model.
pub struct SyncHandle {
    shared: Arc<Shared>,
    control: Arc<StreamControl>,
    monitor: MonitorIdentity,
    signals: Vec<SigId>,
    thread: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Start the sync thread.
    ///
    /// The thread first fetches a full snapshot, then follows `stream`.
    /// `notify` is called from the sync thread whenever a resolve pass is
    /// due; it should only schedule [`resolve_pass`](Self::resolve_pass)
    /// on the owner's thread.
    pub fn spawn<C, N>(
        ctl: C,
        config: &Config,
        monitor: MonitorIdentity,
        stream: EventStream,
        notify: N,
    ) -> std::io::Result<Self>
    where
        C: ControlInterface + 'static,
        N: Fn() + Send + 'static,
    {
        let shared = Arc::new(Shared {
            model: Mutex::new(Model::new(monitor.clone())),
            redisplay_pending: AtomicBool::new(false),
            resync_requested: Arc::default(),
        });
        let control = Arc::new(StreamControl::new());
        let fetcher = Fetcher::new(ctl, monitor.clone(), config.satellite_prefix.clone());

        let thread = {
            let shared = shared.clone();
            let control = control.clone();
            std::thread::Builder::new()
                .name("hyprslots-sync".into())
                .spawn(move || {
                    info!("sync thread started");
                    let mut worker = Worker::new(fetcher, shared, notify);
                    worker.resync();
                    worker.flush();
                    stream.run(&control, &mut worker);
                    info!("sync thread finished");
                })?
        };

        Ok(Self {
            shared,
            control,
            monitor,
            signals: Vec::new(),
            thread: Some(thread),
        })
    }

    /// The monitor identity shared with the sync thread.
    pub fn monitor(&self) -> &MonitorIdentity {
        &self.monitor
    }

    /// Resolve every slot against the current model.
    ///
    /// Clears the pending flag first, so a change landing during this pass
    /// notifies again.
    pub fn resolve_pass(&self, config: &Config) -> [SlotView; WORKSPACE_COUNT] {
        self.shared.redisplay_pending.store(false, Ordering::SeqCst);
        resolve_all(&self.shared.model(), config)
    }

    /// Ask the sync thread for a full re-fetch.  It runs after the current
    /// read returns, at the latest one read timeout later.
    pub fn request_resync(&self) {
        self.shared.resync_requested.store(true, Ordering::SeqCst);
    }

    /// Request a full re-fetch whenever the process receives `signal`,
    /// e.g. `pkill -USR1 hyprslots`.
    pub fn resync_on_signal(&mut self, signal: c_int) -> std::io::Result<()> {
        let id = signal_hook::flag::register(signal, self.shared.resync_requested.clone())?;
        self.signals.push(id);
        Ok(())
    }

    /// Stop the sync thread and wait for it.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        for id in self.signals.drain(..) {
            signal_hook::low_level::unregister(id);
        }
        let Some(thread) = self.thread.take() else {
            return;
        };
        self.control.stop();
        if thread.join().is_err() {
            warn!("sync thread panicked");
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
