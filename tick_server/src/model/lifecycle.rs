//! Stop signal and join coordination for the provider's background threads.
//!
//! The controller walks through `Starting → Running → Stopping → Stopped`:
//!
//! - `spawn` registers named worker threads while the provider starts.
//! - `request_stop` sets the one-way stop signal. Any party may call it (the snapshot
//!   cap, an RPC `shutdown`, Ctrl+C); only the first call has an effect.
//! - `wait_timeout` is the interruptible sleep used by every worker loop.
//! - `shutdown` requests a stop and joins all workers, so the provider is `Stopped`
//!   when it returns. Concurrent callers block until the joining caller is done.
//!
//! Both signals are crossbeam channels that never carry a message: the controller
//! keeps the only `Sender` and drops it to broadcast, which wakes every blocked
//! `recv`/`recv_timeout` with `Disconnected` at once.
//!
//! Workers must call `request_stop`, never `shutdown`: a thread cannot join itself.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use log::{debug, error, info};
use tick_common::ProviderError;

/// Process lifecycle as seen by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LifecycleState {
    /// Background threads are being spawned.
    Starting = 0,
    /// All background threads are live.
    Running = 1,
    /// The stop signal is set; threads may still be finishing.
    Stopping = 2,
    /// Every background thread has been joined. Terminal.
    Stopped = 3,
}

impl LifecycleState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => LifecycleState::Starting,
            1 => LifecycleState::Running,
            2 => LifecycleState::Stopping,
            _ => LifecycleState::Stopped,
        }
    }
}

struct Worker {
    name: &'static str,
    handle: JoinHandle<()>,
}

/// Shared stop signal plus the join handles of the threads it governs.
pub struct LifecycleController {
    state: AtomicU8,
    stop_tx: Mutex<Option<Sender<()>>>,
    stop_rx: Receiver<()>,
    done_tx: Mutex<Option<Sender<()>>>,
    done_rx: Receiver<()>,
    /// `None` once a `shutdown` call has taken ownership of the handles.
    workers: Mutex<Option<Vec<Worker>>>,
}

impl Default for LifecycleController {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleController {
    /// Creates a controller in the `Starting` state with no workers.
    pub fn new() -> Self {
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let (done_tx, done_rx) = bounded::<()>(0);
        Self {
            state: AtomicU8::new(LifecycleState::Starting as u8),
            stop_tx: Mutex::new(Some(stop_tx)),
            stop_rx,
            done_tx: Mutex::new(Some(done_tx)),
            done_rx,
            workers: Mutex::new(Some(Vec::new())),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// `true` once the stop signal has been set by anyone.
    pub fn is_stop_requested(&self) -> bool {
        self.state() >= LifecycleState::Stopping
    }

    /// Spawns a named worker thread whose lifetime is bound to this controller.
    pub fn spawn<F>(&self, name: &'static str, task: F) -> Result<(), ProviderError>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut workers = self.workers.lock()?;
        let Some(workers) = workers.as_mut() else {
            return Err(ProviderError::Worker(format!(
                "cannot spawn {name}: provider already shut down"
            )));
        };
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(task)
            .map_err(|e| ProviderError::Worker(format!("failed to spawn {name}: {e}")))?;
        debug!("Spawned worker thread {}", name);
        workers.push(Worker { name, handle });
        Ok(())
    }

    /// Moves `Starting → Running`. Has no effect if a stop was already requested.
    pub fn mark_running(&self) {
        let _ = self.state.compare_exchange(
            LifecycleState::Starting as u8,
            LifecycleState::Running as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    /// Sets the stop signal. Returns `true` only for the call that actually set it.
    pub fn request_stop(&self) -> bool {
        let _ = self
            .state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |raw| {
                (raw < LifecycleState::Stopping as u8).then_some(LifecycleState::Stopping as u8)
            });
        let sender = self
            .stop_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if sender.is_some() {
            info!("Stop requested");
        }
        sender.is_some()
    }

    /// Sleeps for up to `timeout`, waking early on a stop request.
    ///
    /// Returns `true` if the stop signal is set, `false` if the full timeout elapsed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        !matches!(
            self.stop_rx.recv_timeout(timeout),
            Err(RecvTimeoutError::Timeout)
        )
    }

    /// Blocks until someone requests a stop.
    pub fn wait_for_stop_request(&self) {
        let _ = self.stop_rx.recv();
    }

    /// Blocks until a `shutdown` call has joined every worker.
    pub fn wait_stopped(&self) {
        let _ = self.done_rx.recv();
    }

    /// Requests a stop and joins every worker. Idempotent.
    ///
    /// Returns an error if a worker panicked; the controller is `Stopped` either way.
    pub fn shutdown(&self) -> Result<(), ProviderError> {
        self.request_stop();

        let taken = self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(workers) = taken else {
            self.wait_stopped();
            return Ok(());
        };

        let mut panicked = Vec::new();
        for worker in workers {
            match worker.handle.join() {
                Ok(()) => debug!("Worker {} joined", worker.name),
                Err(_) => {
                    error!("Worker {} panicked before shutdown", worker.name);
                    panicked.push(worker.name);
                }
            }
        }

        self.state
            .store(LifecycleState::Stopped as u8, Ordering::SeqCst);
        self.done_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        info!("All worker threads stopped");

        if panicked.is_empty() {
            Ok(())
        } else {
            Err(ProviderError::Worker(format!(
                "worker(s) panicked: {}",
                panicked.join(", ")
            )))
        }
    }
}
