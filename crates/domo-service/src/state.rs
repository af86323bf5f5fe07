//! Application state shared between the simulator and facade callers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use domo_store::Store;
use tokio::sync::{Mutex, watch};

use crate::config::Config;

/// Shared application state.
///
/// The store is the only shared mutable resource: the simulator task and
/// any number of facade callers serialize access through the mutex, while
/// the database's WAL mode keeps external readers unblocked.
pub struct AppState {
    /// The data store (wrapped in Mutex for thread-safe access).
    pub store: Mutex<Store>,
    /// Service configuration.
    pub config: Config,
    /// Simulator control state.
    pub simulator: SimulatorState,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: Store, config: Config) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(store),
            config,
            simulator: SimulatorState::new(),
        })
    }
}

/// State for tracking and controlling the simulator.
pub struct SimulatorState {
    /// Whether the simulator loop is currently running.
    running: AtomicBool,
    /// Number of completed ticks (including failed ones).
    ticks: AtomicU64,
    /// Channel to signal the simulator task to stop.
    stop_tx: watch::Sender<bool>,
    /// Receiver for the stop signal (cloned by the simulator task).
    stop_rx: watch::Receiver<bool>,
}

impl SimulatorState {
    /// Create a new simulator state.
    pub fn new() -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            running: AtomicBool::new(false),
            ticks: AtomicU64::new(0),
            stop_tx,
            stop_rx,
        }
    }

    /// Check if the simulator is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Mark the simulator as running or stopped.
    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    /// Number of ticks executed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Record one executed tick.
    pub(crate) fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }

    /// Get a receiver for the stop signal.
    pub(crate) fn subscribe_stop(&self) -> watch::Receiver<bool> {
        self.stop_rx.clone()
    }

    /// Signal the simulator task to stop.
    ///
    /// Safe to call at any time: an in-flight tick completes before the
    /// loop honors the request.
    pub fn request_stop(&self) {
        let _ = self.stop_tx.send(true);
    }
}

impl Default for SimulatorState {
    fn default() -> Self {
        Self::new()
    }
}
