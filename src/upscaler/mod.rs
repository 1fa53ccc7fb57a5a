//! Batch upscaling engine split into focused submodules.
//!
//! The `BatchUpscaler` struct and its methods are organized by domain:
//! - [`scheduler`] - window partitioning, barriers, and run orchestration
//! - [`item_task`] - per-item upload → transform → archive pipeline
//! - [`session`] - per-run item states and aggregate counters

mod item_task;
mod scheduler;
mod session;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::error::Result;
use crate::types::{BatchStats, Event, ItemState};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, broadcast};

use session::RunSession;

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Batch upscaling engine (cloneable - all fields are Arc-wrapped)
///
/// Owns the per-run session state and the event channel. Consumers create
/// one engine, subscribe to events, and drive it with
/// [`run`](BatchUpscaler::run).
#[derive(Clone)]
pub struct BatchUpscaler {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Shared HTTP client reused across all uploads and fetches
    pub(crate) client: reqwest::Client,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Per-run state: item states and aggregate counters
    pub(crate) session: Arc<Mutex<RunSession>>,
    /// Flag preventing concurrent runs and mid-run resets
    pub(crate) running: Arc<AtomicBool>,
}

impl BatchUpscaler {
    /// Create an engine, validating the configuration up front
    ///
    /// Fails with a configuration error before any network traffic when the
    /// credentials are missing or an endpoint base is malformed.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            config: Arc::new(config),
            client: reqwest::Client::new(),
            event_tx,
            session: Arc::new(Mutex::new(RunSession::empty())),
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Subscribe to run events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Snapshot of the aggregate counters
    pub async fn stats(&self) -> BatchStats {
        self.session.lock().await.stats
    }

    /// Snapshot of every item's state, in selection order
    pub async fn item_states(&self) -> Vec<ItemState> {
        self.session.lock().await.states.clone()
    }

    /// Whether a run is currently active
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Discard the previous run's item states and counters
    ///
    /// A no-op while a run is active; calling it repeatedly when idle always
    /// leaves zeroed stats and an empty item set.
    pub async fn reset(&self) {
        if self.is_running() {
            tracing::debug!("reset ignored while a run is active");
            return;
        }
        self.session.lock().await.clear();
    }

    /// Current configuration
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }
}
