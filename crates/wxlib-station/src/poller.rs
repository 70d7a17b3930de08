//! Periodic discovery and fetch scheduling.
//!
//! Two independent fixed-rate timers drive the system: a coarse discovery
//! timer that sweeps the local broadcast addresses for a station, and a
//! fine fetch timer that pulls the current values from whichever station
//! is known. Each timer runs on its own tokio task; a tick never overlaps
//! itself (the next tick waits for the previous body to finish), but the
//! two timers run concurrently with each other and with readers of
//! [`StationState`].
//!
//! There is no retry or backoff beyond "try again next tick", and no
//! cancellation mid-tick: [`StationPoller::shutdown`] takes effect at the
//! next tick boundary.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use wxlib_station::poller::StationPollerBuilder;
//! use wxlib_station::state::StationState;
//!
//! # async fn example() {
//! let state = Arc::new(StationState::new());
//! let poller = StationPollerBuilder::new()
//!     .fetch_interval(Duration::from_secs(10))
//!     .start(Arc::clone(&state));
//!
//! // ... read snapshots from `state` while the poller runs ...
//!
//! poller.shutdown().await;
//! # }
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::client::StationClient;
use crate::discovery;
use crate::state::StationState;

/// Builder for a [`StationPoller`].
///
/// All settings have defaults suitable for a station on the local
/// segment; construction is explicit so deployments can slow the
/// discovery sweep down or speed the fetch up without touching code.
#[derive(Debug, Clone)]
pub struct StationPollerBuilder {
    broadcast_port: u16,
    discovery_interval: Duration,
    discovery_initial_delay: Duration,
    fetch_interval: Duration,
    fetch_initial_delay: Duration,
    socket_timeout: Duration,
}

impl StationPollerBuilder {
    /// Create a builder with default settings: broadcast port 46000,
    /// discovery every 2 minutes starting immediately, fetch every 10
    /// seconds starting after 5 seconds, 5-second socket timeout.
    pub fn new() -> Self {
        StationPollerBuilder {
            broadcast_port: discovery::DEFAULT_BROADCAST_PORT,
            discovery_interval: Duration::from_secs(120),
            discovery_initial_delay: Duration::ZERO,
            fetch_interval: Duration::from_secs(10),
            fetch_initial_delay: Duration::from_secs(5),
            socket_timeout: Duration::from_secs(5),
        }
    }

    /// UDP port the discovery broadcast is sent to (default: 46000).
    pub fn broadcast_port(mut self, port: u16) -> Self {
        self.broadcast_port = port;
        self
    }

    /// Fixed rate of the discovery sweep (default: 120 s).
    pub fn discovery_interval(mut self, interval: Duration) -> Self {
        self.discovery_interval = interval;
        self
    }

    /// Delay before the first discovery sweep (default: none).
    pub fn discovery_initial_delay(mut self, delay: Duration) -> Self {
        self.discovery_initial_delay = delay;
        self
    }

    /// Fixed rate of the fetch tick (default: 10 s).
    pub fn fetch_interval(mut self, interval: Duration) -> Self {
        self.fetch_interval = interval;
        self
    }

    /// Delay before the first fetch tick (default: 5 s, giving the first
    /// discovery sweep a head start).
    pub fn fetch_initial_delay(mut self, delay: Duration) -> Self {
        self.fetch_initial_delay = delay;
        self
    }

    /// TCP connect and per-read timeout for fetches (default: 5 s).
    pub fn socket_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout = timeout;
        self
    }

    /// Spawn the discovery and fetch tasks against `state`.
    pub fn start(self, state: Arc<StationState>) -> StationPoller {
        let cancel = CancellationToken::new();

        let discovery_task = {
            let state = Arc::clone(&state);
            let cancel = cancel.clone();
            let port = self.broadcast_port;
            let start = Instant::now() + self.discovery_initial_delay;
            let mut ticker = tokio::time::interval_at(start, self.discovery_interval);
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = ticker.tick() => discovery_tick(port, &state).await,
                    }
                }
                tracing::debug!("Discovery task stopped");
            })
        };

        let fetch_task = {
            let cancel = cancel.clone();
            let client = StationClient::with_timeout(self.socket_timeout);
            let start = Instant::now() + self.fetch_initial_delay;
            let mut ticker = tokio::time::interval_at(start, self.fetch_interval);
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = ticker.tick() => fetch_tick(&client, &state).await,
                    }
                }
                tracing::debug!("Fetch task stopped");
            })
        };

        StationPoller {
            cancel,
            discovery_task,
            fetch_task,
        }
    }
}

impl Default for StationPollerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to the two running poller tasks.
///
/// Dropping the handle without calling
/// [`shutdown`](StationPoller::shutdown) leaves the tasks running for the
/// life of the runtime.
#[derive(Debug)]
pub struct StationPoller {
    cancel: CancellationToken,
    discovery_task: JoinHandle<()>,
    fetch_task: JoinHandle<()>,
}

impl StationPoller {
    /// Stop both timers and wait for their tasks to finish.
    ///
    /// A tick already in flight runs to completion first.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.discovery_task.await;
        let _ = self.fetch_task.await;
    }
}

/// One discovery tick: sweep every broadcast address for a station.
async fn discovery_tick(port: u16, state: &StationState) {
    tracing::info!("Looking for stations on the local network");

    let broadcasts = discovery::broadcast_addresses();
    if broadcasts.is_empty() {
        tracing::warn!("No broadcast-capable interfaces found");
    }

    let targets: Vec<SocketAddr> = broadcasts
        .into_iter()
        .map(|broadcast| SocketAddr::from((broadcast, port)))
        .collect();
    discovery_sweep(&targets, state).await;
}

/// Probe each target in order, recording the outcome as it goes.
///
/// A failed probe clears the known address even when an earlier probe in
/// the same sweep succeeded -- the last attempt processed wins the tick.
async fn discovery_sweep(targets: &[SocketAddr], state: &StationState) {
    for target in targets {
        match discovery::probe(*target).await {
            Ok(found) => {
                state.set_station(found.address);
            }
            Err(e) => {
                tracing::warn!(target = %target, error = %e, "Discovery attempt failed");
                state.clear_station();
            }
        }
    }
}

/// One fetch tick: pull current values from the known station, if any.
async fn fetch_tick(client: &StationClient, state: &StationState) {
    let Some(address) = state.station() else {
        tracing::debug!("No station known, skipping fetch");
        return;
    };

    tracing::info!(station = %address, "Refreshing data from station");
    if let Err(e) = client.fetch(address, state).await {
        tracing::warn!(station = %address, error = %e, "Fetch failed, retrying next tick");
    }
}
