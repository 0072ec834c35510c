//! ConnectivityMonitor: one derived online/offline signal.
//!
//! Combines device-level signals (reported by the embedding shell) with
//! active reachability probing of the backend health endpoint. The
//! derived value is published over a watch channel whose value changes
//! only on real transitions, so a subscriber wakes exactly once per
//! offline-to-online edge.

use std::sync::{Arc, Mutex};

use tokio::sync::{watch, Notify};
use tokio::time::MissedTickBehavior;

use pantry_core::config::MonitorConfig;
use pantry_core::models::NetworkStatus;
use pantry_core::traits::HealthProbe;

struct MonitorShared {
    status: Mutex<NetworkStatus>,
    online_tx: watch::Sender<bool>,
    recheck: Notify,
}

impl MonitorShared {
    fn update<F: FnOnce(&mut NetworkStatus)>(&self, f: F) {
        let mut status = self.status.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut status);
        let online = status.is_online();
        drop(status);
        self.online_tx.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            *current = online;
            if online {
                tracing::info!("net: online");
            } else {
                tracing::info!("net: offline");
            }
            true
        });
    }
}

/// Cheap-clone read/subscribe surface shared with the coordinator, the
/// sync engine, and the embedding shell.
#[derive(Clone)]
pub struct ConnectivityHandle {
    shared: Arc<MonitorShared>,
}

impl ConnectivityHandle {
    /// Current raw status snapshot.
    pub fn status(&self) -> NetworkStatus {
        *self.shared.status.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The conservative derived signal.
    pub fn is_online(&self) -> bool {
        *self.shared.online_tx.borrow()
    }

    /// Subscribe to online/offline transitions. The receiver observes a
    /// value change exactly once per transition.
    pub fn subscribe_online(&self) -> watch::Receiver<bool> {
        self.shared.online_tx.subscribe()
    }

    /// Feed a device-level connectivity event. Losing the transport
    /// forces API reachability to `false` immediately; there is no point
    /// probing with no interface up.
    pub fn report_device_status(
        &self,
        is_connected: Option<bool>,
        is_internet_reachable: Option<bool>,
    ) {
        self.shared.update(|status| {
            status.is_connected = is_connected;
            status.is_internet_reachable = is_internet_reachable;
            if is_connected == Some(false) {
                status.is_api_reachable = Some(false);
            }
        });
        // A regained transport should not wait out the probe interval.
        if is_connected == Some(true) {
            self.shared.recheck.notify_one();
        }
    }

    /// Ask for an immediate probe, for callers that just saw an API
    /// failure and want a faster signal than the next scheduled tick.
    pub fn recheck_now(&self) {
        self.shared.recheck.notify_one();
    }
}

/// Owns the probe loop. Construct, take a [`ConnectivityHandle`], then
/// hand the monitor to `tokio::spawn(monitor.run())`.
pub struct ConnectivityMonitor<P> {
    prober: P,
    shared: Arc<MonitorShared>,
    config: MonitorConfig,
}

impl<P: HealthProbe> ConnectivityMonitor<P> {
    pub fn new(prober: P, config: MonitorConfig) -> Self {
        let (online_tx, _) = watch::channel(false);
        Self {
            prober,
            shared: Arc::new(MonitorShared {
                status: Mutex::new(NetworkStatus::default()),
                online_tx,
                recheck: Notify::new(),
            }),
            config,
        }
    }

    pub fn handle(&self) -> ConnectivityHandle {
        ConnectivityHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Probe loop: one probe on start, then one per interval tick or
    /// recheck request, suspended while the device has no transport.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(self.config.probe_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = self.shared.recheck.notified() => {}
            }

            let device_connected = {
                let status = self.shared.status.lock().unwrap_or_else(|e| e.into_inner());
                status.device_connected()
            };
            if !device_connected {
                continue;
            }

            let reachable = self.probe_once().await;
            self.shared
                .update(|status| status.is_api_reachable = Some(reachable));
        }
    }

    /// A probe that errors or times out is identical to an explicit
    /// "unreachable"; its own error never escapes the monitor.
    async fn probe_once(&self) -> bool {
        match tokio::time::timeout(self.config.probe_timeout(), self.prober.health()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::debug!("net: probe unreachable: {e}");
                false
            }
            Err(_) => {
                tracing::debug!("net: probe timed out");
                false
            }
        }
    }
}
