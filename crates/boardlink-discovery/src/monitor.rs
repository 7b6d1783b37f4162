//! Discovery monitor combining the serial and network observers
//!
//! `DiscoveryMonitor::start` spawns the observers and returns a
//! [`ScanHandle`] immediately. `ScanHandle::capture_after` waits for the
//! scan window, stops the observers, releases the mDNS daemon and hands
//! back a snapshot of what was present when the window closed.

use boardlink_core::{DeviceScanner, DeviceSnapshot};
use mdns_sd::ServiceDaemon;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::network::{self, ARDUINO_SERVICE};
use crate::serial;
use crate::table::DeviceTable;

/// Monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Serial port polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// mDNS service types to browse (e.g., "_arduino._tcp.local.")
    pub mdns_services: Vec<String>,
    /// Watch serial ports
    pub use_serial: bool,
    /// Browse mDNS for network boards
    pub use_mdns: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            mdns_services: vec![ARDUINO_SERVICE.to_string()],
            use_serial: true,
            use_mdns: true,
        }
    }
}

/// Discovery monitor
#[derive(Debug, Clone)]
pub struct DiscoveryMonitor {
    config: MonitorConfig,
}

impl DiscoveryMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }

    /// Start observing devices
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> ScanHandle {
        let table = Arc::new(RwLock::new(DeviceTable::new()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut tasks = JoinSet::new();

        if self.config.use_serial {
            let interval = Duration::from_millis(self.config.poll_interval_ms.max(1));
            tasks.spawn(serial::observe(table.clone(), interval, shutdown_rx.clone()));
        }

        let daemon = if self.config.use_mdns {
            network::start(&self.config.mdns_services, table.clone(), shutdown_rx, &mut tasks)
        } else {
            None
        };

        debug!(
            serial = self.config.use_serial,
            mdns = daemon.is_some(),
            "Discovery monitor started"
        );

        ScanHandle {
            table,
            shutdown_tx,
            tasks,
            daemon,
            refresh_serial: self.config.use_serial,
        }
    }
}

impl DeviceScanner for DiscoveryMonitor {
    fn scan(&self, window: Duration) -> impl Future<Output = DeviceSnapshot> + Send {
        let handle = self.start();
        handle.capture_after(window)
    }
}

/// A running scan
///
/// Dropping the handle without capturing still stops the observers and
/// the mDNS daemon.
pub struct ScanHandle {
    table: Arc<RwLock<DeviceTable>>,
    shutdown_tx: watch::Sender<bool>,
    tasks: JoinSet<()>,
    daemon: Option<ServiceDaemon>,
    refresh_serial: bool,
}

impl ScanHandle {
    /// Wait for `window`, then stop observing and return the snapshot
    pub async fn capture_after(mut self, window: Duration) -> DeviceSnapshot {
        tokio::time::sleep(window).await;
        self.capture().await
    }

    async fn capture(&mut self) -> DeviceSnapshot {
        let _ = self.shutdown_tx.send(true);
        if let Some(daemon) = self.daemon.take() {
            network::stop(daemon);
        }
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "Discovery observer failed");
            }
        }

        // Catch ports that appeared since the last poll
        if self.refresh_serial {
            serial::refresh(&self.table).await;
        }

        let snapshot = self.table.read().await.snapshot();
        info!(
            serial = snapshot.serial.len(),
            network = snapshot.network.len(),
            "Discovery snapshot captured"
        );
        snapshot
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(daemon) = self.daemon.take() {
            network::stop(daemon);
        }
    }
}
