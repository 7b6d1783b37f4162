//! Serial port observer

use boardlink_core::SerialDevice;
use serialport::{SerialPortInfo, SerialPortType};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tracing::{debug, trace, warn};

use crate::table::DeviceTable;

/// Enumerate serial ports on the calling thread
pub fn enumerate() -> Result<Vec<SerialDevice>, serialport::Error> {
    let ports = serialport::available_ports()?;
    Ok(ports.into_iter().map(to_device).collect())
}

fn to_device(info: SerialPortInfo) -> SerialDevice {
    match info.port_type {
        SerialPortType::UsbPort(usb) => SerialDevice::from_usb(info.port_name, usb.vid, usb.pid),
        _ => SerialDevice::new(info.port_name, "", ""),
    }
}

/// Enumerate once and fold the result into the table
///
/// Enumeration failures leave the table untouched.
pub async fn refresh(table: &RwLock<DeviceTable>) {
    match tokio::task::spawn_blocking(enumerate).await {
        Ok(Ok(ports)) => {
            trace!(count = ports.len(), "Enumerated serial ports");
            let changes = table.write().await.sync_serial(ports);
            if !changes.is_empty() {
                debug!(
                    attached = changes.attached.len(),
                    detached = changes.detached.len(),
                    "Serial ports changed"
                );
            }
        }
        Ok(Err(e)) => warn!(error = %e, "Cannot enumerate serial ports"),
        Err(e) => warn!(error = %e, "Serial enumeration task failed"),
    }
}

/// Poll serial ports until shutdown is signalled
pub async fn observe(table: Arc<RwLock<DeviceTable>>, poll_interval: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(poll_interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => refresh(&table).await,
            _ = shutdown.changed() => break,
        }
    }

    trace!("Serial observer stopped");
}
