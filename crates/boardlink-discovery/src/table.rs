//! Live device table fed by the transport observers

use boardlink_core::{DeviceSnapshot, NetworkDevice, SerialDevice};
use std::collections::BTreeMap;
use std::net::IpAddr;
use tracing::{debug, info};

/// Devices currently present, keyed so snapshots come out in a stable order
#[derive(Debug, Default)]
pub struct DeviceTable {
    serial: BTreeMap<String, SerialDevice>,
    network: BTreeMap<(String, IpAddr), NetworkDevice>,
}

/// Serial changes between two enumerations
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SerialChanges {
    pub attached: Vec<SerialDevice>,
    pub detached: Vec<String>,
}

impl SerialChanges {
    pub fn is_empty(&self) -> bool {
        self.attached.is_empty() && self.detached.is_empty()
    }
}

impl DeviceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the serial half with a fresh enumeration
    pub fn sync_serial(&mut self, ports: Vec<SerialDevice>) -> SerialChanges {
        let mut current = BTreeMap::new();
        for device in ports {
            current.insert(device.port.clone(), device);
        }

        let mut changes = SerialChanges::default();
        for (port, device) in &current {
            if self.serial.get(port) != Some(device) {
                info!(
                    port = %port,
                    vid = %device.vendor_id,
                    pid = %device.product_id,
                    "Serial device attached"
                );
                changes.attached.push(device.clone());
            }
        }
        for port in self.serial.keys() {
            if !current.contains_key(port) {
                info!(port = %port, "Serial device detached");
                changes.detached.push(port.clone());
            }
        }

        self.serial = current;
        changes
    }

    /// Record the addresses a resolved service advertises
    pub fn upsert_service(&mut self, service: &str, devices: Vec<NetworkDevice>) {
        self.network.retain(|(name, _), _| name != service);
        for device in devices {
            info!(
                service = %service,
                address = %device.address,
                port = device.port,
                name = %device.name,
                "Network device resolved"
            );
            self.network.insert((service.to_string(), device.address), device);
        }
    }

    /// Drop every address of a removed service, returning how many went away
    pub fn remove_service(&mut self, service: &str) -> usize {
        let before = self.network.len();
        self.network.retain(|(name, _), _| name != service);
        let removed = before - self.network.len();
        if removed > 0 {
            debug!(service = %service, removed, "Network service removed");
        }
        removed
    }

    /// Copy the current contents into an immutable snapshot
    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot::new(
            self.serial.values().cloned().collect(),
            self.network.values().cloned().collect(),
        )
    }
}
