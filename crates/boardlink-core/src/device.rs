//! Device types captured by a discovery scan

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// A serial port observed during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialDevice {
    /// Port path (e.g., "/dev/ttyACM0" or "COM3")
    pub port: String,
    /// USB vendor ID as 4-digit lowercase hex, empty for non-USB ports
    pub vendor_id: String,
    /// USB product ID as 4-digit lowercase hex, empty for non-USB ports
    pub product_id: String,
}

impl SerialDevice {
    pub fn new(port: impl Into<String>, vendor_id: impl Into<String>, product_id: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            vendor_id: vendor_id.into(),
            product_id: product_id.into(),
        }
    }

    /// Build from a numeric USB VID/PID pair
    pub fn from_usb(port: impl Into<String>, vid: u16, pid: u16) -> Self {
        Self::new(port, format!("{:04x}", vid), format!("{:04x}", pid))
    }

    /// Whether the port reported USB identifiers
    pub fn is_usb(&self) -> bool {
        !self.vendor_id.is_empty() && !self.product_id.is_empty()
    }
}

/// A network device advertised during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDevice {
    /// Advertised address
    pub address: IpAddr,
    /// Advertised service port
    pub port: u16,
    /// Advertised board name, used for catalog lookup
    pub name: String,
    /// Full service instance name the advertisement came from
    pub service: String,
}

impl NetworkDevice {
    pub fn new(address: IpAddr, port: u16, name: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            address,
            port,
            name: name.into(),
            service: service.into(),
        }
    }
}

/// Point-in-time capture of every device observed by one scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub serial: Vec<SerialDevice>,
    pub network: Vec<NetworkDevice>,
    pub captured_at: DateTime<Utc>,
}

impl DeviceSnapshot {
    pub fn new(serial: Vec<SerialDevice>, network: Vec<NetworkDevice>) -> Self {
        Self {
            serial,
            network,
            captured_at: Utc::now(),
        }
    }

    /// A snapshot with no devices
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.serial.is_empty() && self.network.is_empty()
    }

    pub fn len(&self) -> usize {
        self.serial.len() + self.network.len()
    }
}
