//! Boardlink Discovery - Device discovery for board resolution
//!
//! This crate observes two transports during a bounded scan window:
//! - Serial ports, polled through the platform port enumeration
//! - Network boards, browsed over mDNS
//!
//! Both feed a single device table that is captured as a snapshot when the
//! window closes.

pub mod monitor;
pub mod network;
pub mod serial;
pub mod table;

pub use monitor::{DiscoveryMonitor, MonitorConfig, ScanHandle};
pub use table::{DeviceTable, SerialChanges};
