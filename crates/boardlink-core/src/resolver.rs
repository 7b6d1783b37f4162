//! Device resolution - Matches a board URI against a scan snapshot
//!
//! Matching is a linear scan over the snapshot. When several devices or
//! several catalog boards match, the first one in iteration order wins;
//! snapshots are ordered by the discovery monitor and catalog results
//! follow catalog order, so repeated calls on unchanged inputs agree.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::catalog::{BoardCatalog, BoardDefinition};
use crate::device::DeviceSnapshot;
use crate::uri::{DeviceUri, Transport};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No board has been found at {0}")]
    DeviceNotFound(DeviceUri),
    #[error("No supported board has been found for {signature} at {uri}, try installing new cores or check the board URI")]
    UnsupportedBoard { uri: DeviceUri, signature: String },
}

/// The binding produced by a successful resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachResult {
    pub board: BoardDefinition,
    #[serde(rename = "type")]
    pub transport: Transport,
}

/// Resolves board URIs using a board catalog
pub struct DeviceResolver<'a, C: BoardCatalog> {
    catalog: &'a C,
}

impl<'a, C: BoardCatalog> DeviceResolver<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Find the board connected at `uri`
    pub fn resolve(&self, uri: &DeviceUri, snapshot: DeviceSnapshot) -> Result<BoardDefinition, ResolveError> {
        let (boards, signature) = match uri {
            DeviceUri::Serial { path } => {
                let device = snapshot
                    .serial
                    .iter()
                    .find(|d| d.port == *path)
                    .ok_or_else(|| ResolveError::DeviceNotFound(uri.clone()))?;

                debug!(
                    port = %device.port,
                    vid = %device.vendor_id,
                    pid = %device.product_id,
                    "Matched serial device"
                );

                (
                    self.catalog
                        .find_boards_by_vendor_product(&device.vendor_id, &device.product_id),
                    format!("{}:{}", device.vendor_id, device.product_id),
                )
            }
            DeviceUri::Network { host, port } => {
                let device = snapshot
                    .network
                    .iter()
                    .find(|d| d.address == std::net::IpAddr::V4(*host) && d.port == *port)
                    .ok_or_else(|| ResolveError::DeviceNotFound(uri.clone()))?;

                debug!(
                    address = %device.address,
                    port = device.port,
                    name = %device.name,
                    "Matched network device"
                );

                (self.catalog.find_boards_by_name(&device.name), device.name.clone())
            }
        };

        if boards.len() > 1 {
            debug!(count = boards.len(), signature = %signature, "Multiple boards match, using the first");
        }

        boards
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::UnsupportedBoard { uri: uri.clone(), signature })
    }

    /// Resolve and pair the board with the URI's transport
    pub fn resolve_attach(&self, uri: &DeviceUri, snapshot: DeviceSnapshot) -> Result<AttachResult, ResolveError> {
        let board = self.resolve(uri, snapshot)?;
        Ok(AttachResult {
            board,
            transport: uri.transport(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{NetworkDevice, SerialDevice};
    use std::collections::HashMap;
    use std::net::{IpAddr, Ipv4Addr};

    #[derive(Default)]
    struct FakeCatalog {
        by_usb: HashMap<(String, String), Vec<BoardDefinition>>,
        by_name: HashMap<String, Vec<BoardDefinition>>,
    }

    impl BoardCatalog for FakeCatalog {
        fn find_boards_by_vendor_product(&self, vendor_id: &str, product_id: &str) -> Vec<BoardDefinition> {
            self.by_usb
                .get(&(vendor_id.to_string(), product_id.to_string()))
                .cloned()
                .unwrap_or_default()
        }

        fn find_boards_by_name(&self, name: &str) -> Vec<BoardDefinition> {
            self.by_name.get(name).cloned().unwrap_or_default()
        }
    }

    fn uno() -> BoardDefinition {
        BoardDefinition::new("Uno", "arduino:avr:uno")
    }

    fn catalog() -> FakeCatalog {
        let mut catalog = FakeCatalog::default();
        catalog.by_usb.insert(
            ("2341".to_string(), "0043".to_string()),
            vec![uno(), BoardDefinition::new("Uno Clone", "clone:avr:uno")],
        );
        catalog.by_name.insert(
            "esp8266-device".to_string(),
            vec![BoardDefinition::new("ESP8266", "esp8266:esp8266:generic")],
        );
        catalog
    }

    fn snapshot() -> DeviceSnapshot {
        DeviceSnapshot::new(
            vec![
                SerialDevice::new("/dev/ttyACM0", "2341", "0043"),
                SerialDevice::new("/dev/ttyUSB0", "1a86", "7523"),
            ],
            vec![
                NetworkDevice::new(
                    IpAddr::V4(Ipv4Addr::new(192, 168, 1, 50)),
                    8266,
                    "esp8266-device",
                    "esp8266-device._arduino._tcp.local.",
                ),
                NetworkDevice::new(
                    IpAddr::V4(Ipv4Addr::new(192, 168, 1, 51)),
                    80,
                    "mystery",
                    "mystery._arduino._tcp.local.",
                ),
            ],
        )
    }

    #[test]
    fn test_serial_resolution() {
        let catalog = catalog();
        let resolver = DeviceResolver::new(&catalog);
        let uri = DeviceUri::classify("serial:///dev/ttyACM0").unwrap();

        let board = resolver.resolve(&uri, snapshot()).unwrap();
        assert_eq!(board, uno());
    }

    #[test]
    fn test_serial_device_not_found() {
        let catalog = catalog();
        let resolver = DeviceResolver::new(&catalog);
        let uri = DeviceUri::classify("serial:///dev/ttyACM9").unwrap();

        assert_eq!(
            resolver.resolve(&uri, snapshot()),
            Err(ResolveError::DeviceNotFound(uri.clone()))
        );
    }

    #[test]
    fn test_serial_unsupported_board() {
        let catalog = catalog();
        let resolver = DeviceResolver::new(&catalog);
        let uri = DeviceUri::classify("tty:///dev/ttyUSB0").unwrap();

        let err = resolver.resolve(&uri, snapshot()).unwrap_err();
        assert!(matches!(err, ResolveError::UnsupportedBoard { ref signature, .. } if signature == "1a86:7523"));
    }

    #[test]
    fn test_first_device_wins() {
        let catalog = catalog();
        let resolver = DeviceResolver::new(&catalog);
        let uri = DeviceUri::classify("serial:///dev/ttyACM0").unwrap();
        let snapshot = DeviceSnapshot::new(
            vec![
                SerialDevice::new("/dev/ttyACM0", "1a86", "7523"),
                SerialDevice::new("/dev/ttyACM0", "2341", "0043"),
            ],
            Vec::new(),
        );

        assert!(matches!(
            resolver.resolve(&uri, snapshot),
            Err(ResolveError::UnsupportedBoard { .. })
        ));
    }

    #[test]
    fn test_network_resolution() {
        let catalog = catalog();
        let resolver = DeviceResolver::new(&catalog);
        let uri = DeviceUri::classify("tcp://192.168.1.50:8266").unwrap();

        let result = resolver.resolve_attach(&uri, snapshot()).unwrap();
        assert_eq!(result.board.fqbn, "esp8266:esp8266:generic");
        assert_eq!(result.transport, Transport::Network);
        assert_eq!(result.transport.as_str(), "network");
    }

    #[test]
    fn test_network_requires_host_and_port() {
        let catalog = catalog();
        let resolver = DeviceResolver::new(&catalog);

        let wrong_port = DeviceUri::classify("tcp://192.168.1.50:8267").unwrap();
        assert!(matches!(
            resolver.resolve(&wrong_port, snapshot()),
            Err(ResolveError::DeviceNotFound(_))
        ));

        let wrong_host = DeviceUri::classify("udp://192.168.1.49:8266").unwrap();
        assert!(matches!(
            resolver.resolve(&wrong_host, snapshot()),
            Err(ResolveError::DeviceNotFound(_))
        ));
    }

    #[test]
    fn test_network_unsupported_board() {
        let catalog = catalog();
        let resolver = DeviceResolver::new(&catalog);
        let uri = DeviceUri::classify("http://192.168.1.51:80").unwrap();

        assert!(matches!(
            resolver.resolve(&uri, snapshot()),
            Err(ResolveError::UnsupportedBoard { ref signature, .. }) if signature == "mystery"
        ));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let catalog = catalog();
        let resolver = DeviceResolver::new(&catalog);
        let uri = DeviceUri::classify("serial:///dev/ttyACM0").unwrap();

        let first = resolver.resolve_attach(&uri, snapshot()).unwrap();
        let second = resolver.resolve_attach(&uri, snapshot()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.transport, Transport::Serial);
    }
}
