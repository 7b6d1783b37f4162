//! mDNS observer for network boards
//!
//! Boards announce themselves as `_arduino._tcp` services. The board name
//! comes from the `board` TXT property when present, otherwise from the
//! instance label of the service name.

use boardlink_core::NetworkDevice;
use mdns_sd::{Receiver, ServiceDaemon, ServiceEvent, ServiceInfo};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

use crate::table::DeviceTable;

/// Default service types browsed for network boards
pub const ARDUINO_SERVICE: &str = "_arduino._tcp.local.";

/// TXT property carrying the board identifier
const BOARD_PROPERTY: &str = "board";

/// How often a receiver wakes up to check for shutdown
const RECV_POLL: Duration = Duration::from_millis(250);

/// Start browsing `services`, spawning one receiver per service type
///
/// Returns the daemon so the caller can shut it down, or `None` when mDNS
/// is unavailable on this host.
pub fn start(
    services: &[String],
    table: Arc<RwLock<DeviceTable>>,
    shutdown: watch::Receiver<bool>,
    tasks: &mut JoinSet<()>,
) -> Option<ServiceDaemon> {
    let daemon = match ServiceDaemon::new() {
        Ok(d) => d,
        Err(e) => {
            warn!(error = %e, "Cannot start mDNS daemon, network boards will not be discovered");
            return None;
        }
    };

    for service in services {
        match daemon.browse(service) {
            Ok(receiver) => {
                debug!(service = %service, "mDNS browse started");
                let table = table.clone();
                let shutdown = shutdown.clone();
                let service = service.clone();
                tasks.spawn_blocking(move || observe(&service, receiver, &table, shutdown));
            }
            Err(e) => warn!(service = %service, error = %e, "Cannot browse mDNS service"),
        }
    }

    Some(daemon)
}

/// Stop the daemon and its browsers
pub fn stop(daemon: ServiceDaemon) {
    if let Err(e) = daemon.shutdown() {
        debug!(error = %e, "mDNS daemon shutdown failed");
    }
}

fn observe(service: &str, receiver: Receiver<ServiceEvent>, table: &RwLock<DeviceTable>, shutdown: watch::Receiver<bool>) {
    let mut events = 0u32;

    while !*shutdown.borrow() {
        match receiver.recv_timeout(RECV_POLL) {
            Ok(ServiceEvent::ServiceResolved(info)) => {
                events += 1;
                let devices = devices_from_info(&info);
                table.blocking_write().upsert_service(info.get_fullname(), devices);
            }
            Ok(ServiceEvent::ServiceRemoved(_, fullname)) => {
                events += 1;
                table.blocking_write().remove_service(&fullname);
            }
            Ok(_) => {}
            Err(_) if receiver.is_disconnected() => break,
            Err(_) => {}
        }
    }

    trace!(service = %service, events, "mDNS observer stopped");
}

/// One device per advertised address
pub fn devices_from_info(info: &ServiceInfo) -> Vec<NetworkDevice> {
    let fullname = info.get_fullname();
    let name = board_name(fullname, info.get_property_val_str(BOARD_PROPERTY));

    info.get_addresses()
        .iter()
        .map(|addr| NetworkDevice::new(*addr, info.get_port(), name.clone(), fullname))
        .collect()
}

fn board_name(fullname: &str, board: Option<&str>) -> String {
    match board {
        Some(board) if !board.is_empty() => board.to_string(),
        _ => fullname.split('.').next().unwrap_or(fullname).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_board_name_prefers_txt_property() {
        assert_eq!(board_name("living-room._arduino._tcp.local.", Some("yun")), "yun");
        assert_eq!(board_name("esp8266-device._arduino._tcp.local.", None), "esp8266-device");
        assert_eq!(board_name("esp8266-device._arduino._tcp.local.", Some("")), "esp8266-device");
    }

    #[test]
    fn test_devices_from_info() {
        let mut properties = HashMap::new();
        properties.insert("board".to_string(), "esp8266-device".to_string());
        let info = ServiceInfo::new(
            ARDUINO_SERVICE,
            "workshop",
            "workshop.local.",
            "192.168.1.50",
            8266,
            properties,
        )
        .unwrap();

        let devices = devices_from_info(&info);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].address, IpAddr::V4(Ipv4Addr::new(192, 168, 1, 50)));
        assert_eq!(devices[0].port, 8266);
        assert_eq!(devices[0].name, "esp8266-device");
        assert_eq!(devices[0].service, "workshop._arduino._tcp.local.");
    }
}
