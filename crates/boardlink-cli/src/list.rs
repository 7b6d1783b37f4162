//! `board list` command

use boardlink_core::{BoardCatalog, CatalogIndex, DeviceScanner, DeviceSnapshot};
use boardlink_discovery::DiscoveryMonitor;
use std::process::ExitCode;

use crate::config::Config;
use crate::exit;
use crate::timeout::parse_timeout_or_default;

/// Arguments of `board list`
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// How long to search for connected devices (e.g. 10s)
    #[arg(long)]
    pub timeout: Option<String>,
}

pub async fn run(config: &Config, args: ListArgs) -> ExitCode {
    let catalog = match CatalogIndex::from_file(&config.catalog.path) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error: Cannot parse board index {}: {}", config.catalog.path.display(), e);
            return ExitCode::from(exit::CORE_CONFIG);
        }
    };

    let timeout = parse_timeout_or_default(args.timeout.as_deref().unwrap_or(&config.discovery.timeout));
    let monitor = DiscoveryMonitor::new(config.to_monitor_config());
    let snapshot = monitor.scan(timeout).await;

    let lines = render(&snapshot, &catalog);
    if lines.is_empty() {
        println!("No devices found.");
    }
    for line in lines {
        println!("{}", line);
    }
    ExitCode::SUCCESS
}

/// One line per device: URI, signature, first matching board
fn render<C: BoardCatalog>(snapshot: &DeviceSnapshot, catalog: &C) -> Vec<String> {
    let describe = |boards: Vec<boardlink_core::BoardDefinition>| {
        boards
            .into_iter()
            .next()
            .map(|b| format!("{} ({})", b.name, b.fqbn))
            .unwrap_or_else(|| "unknown".to_string())
    };

    let serial = snapshot.serial.iter().map(|d| {
        let board = describe(catalog.find_boards_by_vendor_product(&d.vendor_id, &d.product_id));
        if d.is_usb() {
            format!("serial://{}\t{}:{}\t{}", d.port, d.vendor_id, d.product_id, board)
        } else {
            format!("serial://{}\t-\t{}", d.port, board)
        }
    });

    let network = snapshot.network.iter().map(|d| {
        let board = describe(catalog.find_boards_by_name(&d.name));
        format!("tcp://{}:{}\t{}\t{}", d.address, d.port, d.name, board)
    });

    serial.chain(network).collect()
}
