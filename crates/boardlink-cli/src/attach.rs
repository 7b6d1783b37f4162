//! `board attach` command

use boardlink_core::{attach, AttachError, AttachRequest, AttachResult, CatalogIndex, DeviceUri, Sketchbook};
use boardlink_discovery::DiscoveryMonitor;
use std::process::ExitCode;
use tracing::debug;

use crate::config::Config;
use crate::exit;
use crate::timeout::parse_timeout_or_default;

/// Arguments of `board attach`
#[derive(clap::Args, Debug)]
pub struct AttachArgs {
    /// Name of the sketch in the sketchbook
    pub sketch_name: String,

    /// Board URI, e.g. serial:///dev/ttyACM0 or tcp://192.168.1.50:8266
    pub board_uri: String,

    /// CPU flavour, required for some boards (e.g. Arduino Nano)
    #[arg(long, default_value = "default")]
    pub flavour: String,

    /// How long to search for connected devices (e.g. 10s)
    #[arg(long)]
    pub timeout: Option<String>,
}

pub async fn run(config: &Config, args: AttachArgs) -> ExitCode {
    let timeout = args.timeout.as_deref().unwrap_or(&config.discovery.timeout);
    let request = AttachRequest {
        sketch: args.sketch_name,
        board_uri: args.board_uri,
        flavour: args.flavour,
        timeout: parse_timeout_or_default(timeout),
    };

    match execute(config, &request).await {
        Ok(result) => {
            println!("SUPPORTED BOARD FOUND:");
            println!("{}", result.board.name);
            println!("BOARD ATTACHED.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit::exit_code(e.kind())
        }
    }
}

/// Reject a malformed board URI before the environment is touched
pub fn check_uri(raw: &str) -> Result<(), AttachError> {
    DeviceUri::classify(raw)?;
    Ok(())
}

async fn execute(config: &Config, request: &AttachRequest) -> Result<AttachResult, AttachError> {
    check_uri(&request.board_uri)?;

    let sketchbook = Sketchbook::open(&config.sketchbook.path)
        .map_err(|e| AttachError::Configuration(format!("Cannot find sketchbook: {}", e)))?;

    let catalog = CatalogIndex::from_file(&config.catalog.path).map_err(|e| {
        AttachError::Configuration(format!(
            "Cannot parse board index {}: {}",
            config.catalog.path.display(),
            e
        ))
    })?;
    debug!(boards = catalog.boards().len(), "Board index loaded");

    let monitor = DiscoveryMonitor::new(config.to_monitor_config());
    attach(request, &monitor, &catalog, &sketchbook).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardlink_core::ErrorKind;
    use std::time::Duration;
    use tempfile::TempDir;

    fn request(uri: &str) -> AttachRequest {
        let mut request = AttachRequest::new("blink", uri);
        request.timeout = Duration::ZERO;
        request
    }

    #[tokio::test]
    async fn test_bad_uri_is_a_bad_call() {
        let config = Config::default();
        let err = execute(&config, &request("usb://nope")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadCall);
    }

    #[tokio::test]
    async fn test_missing_sketchbook_is_a_configuration_error() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.sketchbook.path = dir.path().join("missing");

        let err = execute(&config, &request("serial:///dev/ttyACM0")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_missing_board_index_is_a_configuration_error() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.sketchbook.path = dir.path().to_path_buf();
        config.catalog.path = dir.path().join("boards.toml");

        let err = execute(&config, &request("serial:///dev/ttyACM0")).await.unwrap_err();
        assert!(matches!(err, AttachError::Configuration(_)));
        assert_eq!(exit::code_for(err.kind()), exit::CORE_CONFIG);
    }
}
