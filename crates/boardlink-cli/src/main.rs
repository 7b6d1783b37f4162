//! Boardlink - Main entry point
//!
//! Attaches sketches to the boards connected over serial or the network.

mod attach;
mod config;
mod exit;
mod list;
mod timeout;

use boardlink_core::AttachError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "boardlink")]
#[command(about = "Attach sketches to connected boards")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "boardlink.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Board commands
    #[command(subcommand)]
    Board(BoardCommand),
}

#[derive(Subcommand, Debug)]
enum BoardCommand {
    /// Attaches a sketch to a board
    #[command(after_help = "Example: boardlink board attach sketchName serial:///dev/ttyACM0")]
    Attach(attach::AttachArgs),
    /// Lists the boards currently connected
    List(list::ListArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    debug!("Boardlink v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = check_arguments(&args.command) {
        eprintln!("Error: {}", e);
        return exit::exit_code(e.kind());
    }

    let config = match config::load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Cannot load configuration {}: {}", args.config.display(), e);
            return ExitCode::from(exit::CORE_CONFIG);
        }
    };

    match args.command {
        Command::Board(BoardCommand::Attach(attach_args)) => attach::run(&config, attach_args).await,
        Command::Board(BoardCommand::List(list_args)) => list::run(&config, list_args).await,
    }
}

/// Checks that do not need the configuration file
fn check_arguments(command: &Command) -> Result<(), AttachError> {
    match command {
        Command::Board(BoardCommand::Attach(args)) => attach::check_uri(&args.board_uri),
        Command::Board(BoardCommand::List(_)) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardlink_core::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_bad_uri_wins_over_broken_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("boardlink.toml");
        std::fs::write(&config_path, "[sketchbook\npath = ").unwrap();

        let args = Args::try_parse_from([
            "boardlink",
            "--config",
            config_path.to_str().unwrap(),
            "board",
            "attach",
            "blink",
            "usb://0x2341:0x0043",
        ])
        .unwrap();

        assert!(config::load_config(&args.config).is_err());
        let err = check_arguments(&args.command).unwrap_err();
        assert_eq!(exit::code_for(err.kind()), exit::BAD_CALL);
        assert_eq!(err.kind(), ErrorKind::BadCall);
    }

    #[test]
    fn test_valid_arguments_pass() {
        let args = Args::try_parse_from(["boardlink", "board", "attach", "blink", "serial:///dev/ttyACM0"]).unwrap();
        assert!(check_arguments(&args.command).is_ok());

        let args = Args::try_parse_from(["boardlink", "board", "list", "--timeout", "2s"]).unwrap();
        assert!(check_arguments(&args.command).is_ok());
    }
}
