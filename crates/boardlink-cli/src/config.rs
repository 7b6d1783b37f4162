//! Configuration loading

use anyhow::Result;
use boardlink_discovery::MonitorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sketchbook: SketchbookConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SketchbookConfig {
    /// Folder holding the sketches
    #[serde(default = "default_sketchbook_path")]
    pub path: PathBuf,
}

impl Default for SketchbookConfig {
    fn default() -> Self {
        Self {
            path: default_sketchbook_path(),
        }
    }
}

fn default_sketchbook_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("Arduino"))
        .unwrap_or_else(|| PathBuf::from("./Arduino"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to the board index file
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("./boards.toml")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Scan window used when `--timeout` is not given
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Serial port polling interval in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// mDNS service types browsed for network boards
    #[serde(default = "default_mdns_services")]
    pub mdns_services: Vec<String>,
    /// Watch serial ports
    #[serde(default = "default_true")]
    pub use_serial: bool,
    /// Browse mDNS
    #[serde(default = "default_true")]
    pub use_mdns: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            poll_interval_ms: default_poll_interval(),
            mdns_services: default_mdns_services(),
            use_serial: true,
            use_mdns: true,
        }
    }
}

fn default_timeout() -> String {
    "5s".to_string()
}

fn default_poll_interval() -> u64 {
    MonitorConfig::default().poll_interval_ms
}

fn default_mdns_services() -> Vec<String> {
    MonitorConfig::default().mdns_services
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Convert to MonitorConfig
    pub fn to_monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            poll_interval_ms: self.discovery.poll_interval_ms,
            mdns_services: self.discovery.mdns_services.clone(),
            use_serial: self.discovery.use_serial,
            use_mdns: self.discovery.use_mdns,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("boardlink.toml")).unwrap();
        assert_eq!(config.discovery.timeout, "5s");
        assert_eq!(config.catalog.path, PathBuf::from("./boards.toml"));
        assert!(config.sketchbook.path.ends_with("Arduino"));
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("boardlink.toml");
        std::fs::write(
            &path,
            r#"
[sketchbook]
path = "/srv/sketches"

[discovery]
timeout = "10s"
use_mdns = false
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.sketchbook.path, PathBuf::from("/srv/sketches"));
        assert_eq!(config.discovery.timeout, "10s");

        let monitor = config.to_monitor_config();
        assert!(!monitor.use_mdns);
        assert!(monitor.use_serial);
        assert_eq!(monitor.poll_interval_ms, 1000);
        assert_eq!(monitor.mdns_services, vec!["_arduino._tcp.local.".to_string()]);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("boardlink.toml");
        std::fs::write(&path, "[discovery\ntimeout = 5").unwrap();
        assert!(load_config(&path).is_err());
    }
}
