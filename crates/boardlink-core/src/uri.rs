//! Board URI classification
//!
//! A board URI names the transport a board is reachable on:
//! - `serial://<path>` or `tty://<path>` for serial ports
//! - `http://`, `https://`, `tcp://` or `udp://` followed by an IPv4
//!   `host:port` for network boards

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;
use url::Url;

static SERIAL_URI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(serial|tty)://.+").expect("valid serial URI pattern"));

static NETWORK_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?|tcp|udp)://(?P<host>[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}):(?P<port>[0-9]{1,5})/?$")
        .expect("valid network URI pattern")
});

/// Schemes listed in error messages
pub const ACCEPTED_SCHEMES: &str = "serial://, tty://, http://, https://, tcp://, udp://";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UriError {
    #[error("Invalid device port type `{0}`. Accepted types are: {ACCEPTED_SCHEMES}")]
    InvalidFormat(String),
}

/// Connection class of a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Serial,
    Network,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Serial => "serial",
            Transport::Network => "network",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified board URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceUri {
    Serial { path: String },
    Network { host: Ipv4Addr, port: u16 },
}

impl DeviceUri {
    /// Classify a raw board URI into its transport
    pub fn classify(raw: &str) -> Result<Self, UriError> {
        let invalid = || UriError::InvalidFormat(raw.to_string());

        if SERIAL_URI.is_match(raw) {
            let url = Url::parse(raw).map_err(|_| invalid())?;
            // `serial:///dev/ttyACM0` carries the location in the path,
            // `serial://COM3` carries it in the host.
            let location = format!("{}{}", url.host_str().unwrap_or_default(), url.path());
            let path = urlencoding::decode(&location).map_err(|_| invalid())?.into_owned();
            if path.is_empty() {
                return Err(invalid());
            }
            Ok(DeviceUri::Serial { path })
        } else if let Some(caps) = NETWORK_URI.captures(raw) {
            // Octets are read as written; zero-padded octets are rejected
            // for every scheme.
            let host = caps["host"].parse::<Ipv4Addr>().map_err(|_| invalid())?;
            let port = caps["port"].parse::<u16>().map_err(|_| invalid())?;
            Ok(DeviceUri::Network { host, port })
        } else {
            Err(invalid())
        }
    }

    pub fn transport(&self) -> Transport {
        match self {
            DeviceUri::Serial { .. } => Transport::Serial,
            DeviceUri::Network { .. } => Transport::Network,
        }
    }
}

impl FromStr for DeviceUri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::classify(s)
    }
}

impl fmt::Display for DeviceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceUri::Serial { path } => f.write_str(path),
            DeviceUri::Network { host, port } => write!(f, "{}:{}", host, port),
        }
    }
}
