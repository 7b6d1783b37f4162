//! Scan timeout parsing
//!
//! Timeouts use Go-style duration strings: a sequence of decimal numbers
//! with a unit suffix, e.g. "5s", "1m30s", "1.5s", "500ms". A leading
//! sign is accepted; negative durations wait for nothing.

use boardlink_core::DEFAULT_SCAN_TIMEOUT;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

static COMPONENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+(?:\.[0-9]*)?|\.[0-9]+)(ns|us|µs|ms|s|m|h)").expect("valid duration pattern")
});

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimeoutError {
    #[error("empty duration")]
    Empty,
    #[error("invalid duration `{0}`")]
    Invalid(String),
}

/// Parse a Go-style duration string
pub fn parse_duration(raw: &str) -> Result<Duration, TimeoutError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TimeoutError::Empty);
    }
    let invalid = || TimeoutError::Invalid(raw.to_string());
    let (negative, mut rest) = match raw.as_bytes()[0] {
        b'-' => (true, &raw[1..]),
        b'+' => (false, &raw[1..]),
        _ => (false, raw),
    };
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut nanos = 0f64;

    while !rest.is_empty() {
        let caps = COMPONENT.captures(rest).ok_or_else(invalid)?;
        let value: f64 = caps[1].parse().map_err(|_| invalid())?;
        let unit = match &caps[2] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return Err(invalid()),
        };
        nanos += value * unit;
        rest = &rest[caps[0].len()..];
    }

    if !nanos.is_finite() || nanos > u64::MAX as f64 {
        return Err(invalid());
    }
    if negative {
        return Ok(Duration::ZERO);
    }
    Ok(Duration::from_nanos(nanos.round() as u64))
}

/// Parse a timeout flag, falling back to the default scan window
pub fn parse_timeout_or_default(raw: &str) -> Duration {
    match parse_duration(raw) {
        Ok(duration) => duration,
        Err(e) => {
            warn!(
                error = %e,
                "Invalid interval `{}` provided, using default ({}s)",
                raw,
                DEFAULT_SCAN_TIMEOUT.as_secs()
            );
            DEFAULT_SCAN_TIMEOUT
        }
    }
}
