//! Process exit statuses

use boardlink_core::ErrorKind;
use std::process::ExitCode;

/// Malformed arguments, e.g. an unrecognized board URI
pub const BAD_CALL: u8 = 2;
/// Sketch or board not found, or the binding could not be saved
pub const GENERIC: u8 = 3;
/// Sketchbook, board index or configuration file unavailable
pub const CORE_CONFIG: u8 = 5;

pub fn code_for(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::BadCall => BAD_CALL,
        ErrorKind::Generic => GENERIC,
        ErrorKind::Configuration => CORE_CONFIG,
    }
}

pub fn exit_code(kind: ErrorKind) -> ExitCode {
    ExitCode::from(code_for(kind))
}
