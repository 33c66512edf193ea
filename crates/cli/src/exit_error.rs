// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination.

use std::fmt;

/// Protocol-level framing or connection failure.
pub const EXIT_PROTOCOL_ERROR: i32 = 1;
/// The daemon's socket could not be reached at all.
pub const EXIT_SERVER_UNREACHABLE: i32 = 2;
/// The daemon accepted the request but reported a domain-level failure.
pub const EXIT_COMMAND_ERROR: i32 = 3;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn unreachable(socket_path: &std::path::Path, source: &std::io::Error) -> Self {
        Self::new(
            EXIT_SERVER_UNREACHABLE,
            format!("could not reach wayfarerd at {}: {source}", socket_path.display()),
        )
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(EXIT_PROTOCOL_ERROR, message)
    }

    pub fn command(message: impl Into<String>) -> Self {
        Self::new(EXIT_COMMAND_ERROR, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
