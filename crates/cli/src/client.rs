// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A thin client over the daemon's Unix socket: connect, send one framed
//! request, read back the framed response.

use std::path::{Path, PathBuf};

use tokio::net::UnixStream;
use wf_protocol::{read_frame, write_frame, Request, Response};

use crate::exit_error::ExitError;

pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self { socket_path: socket_path.into() }
    }

    pub async fn send(&self, request: &Request) -> Result<Response, ExitError> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| ExitError::unreachable(&self.socket_path, &e))?;

        write_frame(&mut stream, request).await.map_err(|e| ExitError::protocol(e.to_string()))?;

        match read_frame(&mut stream).await {
            Ok(Some(response)) => Ok(response),
            Ok(None) => Err(ExitError::protocol("daemon closed the connection without a response")),
            Err(e) => Err(ExitError::protocol(e.to_string())),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

/// Maps a completed response to the command's exit outcome: `Ok` carries the
/// response through, `Err` carries the domain-level exit code (3).
pub fn require_ok(response: Response) -> Result<Response, ExitError> {
    if response.is_ok() {
        Ok(response)
    } else {
        Err(ExitError::command(response.error.unwrap_or_else(|| "command failed".to_string())))
    }
}
