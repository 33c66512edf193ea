// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wayfarer start` / `wayfarer stop`. `start` is a process-level operation
//! (spawn the daemon binary, poll until it's healthy); `stop` is dispatched
//! to the daemon over its command socket like any other RPC, since the
//! daemon's own `Shutdown` handler triggers the real graceful-shutdown
//! sequence.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use crate::client::{require_ok, DaemonClient};
use crate::exit_error::ExitError;
use wf_protocol::Request;

pub async fn start(foreground: bool, state_dir: &Path, socket_path: &Path) -> Result<(), ExitError> {
    if !foreground {
        let client = DaemonClient::new(socket_path);
        if client.send(&Request::HealthCheck).await.is_ok() {
            println!("daemon already running");
            return Ok(());
        }
    }

    let binary = find_wayfarerd_binary()?;
    let mut command = std::process::Command::new(&binary);
    command.env("WAYFARERD_STATE_DIR", state_dir);

    if foreground {
        let status = command
            .status()
            .map_err(|e| ExitError::protocol(format!("failed to launch {}: {e}", binary.display())))?;
        if !status.success() {
            return Err(ExitError::command(format!("wayfarerd exited with {status}")));
        }
        return Ok(());
    }

    let mut child = command
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ExitError::protocol(format!("failed to launch {}: {e}", binary.display())))?;

    let client = DaemonClient::new(socket_path);
    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    loop {
        if client.send(&Request::HealthCheck).await.is_ok() {
            println!("daemon started");
            return Ok(());
        }
        if std::time::Instant::now() >= deadline {
            let _ = child.kill();
            return Err(ExitError::protocol("daemon did not become healthy within 10s of starting"));
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

pub async fn stop(socket_path: &Path) -> Result<(), ExitError> {
    let client = DaemonClient::new(socket_path);
    require_ok(client.send(&Request::Shutdown).await?)?;
    println!("shutdown requested");
    Ok(())
}

fn find_wayfarerd_binary() -> Result<std::path::PathBuf, ExitError> {
    let exe = std::env::current_exe()
        .map_err(|e| ExitError::protocol(format!("could not resolve current executable: {e}")))?;
    let candidate = exe.with_file_name("wayfarerd");
    if candidate.exists() {
        return Ok(candidate);
    }
    Ok(std::path::PathBuf::from("wayfarerd"))
}
