// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wayfarer status`: a HealthCheck round trip, printed as JSON.

use wf_protocol::Request;

use crate::client::{require_ok, DaemonClient};
use crate::exit_error::ExitError;

pub async fn run(client: &DaemonClient) -> Result<(), ExitError> {
    let response = require_ok(client.send(&Request::HealthCheck).await?)?;
    println!(
        "{}",
        serde_json::json!({
            "version": response.version,
            "active_containers": response.active_containers,
        })
    );
    Ok(())
}
