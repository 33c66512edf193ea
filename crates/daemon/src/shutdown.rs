// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The graceful shutdown protocol: stop accepting connections, ask every
//! running container to stop, wait out the deadline, force whatever is left,
//! sweep any remaining leases, then tear down the socket.

use std::path::Path;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use wf_core::{Clock, ReleaseReason, Status};
use wf_engine::{AssignmentManager, Registry};

pub async fn graceful_shutdown<C: Clock + 'static>(
    accept_shutdown: &CancellationToken,
    second_signal: &CancellationToken,
    registry: &Registry<C>,
    assignments: &AssignmentManager,
    shutdown_timeout: Duration,
    socket_path: &Path,
    now_ms: u64,
) {
    // Step 1: stop accepting new connections.
    accept_shutdown.cancel();

    // Step 2: ask every Running container to stop.
    for container in registry.list() {
        if container.status() == Status::Running {
            let _ = registry.stop(&container.id);
        }
    }

    // Step 3: wait for clean shutdown, up to the deadline (or a second signal).
    let stragglers = registry.wait_for_all_or(shutdown_timeout, second_signal).await;

    // Step 4: anything still alive is forced to Stopped.
    for container_id in &stragglers {
        warn!(container_id = %container_id, "forcing container to Stopped at shutdown deadline");
        let _ = registry.force_mark_stopped(container_id, ReleaseReason::DaemonShutdown).await;
    }

    // Step 5: sweep any remaining active leases regardless of container state.
    let _ = assignments.release_all(ReleaseReason::DaemonShutdown, now_ms).await;

    // Step 6: close the listener and remove the socket file.
    let _ = std::fs::remove_file(socket_path);
}
