// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process lifecycle — state directory setup, the PID-file lock that
//! refuses a second instance, and startup reconciliation of whatever the WAL
//! and snapshot say survived a crash.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;
use tracing::{info, warn};

use wf_core::{LogLevel, ReleaseReason, Status};
use wf_engine::{AssignmentManager, LogSink};
use wf_storage::{ContainerFilter, Containers, Ctx};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("another wayfarerd instance is already running (pid file locked at {0})")]
    AlreadyRunning(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Holds the exclusive lock on the PID file for the process's lifetime.
/// Dropping it (or exiting) releases the lock.
pub struct PidLock {
    file: File,
    path: PathBuf,
}

impl PidLock {
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self, ProcessError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).write(true).truncate(false).open(&path)?;
        file.try_lock_exclusive().map_err(|_| ProcessError::AlreadyRunning(path.clone()))?;
        let mut file = file;
        file.set_len(0)?;
        write!(file, "{}", std::process::id())?;
        file.flush()?;
        Ok(Self { file, path })
    }
}

impl Drop for PidLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

pub fn ensure_state_dir(path: impl AsRef<Path>) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}

/// Marks every container the WAL/snapshot left in `Running` or `Stopping` as
/// `Failed` (the process that owned them is gone) and releases their leases
/// as `orphaned`. Run once, right after the store is opened and before the
/// health monitor or command server start.
pub async fn reconcile_after_restart(
    containers: &(impl Containers + ?Sized),
    assignments: &AssignmentManager,
    logs: &LogSink,
    now_ms: u64,
) -> Result<usize, wf_storage::StorageError> {
    let unfinished = containers.list(Ctx::default(), ContainerFilter::Unfinished).await?;
    let mut reconciled = 0;
    for mut container in unfinished {
        if matches!(container.status(), Status::Running | Status::Stopping) {
            let _ = container.fail("daemon restarted while this container was in flight", now_ms);
            containers.update(Ctx::default(), &container).await?;
            let _ = assignments.release_by_container(&container.id, ReleaseReason::Orphaned, now_ms).await;
            let _ = logs
                .log(
                    container.id,
                    container.player_id.clone(),
                    now_ms,
                    LogLevel::Warning,
                    "container marked failed: daemon restarted while it was in flight",
                )
                .await;
            reconciled += 1;
            info!(container_id = %container.id, "reconciled crashed container to Failed");
        }
    }
    if reconciled > 0 {
        warn!(count = reconciled, "reconciled containers left running by a previous daemon instance");
    } else {
        info!("no crashed containers found during startup reconciliation");
    }
    Ok(reconciled)
}
