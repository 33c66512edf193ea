// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::wal::WalError;

/// Errors surfaced by the persistence port, split into `Transient` / `Fatal`.
/// Callers decide whether a given variant is retryable; the port itself does
/// not retry.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("persistence call exceeded its {0:?} deadline")]
    DeadlineExceeded(std::time::Duration),
    #[error("write-ahead log error: {0}")]
    Wal(#[from] WalError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] crate::snapshot::SnapshotError),
}
