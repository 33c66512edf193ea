// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The container log sink. Wraps [`wf_storage::ContainerLogs`] with a
//! per-(container, level) dedup window — identical consecutive messages at
//! the same level within the window are dropped rather than persisted, so a
//! body stuck re-emitting the same warning doesn't flood the log. A
//! different level for the same container is tracked independently, so an
//! interleaved `Warning` entry never displaces the cached `Info` entry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use wf_core::{ContainerId, ContainerLogEntry, LogLevel, PlayerId};
use wf_storage::{ContainerLogs, Ctx};

/// Default dedup window, overridden by `WAYFARERD_LOG_DEDUP_MS` in practice.
pub const DEFAULT_DEDUP_WINDOW_MS: u64 = 5_000;

pub struct LogSink {
    store: Arc<dyn ContainerLogs>,
    dedup_window_ms: u64,
    last_logged: Mutex<HashMap<(ContainerId, LogLevel), ContainerLogEntry>>,
}

impl LogSink {
    pub fn new(store: Arc<dyn ContainerLogs>, dedup_window_ms: u64) -> Self {
        Self { store, dedup_window_ms, last_logged: Mutex::new(HashMap::new()) }
    }

    /// Persists `entry` unless it repeats the container's immediately
    /// preceding entry within the dedup window, in which case it is dropped
    /// and `Ok(None)` is returned.
    pub async fn log(
        &self,
        container_id: ContainerId,
        player_id: PlayerId,
        timestamp_ms: u64,
        level: LogLevel,
        message: impl Into<String>,
    ) -> Result<Option<ContainerLogEntry>, wf_storage::StorageError> {
        let entry = ContainerLogEntry::new(container_id, player_id, timestamp_ms, level, message);
        let cache_key = (container_id, level);

        {
            let cache = self.last_logged.lock();
            if let Some(prev) = cache.get(&cache_key) {
                if prev.same_dedup_key(&entry)
                    && timestamp_ms.saturating_sub(prev.timestamp_ms) < self.dedup_window_ms
                {
                    return Ok(None);
                }
            }
        }

        let persisted = self.store.log(Ctx::default(), entry).await?;
        self.last_logged.lock().insert(cache_key, persisted.clone());
        Ok(Some(persisted))
    }

    pub async fn get(
        &self,
        container_id: &ContainerId,
        player_id: &PlayerId,
        limit: usize,
        level_filter: Option<LogLevel>,
        since_ms: Option<u64>,
    ) -> Result<Vec<ContainerLogEntry>, wf_storage::StorageError> {
        self.store
            .get(Ctx::default(), container_id, player_id, limit, level_filter, since_ms)
            .await
    }

    pub async fn get_with_offset(
        &self,
        container_id: &ContainerId,
        player_id: &PlayerId,
        limit: usize,
        offset: usize,
        level_filter: Option<LogLevel>,
        since_ms: Option<u64>,
    ) -> Result<Vec<ContainerLogEntry>, wf_storage::StorageError> {
        self.store
            .get_with_offset(Ctx::default(), container_id, player_id, limit, offset, level_filter, since_ms)
            .await
    }
}

#[cfg(test)]
#[path = "log_sink_tests.rs"]
mod tests;
