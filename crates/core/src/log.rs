// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container log entries: append-only, per-(container, level) deduplicated.

use crate::ids::{ContainerId, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

crate::simple_display! {
    LogLevel {
        Debug => "debug",
        Info => "info",
        Warning => "warning",
        Error => "error",
        Critical => "critical",
    }
}

/// One container log entry. `id` is assigned by the persistence port on
/// insert (autoincrement); `0` means not yet persisted.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContainerLogEntry {
    pub id: u64,
    pub container_id: ContainerId,
    pub player_id: PlayerId,
    pub timestamp_ms: u64,
    pub level: LogLevel,
    pub message: String,
}

impl ContainerLogEntry {
    pub fn new(
        container_id: ContainerId,
        player_id: PlayerId,
        timestamp_ms: u64,
        level: LogLevel,
        message: impl Into<String>,
    ) -> Self {
        Self { id: 0, container_id, player_id, timestamp_ms, level, message: message.into() }
    }

    /// Whether `self` and `other` share the same (container, level, message)
    /// triple the dedup window keys on. Byte-exact match; never strips or
    /// normalizes substrings within `message`.
    pub fn same_dedup_key(&self, other: &ContainerLogEntry) -> bool {
        self.container_id == other.container_id
            && self.level == other.level
            && self.message == other.message
    }
}
