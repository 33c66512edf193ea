// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The persistence port: the narrow set of traits the core
//! consumes. [`crate::store::WalStore`] is the one shipped implementation;
//! these traits are what callers actually depend on, so a row-oriented store
//! could satisfy them just as well.

use std::time::Duration;

use async_trait::async_trait;
use wf_core::{Container, ContainerId, ContainerLogEntry, LogLevel, PlayerId, ReleaseReason, ShipAssignment, ShipSymbol};

use crate::error::StorageError;

/// Per-call deadline, threaded through every persistence call.
#[derive(Debug, Clone, Copy)]
pub struct Ctx {
    pub deadline: Duration,
}

impl Default for Ctx {
    fn default() -> Self {
        Self { deadline: Duration::from_secs(5) }
    }
}

impl Ctx {
    pub fn with_deadline(deadline: Duration) -> Self {
        Self { deadline }
    }
}

/// What to return from [`Containers::list`].
#[derive(Debug, Clone, Copy, Default)]
pub enum ContainerFilter {
    #[default]
    All,
    Status(wf_core::Status),
    Unfinished,
    Finished,
}

#[async_trait]
pub trait Containers: Send + Sync {
    async fn add(&self, ctx: Ctx, container: &Container, command_type: &str) -> Result<(), StorageError>;
    async fn update(&self, ctx: Ctx, container: &Container) -> Result<(), StorageError>;
    async fn find(&self, ctx: Ctx, id: &ContainerId) -> Result<Option<Container>, StorageError>;
    async fn list(&self, ctx: Ctx, filter: ContainerFilter) -> Result<Vec<Container>, StorageError>;
}

#[async_trait]
pub trait ContainerLogs: Send + Sync {
    async fn log(&self, ctx: Ctx, entry: ContainerLogEntry) -> Result<ContainerLogEntry, StorageError>;

    #[allow(clippy::too_many_arguments)]
    async fn get(
        &self,
        ctx: Ctx,
        container_id: &ContainerId,
        player_id: &PlayerId,
        limit: usize,
        level_filter: Option<LogLevel>,
        since_ms: Option<u64>,
    ) -> Result<Vec<ContainerLogEntry>, StorageError>;

    #[allow(clippy::too_many_arguments)]
    async fn get_with_offset(
        &self,
        ctx: Ctx,
        container_id: &ContainerId,
        player_id: &PlayerId,
        limit: usize,
        offset: usize,
        level_filter: Option<LogLevel>,
        since_ms: Option<u64>,
    ) -> Result<Vec<ContainerLogEntry>, StorageError>;
}

#[async_trait]
pub trait ShipAssignments: Send + Sync {
    async fn insert(&self, ctx: Ctx, assignment: ShipAssignment) -> Result<(), StorageError>;
    async fn release_by_ship(
        &self,
        ctx: Ctx,
        ship: &ShipSymbol,
        reason: ReleaseReason,
        now_ms: u64,
    ) -> Result<bool, StorageError>;
    async fn release_by_container(
        &self,
        ctx: Ctx,
        container_id: &ContainerId,
        reason: ReleaseReason,
        now_ms: u64,
    ) -> Result<usize, StorageError>;
    async fn find_by_ship(&self, ctx: Ctx, ship: &ShipSymbol) -> Result<Option<ShipAssignment>, StorageError>;
    async fn release_all_active(&self, ctx: Ctx, reason: ReleaseReason, now_ms: u64) -> Result<usize, StorageError>;
    async fn list_active(&self, ctx: Ctx) -> Result<Vec<ShipAssignment>, StorageError>;
}
