// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The seam between the container registry/runner (which owns lifecycle
//! transitions) and the actual game-facing work a container performs. The
//! runner spawns one task per container and drives it through
//! [`CommandBody::run`]; the body reports back through [`BodyContext`]
//! instead of touching the container's lifecycle directly.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use wf_core::{ContainerId, LogLevel, Metadata, PlayerId, ShipSymbol};

use crate::game::FleetError;
use crate::ship_port::RecoveryError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BodyError {
    #[error(transparent)]
    Fleet(#[from] FleetError),
    #[error("stopped: {0}")]
    Cancelled(String),
    #[error("iteration budget exhausted")]
    IterationLimitReached,
}

impl From<RecoveryError> for BodyError {
    fn from(e: RecoveryError) -> Self {
        BodyError::Fleet(FleetError::Upstream(e.to_string()))
    }
}

/// Callbacks a body uses to report progress without reaching into the
/// container's own lifecycle state. `report_iteration` returns `false` once
/// the runner's iteration budget is exhausted — the body must stop looping
/// when it does, it does not raise an error of its own.
#[derive(Clone)]
pub struct BodyContext {
    pub container_id: ContainerId,
    pub player_id: PlayerId,
    pub ship_symbols: Vec<ShipSymbol>,
    pub metadata: Metadata,
    cancel: CancellationToken,
    report_iteration: Arc<dyn Fn() -> bool + Send + Sync>,
    log: Arc<dyn Fn(LogLevel, String) + Send + Sync>,
}

impl BodyContext {
    pub fn new(
        container_id: ContainerId,
        player_id: PlayerId,
        ship_symbols: Vec<ShipSymbol>,
        metadata: Metadata,
        cancel: CancellationToken,
        report_iteration: Arc<dyn Fn() -> bool + Send + Sync>,
        log: Arc<dyn Fn(LogLevel, String) + Send + Sync>,
    ) -> Self {
        Self { container_id, player_id, ship_symbols, metadata, cancel, report_iteration, log }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Marks one loop pass complete. Returns `false` when the body must stop
    /// (cancellation requested, or the iteration budget is spent).
    pub fn tick(&self) -> bool {
        if self.is_cancelled() {
            return false;
        }
        (self.report_iteration)()
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        (self.log)(level, message.into());
    }

    pub fn primary_ship(&self) -> Option<&ShipSymbol> {
        self.ship_symbols.first()
    }
}

/// One unit of game-facing work. Implementations loop internally, calling
/// [`BodyContext::tick`] each pass and stopping as soon as it returns `false`.
#[async_trait]
pub trait CommandBody: Send + Sync {
    async fn run(&self, cx: &BodyContext) -> Result<(), BodyError>;
}
