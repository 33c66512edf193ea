// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container: one isolated, asynchronously executing unit of background work.

use thiserror::Error;

use crate::ids::{ContainerId, PlayerId};
use crate::lifecycle::{Lifecycle, LifecycleError, Status};
use crate::metadata::Metadata;

/// The kind of work a container performs. New command types are added here as
/// the daemon grows new business verbs; the set is closed per build, not
/// user-extensible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    Navigate,
    Scout,
    Mine,
    Trade,
    Refuel,
    Deliver,
    NegotiateContract,
    AcceptContract,
    FulfillContract,
    ArbitrageCoordinator,
}

crate::simple_display! {
    ContainerKind {
        Navigate => "navigate",
        Scout => "scout",
        Mine => "mine",
        Trade => "trade",
        Refuel => "refuel",
        Deliver => "deliver",
        NegotiateContract => "negotiate_contract",
        AcceptContract => "accept_contract",
        FulfillContract => "fulfill_contract",
        ArbitrageCoordinator => "arbitrage_coordinator",
    }
}

/// The iteration ceiling for a container's run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxIterations {
    Finite(u64),
    Infinite,
}

impl MaxIterations {
    pub fn is_infinite(self) -> bool {
        matches!(self, MaxIterations::Infinite)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContainerError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("increment_iteration is only legal while Running, container is {status}")]
    NotRunning { status: Status },

    #[error("current_iteration {current} already at max_iterations {max}")]
    IterationLimitExceeded { current: u64, max: u64 },

    #[error("restart budget exhausted: restart_count {restart_count} >= max_restarts {max_restarts}")]
    RestartBudgetExhausted { restart_count: u32, max_restarts: u32 },
}

/// One container: identity, metadata, iteration counter, restart budget, and
/// an embedded [`Lifecycle`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Container {
    pub id: ContainerId,
    pub kind: ContainerKind,
    pub player_id: PlayerId,
    pub metadata: Metadata,
    pub max_iterations: MaxIterations,
    pub current_iteration: u64,
    pub restart_count: u32,
    pub max_restarts: u32,
    lifecycle: Lifecycle,
}

impl Container {
    pub fn new(
        kind: ContainerKind,
        player_id: PlayerId,
        metadata: Metadata,
        max_iterations: MaxIterations,
        max_restarts: u32,
        now_ms: u64,
    ) -> Self {
        Self {
            id: ContainerId::new(),
            kind,
            player_id,
            metadata,
            max_iterations,
            current_iteration: 0,
            restart_count: 0,
            max_restarts,
            lifecycle: Lifecycle::new(now_ms),
        }
    }

    pub fn status(&self) -> Status {
        self.lifecycle.status()
    }

    pub fn created_at_ms(&self) -> u64 {
        self.lifecycle.created_at_ms()
    }

    pub fn updated_at_ms(&self) -> u64 {
        self.lifecycle.updated_at_ms()
    }

    pub fn started_at_ms(&self) -> Option<u64> {
        self.lifecycle.started_at_ms()
    }

    pub fn stopped_at_ms(&self) -> Option<u64> {
        self.lifecycle.stopped_at_ms()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.lifecycle.last_error()
    }

    pub fn is_finished(&self) -> bool {
        self.lifecycle.is_finished()
    }

    pub fn runtime_duration_ms(&self, now_ms: u64) -> u64 {
        self.lifecycle.runtime_duration_ms(now_ms)
    }

    /// `Running ∧ (max=infinite ∨ current<max)`.
    pub fn should_continue(&self) -> bool {
        self.status() == Status::Running
            && match self.max_iterations {
                MaxIterations::Infinite => true,
                MaxIterations::Finite(max) => self.current_iteration < max,
            }
    }

    /// `is_finished ∧ restart_count<max_restarts`.
    pub fn can_restart(&self) -> bool {
        self.is_finished() && self.restart_count < self.max_restarts
    }

    pub fn start(&mut self, now_ms: u64) -> Result<(), ContainerError> {
        self.lifecycle.start(now_ms)?;
        Ok(())
    }

    pub fn complete(&mut self, now_ms: u64) -> Result<(), ContainerError> {
        self.lifecycle.complete(now_ms)?;
        Ok(())
    }

    pub fn fail(&mut self, err: impl Into<String>, now_ms: u64) -> Result<(), ContainerError> {
        self.lifecycle.fail(err, now_ms)?;
        Ok(())
    }

    pub fn stop(&mut self, now_ms: u64) -> Result<(), ContainerError> {
        self.lifecycle.stop(now_ms)?;
        Ok(())
    }

    pub fn mark_stopped(&mut self, now_ms: u64) -> Result<(), ContainerError> {
        self.lifecycle.mark_stopped(now_ms)?;
        Ok(())
    }

    /// Legal only in Running. Fails without side effect if already at the
    /// finite ceiling.
    pub fn increment_iteration(&mut self) -> Result<(), ContainerError> {
        if self.status() != Status::Running {
            return Err(ContainerError::NotRunning { status: self.status() });
        }
        if let MaxIterations::Finite(max) = self.max_iterations {
            if self.current_iteration >= max {
                return Err(ContainerError::IterationLimitExceeded {
                    current: self.current_iteration,
                    max,
                });
            }
        }
        self.current_iteration += 1;
        Ok(())
    }

    /// Checks the restart budget *before* mutating anything (no mutation on
    /// failure, preserving source behavior at the restart-budget ceiling),
    /// then clears the error via [`Lifecycle::reset_for_restart`] and
    /// increments `restart_count`. Restart count is the only field this
    /// touches besides the lifecycle.
    pub fn reset_for_restart(&mut self, now_ms: u64) -> Result<(), ContainerError> {
        if !self.can_restart() {
            return Err(ContainerError::RestartBudgetExhausted {
                restart_count: self.restart_count,
                max_restarts: self.max_restarts,
            });
        }
        self.lifecycle.reset_for_restart(now_ms)?;
        self.restart_count += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
