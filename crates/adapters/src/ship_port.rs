// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The external ship state the health monitor reads and the recovery action
//! it invokes when it decides a ship is stuck (the "ship state map" and
//! "recovery action" interfaces). Both are read through [`ShipPort`]; the
//! monitor itself never talks to the game API directly.

use async_trait::async_trait;
use thiserror::Error;
use wf_core::ShipSymbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavStatus {
    Docked,
    InOrbit,
    InTransit,
}

/// One ship's externally observed state, as of the last poll. `last_transition_at_ms`
/// is the external timestamp the stuck-ship check compares against
/// `recovery_timeout` — not the daemon's own clock.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShipState {
    pub ship_symbol: ShipSymbol,
    pub nav_status: NavStatus,
    pub last_transition_at_ms: u64,
    pub destination: Option<String>,
    pub fuel_current: u32,
    pub fuel_capacity: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecoveryError {
    #[error("ship {0} not found")]
    ShipNotFound(ShipSymbol),
    #[error("recovery action failed: {0}")]
    Failed(String),
}

/// The health monitor's only window onto the fleet: a point-in-time snapshot
/// of every ship's nav state, and a recovery action ("force arrival" /
/// "refetch state", implementation-defined) it can invoke per stuck ship.
#[async_trait]
pub trait ShipPort: Send + Sync {
    async fn snapshot(&self) -> Vec<ShipState>;

    async fn recover(&self, ship_symbol: &ShipSymbol) -> Result<(), RecoveryError>;
}
