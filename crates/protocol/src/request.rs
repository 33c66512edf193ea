// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire request types: one variant per endpoint. `HealthCheck` carries no
//! fields; every business-verb variant carries the player and ship(s) it
//! addresses plus any verb-specific parameters.

use serde::{Deserialize, Serialize};
use wf_core::{Metadata, PlayerId, ShipSymbol};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    HealthCheck,

    Navigate { player_id: PlayerId, ship_symbol: ShipSymbol, waypoint: String },
    Scout { player_id: PlayerId, ship_symbol: ShipSymbol, params: Metadata },
    Mine { player_id: PlayerId, ship_symbol: ShipSymbol },
    Trade { player_id: PlayerId, ship_symbol: ShipSymbol },
    Refuel { player_id: PlayerId, ship_symbol: ShipSymbol },
    Deliver { player_id: PlayerId, ship_symbol: ShipSymbol, contract_id: String },
    NegotiateContract { player_id: PlayerId, ship_symbol: ShipSymbol },
    AcceptContract { player_id: PlayerId, contract_id: String },
    FulfillContract { player_id: PlayerId, contract_id: String },
    ArbitrageCoordinator { player_id: PlayerId, ship_symbols: Vec<ShipSymbol> },

    /// Queries the current container the server has in memory.
    ContainerStatus { container_id: wf_core::ContainerId },
    /// Queries the current lock holder for a ship without acquiring it
    /// Read-only ship queries are lock-oblivious.
    ShipLockStatus { ship_symbol: ShipSymbol },

    /// Triggers the graceful shutdown protocol.
    Shutdown,
}

impl Request {
    /// Ship symbols a command mutates, for dispatch to the assignment
    /// manager. Empty for read-only / non-ship-bound requests.
    pub fn ship_symbols(&self) -> Vec<ShipSymbol> {
        match self {
            Request::Navigate { ship_symbol, .. }
            | Request::Scout { ship_symbol, .. }
            | Request::Mine { ship_symbol, .. }
            | Request::Trade { ship_symbol, .. }
            | Request::Refuel { ship_symbol, .. }
            | Request::Deliver { ship_symbol, .. }
            | Request::NegotiateContract { ship_symbol, .. } => vec![ship_symbol.clone()],
            Request::ArbitrageCoordinator { ship_symbols, .. } => ship_symbols.clone(),
            Request::HealthCheck
            | Request::AcceptContract { .. }
            | Request::FulfillContract { .. }
            | Request::ContainerStatus { .. }
            | Request::ShipLockStatus { .. }
            | Request::Shutdown => Vec::new(),
        }
    }

    pub fn player_id(&self) -> Option<&PlayerId> {
        match self {
            Request::Navigate { player_id, .. }
            | Request::Scout { player_id, .. }
            | Request::Mine { player_id, .. }
            | Request::Trade { player_id, .. }
            | Request::Refuel { player_id, .. }
            | Request::Deliver { player_id, .. }
            | Request::NegotiateContract { player_id, .. }
            | Request::AcceptContract { player_id, .. }
            | Request::FulfillContract { player_id, .. }
            | Request::ArbitrageCoordinator { player_id, .. } => Some(player_id),
            Request::HealthCheck
            | Request::ContainerStatus { .. }
            | Request::ShipLockStatus { .. }
            | Request::Shutdown => None,
        }
    }
}
