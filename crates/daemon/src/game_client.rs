// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The seam a production build plugs a real game API client into.
//! `wf-adapters` defines the `GameApiClient`/`ShipPort` traits and leaves
//! their HTTP implementation to an external collaborator; these stand-ins
//! let the binary link and run while that adapter isn't wired up, answering
//! every call with an explicit "not configured" error instead of silently
//! pretending to act.

use async_trait::async_trait;

use wf_adapters::{FleetError, GameApiClient, RecoveryError, ShipPort, ShipState};
use wf_core::{Metadata, PlayerId, ShipSymbol};

#[derive(Debug, Default)]
pub struct UnconfiguredGameApiClient;

#[async_trait]
impl GameApiClient for UnconfiguredGameApiClient {
    async fn navigate(&self, _: &PlayerId, _: &ShipSymbol, _: &str) -> Result<(), FleetError> {
        Err(not_configured())
    }

    async fn scout(&self, _: &PlayerId, _: &ShipSymbol, _: &Metadata) -> Result<(), FleetError> {
        Err(not_configured())
    }

    async fn extract(&self, _: &PlayerId, _: &ShipSymbol) -> Result<u32, FleetError> {
        Err(not_configured())
    }

    async fn sell_cargo(&self, _: &PlayerId, _: &ShipSymbol) -> Result<u64, FleetError> {
        Err(not_configured())
    }

    async fn refuel(&self, _: &PlayerId, _: &ShipSymbol) -> Result<(), FleetError> {
        Err(not_configured())
    }

    async fn deliver_contract_cargo(&self, _: &PlayerId, _: &ShipSymbol, _: &str) -> Result<(), FleetError> {
        Err(not_configured())
    }

    async fn negotiate_contract(&self, _: &PlayerId, _: &ShipSymbol) -> Result<String, FleetError> {
        Err(not_configured())
    }

    async fn accept_contract(&self, _: &PlayerId, _: &str) -> Result<(), FleetError> {
        Err(not_configured())
    }

    async fn fulfill_contract(&self, _: &PlayerId, _: &str) -> Result<(), FleetError> {
        Err(not_configured())
    }

    async fn is_arrived(&self, _: &PlayerId, _: &ShipSymbol) -> Result<bool, FleetError> {
        Err(not_configured())
    }
}

fn not_configured() -> FleetError {
    FleetError::Upstream("no game API client configured: set one up via the adapter seam before dispatching commands".into())
}

#[derive(Debug, Default)]
pub struct UnconfiguredShipPort;

#[async_trait]
impl ShipPort for UnconfiguredShipPort {
    async fn snapshot(&self) -> Vec<ShipState> {
        Vec::new()
    }

    async fn recover(&self, ship_symbol: &ShipSymbol) -> Result<(), RecoveryError> {
        Err(RecoveryError::ShipNotFound(ship_symbol.clone()))
    }
}
