// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The external game API. Real HTTP client wiring is out of scope for this
//! crate: `GameApiClient` is the seam a production build would implement
//! against the provider's REST API, and what every command body is written
//! against instead of talking to the network directly.

use async_trait::async_trait;
use thiserror::Error;

use wf_core::{Metadata, PlayerId, ShipSymbol};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FleetError {
    #[error("ship {0} not found")]
    ShipNotFound(ShipSymbol),
    #[error("ship {0} is in transit and cannot accept a new navigation order")]
    InTransit(ShipSymbol),
    #[error("ship {0} has insufficient fuel for the requested leg")]
    InsufficientFuel(ShipSymbol),
    #[error("contract {0} not found")]
    ContractNotFound(String),
    #[error("contract {0} already accepted")]
    ContractAlreadyAccepted(String),
    #[error("upstream game API error: {0}")]
    Upstream(String),
}

/// One in-game waypoint move, trade, mining pass, or contract action. Every
/// method is a single network call's worth of work — command bodies call
/// these in a loop, not the other way around.
#[async_trait]
pub trait GameApiClient: Send + Sync {
    async fn navigate(
        &self,
        player_id: &PlayerId,
        ship: &ShipSymbol,
        waypoint: &str,
    ) -> Result<(), FleetError>;

    async fn scout(
        &self,
        player_id: &PlayerId,
        ship: &ShipSymbol,
        params: &Metadata,
    ) -> Result<(), FleetError>;

    async fn extract(&self, player_id: &PlayerId, ship: &ShipSymbol) -> Result<u32, FleetError>;

    async fn sell_cargo(&self, player_id: &PlayerId, ship: &ShipSymbol) -> Result<u64, FleetError>;

    async fn refuel(&self, player_id: &PlayerId, ship: &ShipSymbol) -> Result<(), FleetError>;

    async fn deliver_contract_cargo(
        &self,
        player_id: &PlayerId,
        ship: &ShipSymbol,
        contract_id: &str,
    ) -> Result<(), FleetError>;

    async fn negotiate_contract(
        &self,
        player_id: &PlayerId,
        ship: &ShipSymbol,
    ) -> Result<String, FleetError>;

    async fn accept_contract(
        &self,
        player_id: &PlayerId,
        contract_id: &str,
    ) -> Result<(), FleetError>;

    async fn fulfill_contract(
        &self,
        player_id: &PlayerId,
        contract_id: &str,
    ) -> Result<(), FleetError>;

    /// Whether `ship` has finished whatever leg it was last sent on. Bodies
    /// poll this rather than assuming a fixed transit time.
    async fn is_arrived(&self, player_id: &PlayerId, ship: &ShipSymbol) -> Result<bool, FleetError>;
}
