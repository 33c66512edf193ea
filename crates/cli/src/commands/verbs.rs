// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The business-verb subcommands: one per RPC endpoint, each mapping 1:1 to
//! a [`Request`] variant.

use clap::Subcommand;
use wf_core::{ContainerId, Metadata, PlayerId, ShipSymbol};
use wf_protocol::{Request, Response};

use crate::client::{require_ok, DaemonClient};
use crate::exit_error::ExitError;

#[derive(Subcommand)]
pub enum Verb {
    /// Send a ship to a waypoint.
    Navigate { player_id: String, ship_symbol: String, waypoint: String },
    /// Scout nearby markets or waypoints.
    Scout { player_id: String, ship_symbol: String },
    /// Run a mining loop on a ship.
    Mine { player_id: String, ship_symbol: String },
    /// Run a trading loop on a ship.
    Trade { player_id: String, ship_symbol: String },
    /// Refuel a ship.
    Refuel { player_id: String, ship_symbol: String },
    /// Deliver contract cargo.
    Deliver { player_id: String, ship_symbol: String, contract_id: String },
    /// Negotiate a new contract.
    NegotiateContract { player_id: String, ship_symbol: String },
    /// Accept a negotiated contract.
    AcceptContract { player_id: String, contract_id: String },
    /// Fulfill a completed contract.
    FulfillContract { player_id: String, contract_id: String },
    /// Run the arbitrage coordinator across a fleet.
    ArbitrageCoordinator { player_id: String, ship_symbols: Vec<String> },
    /// Query a container's current status.
    ContainerStatus { container_id: String },
}

impl Verb {
    fn into_request(self) -> Request {
        match self {
            Verb::Navigate { player_id, ship_symbol, waypoint } => Request::Navigate {
                player_id: PlayerId::from(player_id),
                ship_symbol: ShipSymbol::from(ship_symbol),
                waypoint,
            },
            Verb::Scout { player_id, ship_symbol } => Request::Scout {
                player_id: PlayerId::from(player_id),
                ship_symbol: ShipSymbol::from(ship_symbol),
                params: Metadata::new(),
            },
            Verb::Mine { player_id, ship_symbol } => {
                Request::Mine { player_id: PlayerId::from(player_id), ship_symbol: ShipSymbol::from(ship_symbol) }
            }
            Verb::Trade { player_id, ship_symbol } => {
                Request::Trade { player_id: PlayerId::from(player_id), ship_symbol: ShipSymbol::from(ship_symbol) }
            }
            Verb::Refuel { player_id, ship_symbol } => {
                Request::Refuel { player_id: PlayerId::from(player_id), ship_symbol: ShipSymbol::from(ship_symbol) }
            }
            Verb::Deliver { player_id, ship_symbol, contract_id } => Request::Deliver {
                player_id: PlayerId::from(player_id),
                ship_symbol: ShipSymbol::from(ship_symbol),
                contract_id,
            },
            Verb::NegotiateContract { player_id, ship_symbol } => Request::NegotiateContract {
                player_id: PlayerId::from(player_id),
                ship_symbol: ShipSymbol::from(ship_symbol),
            },
            Verb::AcceptContract { player_id, contract_id } => {
                Request::AcceptContract { player_id: PlayerId::from(player_id), contract_id }
            }
            Verb::FulfillContract { player_id, contract_id } => {
                Request::FulfillContract { player_id: PlayerId::from(player_id), contract_id }
            }
            Verb::ArbitrageCoordinator { player_id, ship_symbols } => Request::ArbitrageCoordinator {
                player_id: PlayerId::from(player_id),
                ship_symbols: ship_symbols.into_iter().map(ShipSymbol::from).collect(),
            },
            Verb::ContainerStatus { container_id } => {
                Request::ContainerStatus { container_id: ContainerId::from(container_id) }
            }
        }
    }
}

pub async fn run(client: &DaemonClient, verb: Verb) -> Result<(), ExitError> {
    let request = verb.into_request();
    let response = require_ok(client.send(&request).await?)?;
    print_response(&response);
    Ok(())
}

fn print_response(response: &Response) {
    if let Some(container_id) = &response.container_id {
        println!("{container_id}");
    } else {
        println!("{}", serde_json::json!({ "status": response.status }));
    }
}
