// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One [`CommandBody`] per [`ContainerKind`](wf_core::ContainerKind), all
//! built on the same [`GameApiClient`]. Verb-specific parameters (a waypoint,
//! a contract id) travel in via the container's metadata, copied in at
//! creation time rather than threaded through as typed arguments.

use std::sync::Arc;

use async_trait::async_trait;

use wf_core::{ContainerKind, LogLevel, MetadataValue};

use crate::body::{BodyContext, BodyError, CommandBody};
use crate::game::{FleetError, GameApiClient};

fn require_str(cx: &BodyContext, key: &str) -> Result<String, BodyError> {
    match cx.metadata.get(key) {
        Some(MetadataValue::Str(s)) => Ok(s.clone()),
        _ => Err(BodyError::Fleet(FleetError::Upstream(format!(
            "missing required metadata key {key:?}"
        )))),
    }
}

fn require_ship(cx: &BodyContext) -> Result<&wf_core::ShipSymbol, BodyError> {
    cx.primary_ship()
        .ok_or_else(|| BodyError::Fleet(FleetError::Upstream("no ship assigned".into())))
}

pub struct NavigateBody {
    pub client: Arc<dyn GameApiClient>,
}

#[async_trait]
impl CommandBody for NavigateBody {
    async fn run(&self, cx: &BodyContext) -> Result<(), BodyError> {
        let ship = require_ship(cx)?;
        let waypoint = require_str(cx, "waypoint")?;
        self.client.navigate(&cx.player_id, ship, &waypoint).await?;
        loop {
            if !cx.tick() {
                return Err(BodyError::Cancelled("navigate interrupted in transit".into()));
            }
            if self.client.is_arrived(&cx.player_id, ship).await? {
                cx.log(LogLevel::Info, format!("{ship} arrived at {waypoint}"));
                return Ok(());
            }
        }
    }
}

pub struct ScoutBody {
    pub client: Arc<dyn GameApiClient>,
}

#[async_trait]
impl CommandBody for ScoutBody {
    async fn run(&self, cx: &BodyContext) -> Result<(), BodyError> {
        let ship = require_ship(cx)?;
        while cx.tick() {
            self.client.scout(&cx.player_id, ship, &cx.metadata).await?;
        }
        Ok(())
    }
}

pub struct MineBody {
    pub client: Arc<dyn GameApiClient>,
}

#[async_trait]
impl CommandBody for MineBody {
    async fn run(&self, cx: &BodyContext) -> Result<(), BodyError> {
        let ship = require_ship(cx)?;
        while cx.tick() {
            let yield_amount = self.client.extract(&cx.player_id, ship).await?;
            cx.log(LogLevel::Debug, format!("{ship} extracted {yield_amount} units"));
        }
        Ok(())
    }
}

pub struct TradeBody {
    pub client: Arc<dyn GameApiClient>,
}

#[async_trait]
impl CommandBody for TradeBody {
    async fn run(&self, cx: &BodyContext) -> Result<(), BodyError> {
        let ship = require_ship(cx)?;
        while cx.tick() {
            let credits = self.client.sell_cargo(&cx.player_id, ship).await?;
            cx.log(LogLevel::Info, format!("{ship} sold cargo for {credits} credits"));
        }
        Ok(())
    }
}

pub struct RefuelBody {
    pub client: Arc<dyn GameApiClient>,
}

#[async_trait]
impl CommandBody for RefuelBody {
    async fn run(&self, cx: &BodyContext) -> Result<(), BodyError> {
        let ship = require_ship(cx)?;
        self.client.refuel(&cx.player_id, ship).await?;
        cx.tick();
        Ok(())
    }
}

pub struct DeliverBody {
    pub client: Arc<dyn GameApiClient>,
}

#[async_trait]
impl CommandBody for DeliverBody {
    async fn run(&self, cx: &BodyContext) -> Result<(), BodyError> {
        let ship = require_ship(cx)?;
        let contract_id = require_str(cx, "contract_id")?;
        self.client.deliver_contract_cargo(&cx.player_id, ship, &contract_id).await?;
        cx.tick();
        Ok(())
    }
}

pub struct NegotiateContractBody {
    pub client: Arc<dyn GameApiClient>,
}

#[async_trait]
impl CommandBody for NegotiateContractBody {
    async fn run(&self, cx: &BodyContext) -> Result<(), BodyError> {
        let ship = require_ship(cx)?;
        let contract_id = self.client.negotiate_contract(&cx.player_id, ship).await?;
        cx.log(LogLevel::Info, format!("negotiated contract {contract_id}"));
        cx.tick();
        Ok(())
    }
}

pub struct AcceptContractBody {
    pub client: Arc<dyn GameApiClient>,
}

#[async_trait]
impl CommandBody for AcceptContractBody {
    async fn run(&self, cx: &BodyContext) -> Result<(), BodyError> {
        let contract_id = require_str(cx, "contract_id")?;
        self.client.accept_contract(&cx.player_id, &contract_id).await?;
        cx.tick();
        Ok(())
    }
}

pub struct FulfillContractBody {
    pub client: Arc<dyn GameApiClient>,
}

#[async_trait]
impl CommandBody for FulfillContractBody {
    async fn run(&self, cx: &BodyContext) -> Result<(), BodyError> {
        let contract_id = require_str(cx, "contract_id")?;
        self.client.fulfill_contract(&cx.player_id, &contract_id).await?;
        cx.tick();
        Ok(())
    }
}

/// Coordinates several ships against one arbitrage loop: each pass, every
/// assigned ship extracts then sells. Routing/pricing strategy is an external
/// concern — this body just keeps the ships cycling.
pub struct ArbitrageCoordinatorBody {
    pub client: Arc<dyn GameApiClient>,
}

#[async_trait]
impl CommandBody for ArbitrageCoordinatorBody {
    async fn run(&self, cx: &BodyContext) -> Result<(), BodyError> {
        if cx.ship_symbols.is_empty() {
            return Err(BodyError::Fleet(FleetError::Upstream("no ships assigned".into())));
        }
        while cx.tick() {
            for ship in &cx.ship_symbols {
                self.client.extract(&cx.player_id, ship).await?;
                self.client.sell_cargo(&cx.player_id, ship).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio_util::sync::CancellationToken;
    use wf_core::{ContainerId, LogLevel, PlayerId, ShipSymbol};

    use crate::fake::FakeGameApiClient;

    fn ctx(
        metadata: wf_core::Metadata,
        ship_symbols: Vec<ShipSymbol>,
        max_iterations: u32,
    ) -> BodyContext {
        let remaining = Arc::new(AtomicU32::new(max_iterations));
        let report_iteration = Arc::new(move || {
            let prev = remaining.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                if n == 0 {
                    None
                } else {
                    Some(n - 1)
                }
            });
            prev.is_ok()
        });
        BodyContext::new(
            ContainerId::new(),
            PlayerId::from("player-1"),
            ship_symbols,
            metadata,
            CancellationToken::new(),
            report_iteration,
            Arc::new(|_level: LogLevel, _msg: String| {}),
        )
    }

    #[tokio::test]
    async fn navigate_polls_until_arrival_then_stops() {
        let client = Arc::new(FakeGameApiClient { arrive_after_polls: 2, ..Default::default() });
        let body = NavigateBody { client: client.clone() };
        let mut metadata = wf_core::Metadata::new();
        metadata.insert("waypoint".into(), MetadataValue::Str("X1-A1".into()));
        let cx = ctx(metadata, vec![ShipSymbol::from("SHIP-A")], 10);

        body.run(&cx).await.expect("navigate completes once arrived");
        assert_eq!(client.navigate_calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn navigate_without_waypoint_metadata_fails() {
        let client = Arc::new(FakeGameApiClient::default());
        let body = NavigateBody { client };
        let cx = ctx(wf_core::Metadata::new(), vec![ShipSymbol::from("SHIP-A")], 10);
        let err = body.run(&cx).await.unwrap_err();
        assert!(matches!(err, BodyError::Fleet(FleetError::Upstream(_))));
    }

    #[tokio::test]
    async fn mine_stops_when_iteration_budget_is_exhausted() {
        let client = Arc::new(FakeGameApiClient::default());
        let body = MineBody { client: client.clone() };
        let cx = ctx(wf_core::Metadata::new(), vec![ShipSymbol::from("SHIP-A")], 3);

        body.run(&cx).await.expect("mine returns Ok once budget runs out");
        assert_eq!(client.extract_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn arbitrage_coordinator_requires_at_least_one_ship() {
        let client = Arc::new(FakeGameApiClient::default());
        let body = ArbitrageCoordinatorBody { client };
        let cx = ctx(wf_core::Metadata::new(), Vec::new(), 10);
        let err = body.run(&cx).await.unwrap_err();
        assert!(matches!(err, BodyError::Fleet(FleetError::Upstream(_))));
    }

    #[tokio::test]
    async fn arbitrage_coordinator_cycles_every_assigned_ship_per_pass() {
        let client = Arc::new(FakeGameApiClient::default());
        let body = ArbitrageCoordinatorBody { client: client.clone() };
        let ships = vec![ShipSymbol::from("SHIP-A"), ShipSymbol::from("SHIP-B")];
        let cx = ctx(wf_core::Metadata::new(), ships, 2);

        body.run(&cx).await.expect("coordinator stops at budget");
        assert_eq!(client.extract_calls.load(Ordering::SeqCst), 4);
        assert_eq!(client.sell_calls.load(Ordering::SeqCst), 4);
    }
}

pub fn make_body(kind: ContainerKind, client: Arc<dyn GameApiClient>) -> Box<dyn CommandBody> {
    match kind {
        ContainerKind::Navigate => Box::new(NavigateBody { client }),
        ContainerKind::Scout => Box::new(ScoutBody { client }),
        ContainerKind::Mine => Box::new(MineBody { client }),
        ContainerKind::Trade => Box::new(TradeBody { client }),
        ContainerKind::Refuel => Box::new(RefuelBody { client }),
        ContainerKind::Deliver => Box::new(DeliverBody { client }),
        ContainerKind::NegotiateContract => Box::new(NegotiateContractBody { client }),
        ContainerKind::AcceptContract => Box::new(AcceptContractBody { client }),
        ContainerKind::FulfillContract => Box::new(FulfillContractBody { client }),
        ContainerKind::ArbitrageCoordinator => Box::new(ArbitrageCoordinatorBody { client }),
    }
}
