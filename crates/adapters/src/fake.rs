// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fakes for the engine's own tests, gated behind `test-support` so
//! production builds never link them.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use wf_core::{Metadata, PlayerId, ShipSymbol};

use crate::game::{FleetError, GameApiClient};
use crate::ship_port::{NavStatus, RecoveryError, ShipPort, ShipState};

/// Always succeeds, records calls, and reports `is_arrived` true after
/// `arrive_after_polls` calls — lets navigate-body tests exercise the poll
/// loop without a real transit clock.
pub struct FakeGameApiClient {
    pub arrive_after_polls: u32,
    polls: AtomicU64,
    pub navigate_calls: Mutex<Vec<(PlayerId, ShipSymbol, String)>>,
    pub extract_calls: AtomicU64,
    pub sell_calls: AtomicU64,
    pub fail_next: AtomicBool,
}

impl Default for FakeGameApiClient {
    fn default() -> Self {
        Self {
            arrive_after_polls: 1,
            polls: AtomicU64::new(0),
            navigate_calls: Mutex::new(Vec::new()),
            extract_calls: AtomicU64::new(0),
            sell_calls: AtomicU64::new(0),
            fail_next: AtomicBool::new(false),
        }
    }
}

impl FakeGameApiClient {
    fn maybe_fail(&self) -> Result<(), FleetError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(FleetError::Upstream("injected failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl GameApiClient for FakeGameApiClient {
    async fn navigate(
        &self,
        player_id: &PlayerId,
        ship: &ShipSymbol,
        waypoint: &str,
    ) -> Result<(), FleetError> {
        self.maybe_fail()?;
        self.navigate_calls.lock().push((player_id.clone(), ship.clone(), waypoint.to_string()));
        Ok(())
    }

    async fn scout(&self, _: &PlayerId, _: &ShipSymbol, _: &Metadata) -> Result<(), FleetError> {
        self.maybe_fail()
    }

    async fn extract(&self, _: &PlayerId, _: &ShipSymbol) -> Result<u32, FleetError> {
        self.maybe_fail()?;
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        Ok(10)
    }

    async fn sell_cargo(&self, _: &PlayerId, _: &ShipSymbol) -> Result<u64, FleetError> {
        self.maybe_fail()?;
        self.sell_calls.fetch_add(1, Ordering::SeqCst);
        Ok(100)
    }

    async fn refuel(&self, _: &PlayerId, _: &ShipSymbol) -> Result<(), FleetError> {
        self.maybe_fail()
    }

    async fn deliver_contract_cargo(
        &self,
        _: &PlayerId,
        _: &ShipSymbol,
        _: &str,
    ) -> Result<(), FleetError> {
        self.maybe_fail()
    }

    async fn negotiate_contract(&self, _: &PlayerId, _: &ShipSymbol) -> Result<String, FleetError> {
        self.maybe_fail()?;
        Ok("contract-fake".to_string())
    }

    async fn accept_contract(&self, _: &PlayerId, _: &str) -> Result<(), FleetError> {
        self.maybe_fail()
    }

    async fn fulfill_contract(&self, _: &PlayerId, _: &str) -> Result<(), FleetError> {
        self.maybe_fail()
    }

    async fn is_arrived(&self, _: &PlayerId, _: &ShipSymbol) -> Result<bool, FleetError> {
        self.maybe_fail()?;
        let seen = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(seen >= u64::from(self.arrive_after_polls))
    }
}

/// A ship port whose snapshot and recovery outcomes are set directly by the
/// test, rather than observed from a real client.
#[derive(Default)]
pub struct FakeShipPort {
    pub states: Mutex<Vec<ShipState>>,
    pub recovery_should_succeed: AtomicBool,
    pub recovery_calls: Mutex<Vec<ShipSymbol>>,
}

impl FakeShipPort {
    pub fn with_states(states: Vec<ShipState>) -> Self {
        Self {
            states: Mutex::new(states),
            recovery_should_succeed: AtomicBool::new(true),
            recovery_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_recovery_should_succeed(&self, value: bool) {
        self.recovery_should_succeed.store(value, Ordering::SeqCst);
    }
}

#[async_trait]
impl ShipPort for FakeShipPort {
    async fn snapshot(&self) -> Vec<ShipState> {
        self.states.lock().clone()
    }

    async fn recover(&self, ship_symbol: &ShipSymbol) -> Result<(), RecoveryError> {
        self.recovery_calls.lock().push(ship_symbol.clone());
        if self.recovery_should_succeed.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RecoveryError::Failed("fake recovery declined".into()))
        }
    }
}

pub fn docked_state(ship: &ShipSymbol, last_transition_at_ms: u64) -> ShipState {
    ShipState {
        ship_symbol: ship.clone(),
        nav_status: NavStatus::Docked,
        last_transition_at_ms,
        destination: None,
        fuel_current: 100,
        fuel_capacity: 100,
    }
}
