// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The health monitor. A periodic sweep that cleans up orphaned
//! assignments, detects ships stuck mid-transit and containers looping
//! suspiciously fast, and drives recovery up to a bounded retry budget before
//! giving up on a ship entirely. It never drives a container's own lifecycle
//! directly — only assignments and logs.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use wf_adapters::ShipPort;
use wf_core::{Clock, LogLevel, ReleaseReason, ShipSymbol, Status};
use wf_storage::{ContainerFilter, Containers, Ctx};

use crate::assignment_manager::AssignmentManager;
use crate::log_sink::LogSink;
use crate::registry::Registry;

/// Rate, in iterations per second, above which a `max_iterations = infinite`
/// container is flagged regardless of its metadata.
pub const SUSPICIOUS_RATE_PER_SEC: f64 = 50.0;
/// Cumulative iteration count above which a container is flagged if it has
/// never recorded a `progress` metadata key.
pub const SUSPICIOUS_ITERATION_WATERMARK: u64 = 10_000;

/// Step 5 of the tick algorithm, factored out for direct testing: a
/// `max_iterations = infinite` container is suspicious if its iteration rate
/// clears the absolute threshold, or if it has run past the watermark with
/// no `progress` metadata marker to show it is making slow but real headway.
pub fn is_suspicious(current_iteration: u64, elapsed_ms: u64, has_progress_marker: bool) -> bool {
    let rate = current_iteration as f64 / (elapsed_ms.max(1) as f64 / 1000.0);
    rate > SUSPICIOUS_RATE_PER_SEC
        || (current_iteration > SUSPICIOUS_ITERATION_WATERMARK && !has_progress_marker)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub successful_recoveries: u64,
    pub failed_recoveries: u64,
    pub abandoned_ships: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub orphans_released: usize,
    pub stuck_ships: Vec<ShipSymbol>,
    pub suspicious_container_ids: Vec<wf_core::ContainerId>,
    pub recovered: Vec<ShipSymbol>,
    pub abandoned: Vec<ShipSymbol>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Skipped,
    Ran,
}

pub struct HealthMonitorConfig {
    pub check_interval_ms: u64,
    pub recovery_timeout_ms: u64,
    pub max_recovery_attempts: u32,
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self { check_interval_ms: 30_000, recovery_timeout_ms: 300_000, max_recovery_attempts: 3 }
    }
}

pub struct HealthMonitor<C: Clock + 'static> {
    containers_store: Arc<dyn Containers>,
    assignments: Arc<AssignmentManager>,
    registry: Arc<Registry<C>>,
    ship_port: Arc<dyn ShipPort>,
    logs: Arc<LogSink>,
    config: HealthMonitorConfig,
    last_check_time: Mutex<Option<u64>>,
    recovery_attempts: Mutex<HashMap<ShipSymbol, u32>>,
    watch_list: Mutex<HashSet<ShipSymbol>>,
    metrics: Mutex<Metrics>,
}

impl<C: Clock + 'static> HealthMonitor<C> {
    pub fn new(
        containers_store: Arc<dyn Containers>,
        assignments: Arc<AssignmentManager>,
        registry: Arc<Registry<C>>,
        ship_port: Arc<dyn ShipPort>,
        logs: Arc<LogSink>,
        config: HealthMonitorConfig,
    ) -> Self {
        Self {
            containers_store,
            assignments,
            registry,
            ship_port,
            logs,
            config,
            last_check_time: Mutex::new(None),
            recovery_attempts: Mutex::new(HashMap::new()),
            watch_list: Mutex::new(HashSet::new()),
            metrics: Mutex::new(Metrics::default()),
        }
    }

    pub fn metrics(&self) -> Metrics {
        *self.metrics.lock()
    }

    pub async fn tick(&self, now_ms: u64) -> (TickOutcome, TickReport) {
        {
            let mut last = self.last_check_time.lock();
            if let Some(prev) = *last {
                if now_ms.saturating_sub(prev) < self.config.check_interval_ms {
                    return (TickOutcome::Skipped, TickReport::default());
                }
            }
            *last = Some(now_ms);
        }

        let mut report = TickReport::default();

        let known_ids: HashSet<_> = self
            .containers_store
            .list(Ctx::default(), ContainerFilter::All)
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|c| c.id)
            .collect();
        report.orphans_released =
            self.assignments.clean_orphans(&known_ids, now_ms).await.unwrap_or(0);

        let ship_states: HashMap<ShipSymbol, _> =
            self.ship_port.snapshot().await.into_iter().map(|s| (s.ship_symbol.clone(), s)).collect();

        let active_assignments = match self.assignments_snapshot().await {
            Ok(a) => a,
            Err(_) => return (TickOutcome::Ran, report),
        };

        for assignment in &active_assignments {
            let Some(container) =
                self.containers_store.find(Ctx::default(), &assignment.container_id).await.ok().flatten()
            else {
                continue;
            };
            if container.status() != Status::Running {
                continue;
            }
            let Some(state) = ship_states.get(&assignment.ship_symbol) else { continue };
            if now_ms.saturating_sub(state.last_transition_at_ms) > self.config.recovery_timeout_ms {
                report.stuck_ships.push(assignment.ship_symbol.clone());
                self.watch_list.lock().insert(assignment.ship_symbol.clone());
            }
        }

        for container in self.registry.list() {
            if container.status() != Status::Running || !container.max_iterations.is_infinite() {
                continue;
            }
            let elapsed_ms = container.started_at_ms().map_or(0, |s| now_ms.saturating_sub(s));
            let has_progress_marker = container.metadata.contains_key("progress");
            if is_suspicious(container.current_iteration, elapsed_ms, has_progress_marker) {
                report.suspicious_container_ids.push(container.id);
                let _ = self
                    .logs
                    .log(
                        container.id,
                        container.player_id.clone(),
                        now_ms,
                        LogLevel::Warning,
                        format!("container {} is looping suspiciously fast", container.id),
                    )
                    .await;
            }
        }

        for ship in report.stuck_ships.clone() {
            self.recover_ship(ship, now_ms, &mut report).await;
        }

        (TickOutcome::Ran, report)
    }

    async fn assignments_snapshot(&self) -> Result<Vec<wf_core::ShipAssignment>, wf_storage::StorageError> {
        self.assignments.list_active().await
    }

    async fn recover_ship(&self, ship: ShipSymbol, now_ms: u64, report: &mut TickReport) {
        let attempts = {
            let attempts = self.recovery_attempts.lock();
            *attempts.get(&ship).unwrap_or(&0)
        };
        if attempts >= self.config.max_recovery_attempts {
            self.abandon(ship, now_ms, report).await;
            return;
        }

        let outcome = self.ship_port.recover(&ship).await;
        let new_attempts = attempts + 1;
        self.recovery_attempts.lock().insert(ship.clone(), new_attempts);

        match outcome {
            Ok(()) => {
                self.recovery_attempts.lock().remove(&ship);
                self.watch_list.lock().remove(&ship);
                self.metrics.lock().successful_recoveries += 1;
                report.recovered.push(ship);
            }
            Err(_) => {
                self.metrics.lock().failed_recoveries += 1;
                if new_attempts >= self.config.max_recovery_attempts {
                    self.abandon(ship, now_ms, report).await;
                }
            }
        }
    }

    async fn abandon(&self, ship: ShipSymbol, now_ms: u64, report: &mut TickReport) {
        self.recovery_attempts.lock().remove(&ship);
        self.watch_list.lock().remove(&ship);
        self.metrics.lock().abandoned_ships += 1;
        if let Ok(Some(assignment)) = self.assignments.find(&ship).await {
            let _ = self
                .assignments
                .release_owned(&ship, &assignment.container_id, ReleaseReason::Failed, now_ms)
                .await;
            let _ = self
                .logs
                .log(
                    assignment.container_id,
                    assignment.player_id.clone(),
                    now_ms,
                    LogLevel::Critical,
                    format!("ship {ship} abandoned after exhausting recovery attempts"),
                )
                .await;
        }
        report.abandoned.push(ship);
    }
}

#[cfg(test)]
#[path = "health_monitor_tests.rs"]
mod tests;
