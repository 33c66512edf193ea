// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The container registry and runner. Owns the in-memory authoritative
//! copy of every container created during this process's lifetime, persists
//! it at every lifecycle transition, and spawns the tokio task that drives
//! each container's [`CommandBody`] to completion.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use wf_adapters::{BodyContext, BodyError, CommandBody};
use wf_core::{
    Clock, Container, ContainerId, ContainerKind, LogLevel, MaxIterations, Metadata, PlayerId,
    ReleaseReason, ShipSymbol,
};
use wf_storage::{ContainerFilter, Containers, Ctx};

use crate::assignment_manager::AssignmentManager;
use crate::error::RegistryError;
use crate::log_sink::LogSink;

struct Entry {
    container: Arc<Mutex<Container>>,
    cancel: CancellationToken,
    ship_symbols: Vec<ShipSymbol>,
    operation: String,
    body: Arc<dyn CommandBody>,
    join: Mutex<Option<JoinHandle<()>>>,
}

pub struct Registry<C: Clock + 'static> {
    containers_store: Arc<dyn Containers>,
    assignments: Arc<AssignmentManager>,
    logs: Arc<LogSink>,
    clock: C,
    entries: Arc<Mutex<HashMap<ContainerId, Arc<Entry>>>>,
}

impl<C: Clock + 'static> Registry<C> {
    pub fn new(
        containers_store: Arc<dyn Containers>,
        assignments: Arc<AssignmentManager>,
        logs: Arc<LogSink>,
        clock: C,
    ) -> Self {
        Self { containers_store, assignments, logs, clock, entries: Arc::new(Mutex::new(HashMap::new())) }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_and_start(
        &self,
        kind: ContainerKind,
        player_id: PlayerId,
        metadata: Metadata,
        ship_symbols: Vec<ShipSymbol>,
        max_iterations: MaxIterations,
        max_restarts: u32,
        operation: impl Into<String>,
        body: Arc<dyn CommandBody>,
    ) -> Result<ContainerId, RegistryError> {
        let operation = operation.into();
        let now = self.clock.epoch_ms();
        let mut container =
            Container::new(kind, player_id.clone(), metadata.clone(), max_iterations, max_restarts, now);
        let container_id = container.id;

        if let Err(e) = self.assign_ships(&ship_symbols, &player_id, container_id, &operation, now).await {
            return Err(e.into());
        }

        self.containers_store.add(Ctx::default(), &container, &kind.to_string()).await?;
        container.start(now)?;
        self.containers_store.update(Ctx::default(), &container).await?;

        let shared = Arc::new(Mutex::new(container));
        let cancel = CancellationToken::new();
        let entry = Arc::new(Entry {
            container: shared.clone(),
            cancel: cancel.clone(),
            ship_symbols: ship_symbols.clone(),
            operation: operation.clone(),
            body: body.clone(),
            join: Mutex::new(None),
        });
        self.entries.lock().insert(container_id, entry.clone());

        let join = self.spawn_task(container_id, player_id, ship_symbols, metadata, shared, cancel, body);
        *entry.join.lock() = Some(join);

        Ok(container_id)
    }

    async fn assign_ships(
        &self,
        ship_symbols: &[ShipSymbol],
        player_id: &PlayerId,
        container_id: ContainerId,
        operation: &str,
        now: u64,
    ) -> Result<(), crate::error::AssignmentError> {
        let mut assigned = Vec::with_capacity(ship_symbols.len());
        for ship in ship_symbols {
            match self.assignments.assign(ship.clone(), player_id.clone(), container_id, operation, now).await {
                Ok(()) => assigned.push(ship.clone()),
                Err(e) => {
                    let _ = self
                        .assignments
                        .release_by_container(&container_id, ReleaseReason::Failed, now)
                        .await;
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn spawn_task(
        &self,
        container_id: ContainerId,
        player_id: PlayerId,
        ship_symbols: Vec<ShipSymbol>,
        metadata: Metadata,
        container: Arc<Mutex<Container>>,
        cancel: CancellationToken,
        body: Arc<dyn CommandBody>,
    ) -> JoinHandle<()> {
        let containers_store = self.containers_store.clone();
        let assignments = self.assignments.clone();
        let logs = self.logs.clone();
        let clock = self.clock.clone();

        tokio::spawn(async move {
            let container_for_ticks = container.clone();
            let report_iteration = Arc::new(move || {
                container_for_ticks.lock().increment_iteration().is_ok()
            });
            let log_container_id = container_id;
            let log_player = player_id.clone();
            let log_sink = logs.clone();
            let log = Arc::new(move |level: LogLevel, message: String| {
                let sink = log_sink.clone();
                let player = log_player.clone();
                let now = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or(0);
                tokio::spawn(async move {
                    let _ = sink.log(log_container_id, player, now, level, message).await;
                });
            });

            let cx = BodyContext::new(
                container_id,
                player_id.clone(),
                ship_symbols,
                metadata,
                cancel.clone(),
                report_iteration,
                log,
            );

            let result = body.run(&cx).await;
            let now = clock.epoch_ms();

            let (reason, level, message) = match &result {
                Ok(()) => {
                    let mut c = container.lock();
                    let _ = c.complete(now);
                    (ReleaseReason::Completed, LogLevel::Info, "container completed".to_string())
                }
                Err(BodyError::Cancelled(msg)) => {
                    let mut c = container.lock();
                    let _ = c.mark_stopped(now);
                    (ReleaseReason::Stopped, LogLevel::Info, format!("container stopped: {msg}"))
                }
                Err(other) => {
                    let mut c = container.lock();
                    let _ = c.fail(other.to_string(), now);
                    (ReleaseReason::Failed, LogLevel::Error, format!("container failed: {other}"))
                }
            };

            let snapshot = container.lock().clone();
            let _ = containers_store.update(Ctx::default(), &snapshot).await;
            let _ = assignments.release_by_container(&container_id, reason, now).await;
            let _ = logs.log(container_id, player_id, now, level, message).await;
        })
    }

    pub fn query(&self, id: &ContainerId) -> Option<Container> {
        self.entries.lock().get(id).map(|e| e.container.lock().clone())
    }

    pub fn list(&self) -> Vec<Container> {
        self.entries.lock().values().map(|e| e.container.lock().clone()).collect()
    }

    pub fn live_container_ids(&self) -> std::collections::HashSet<ContainerId> {
        self.entries
            .lock()
            .iter()
            .filter(|(_, e)| !e.container.lock().is_finished())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Transitions a Running container to Stopping and signals cancellation.
    /// The spawned task notices on its next [`BodyContext::tick`] call and
    /// finishes the rest of the stop protocol itself.
    pub fn stop(&self, id: &ContainerId) -> Result<(), RegistryError> {
        let entries = self.entries.lock();
        let entry = entries.get(id).ok_or(RegistryError::NotFound(*id))?;
        let now = self.clock.epoch_ms();
        entry.container.lock().stop(now)?;
        entry.cancel.cancel();
        Ok(())
    }

    /// Forces a still-live container straight to Stopped without waiting for
    /// its task — used at the shutdown deadline.
    pub async fn force_mark_stopped(
        &self,
        id: &ContainerId,
        reason: ReleaseReason,
    ) -> Result<(), RegistryError> {
        let now = self.clock.epoch_ms();
        let entry = {
            let entries = self.entries.lock();
            entries.get(id).ok_or(RegistryError::NotFound(*id))?.clone()
        };
        entry.cancel.cancel();
        {
            let mut c = entry.container.lock();
            if !c.is_finished() {
                let _ = c.mark_stopped(now);
            }
        }
        let snapshot = entry.container.lock().clone();
        self.containers_store.update(Ctx::default(), &snapshot).await?;
        self.assignments.release_by_container(id, reason, now).await?;
        Ok(())
    }

    /// Polls until every known container is finished, `timeout` elapses, or
    /// `interrupt` is cancelled (a second termination signal arriving mid-wait,
    /// arriving mid-wait). Returns the ids still unfinished when it stops.
    pub async fn wait_for_all_or(
        &self,
        timeout: std::time::Duration,
        interrupt: &CancellationToken,
    ) -> Vec<ContainerId> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let unfinished: Vec<ContainerId> = self
                .entries
                .lock()
                .iter()
                .filter(|(_, e)| !e.container.lock().is_finished())
                .map(|(id, _)| *id)
                .collect();
            if unfinished.is_empty() || tokio::time::Instant::now() >= deadline || interrupt.is_cancelled() {
                return unfinished;
            }
            tokio::select! {
                _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {}
                _ = interrupt.cancelled() => {}
            }
        }
    }

    pub async fn wait_for_all(&self, timeout: std::time::Duration) -> Vec<ContainerId> {
        self.wait_for_all_or(timeout, &CancellationToken::new()).await
    }

    /// Restarts a finished, restart-eligible container: re-leases its ships
    /// and spawns a fresh run of the same body.
    pub async fn restart(&self, id: &ContainerId) -> Result<(), RegistryError> {
        let entry = {
            let entries = self.entries.lock();
            entries.get(id).ok_or(RegistryError::NotFound(*id))?.clone()
        };
        let now = self.clock.epoch_ms();

        let (player_id, metadata) = {
            let mut c = entry.container.lock();
            c.reset_for_restart(now)?;
            (c.player_id.clone(), c.metadata.clone())
        };
        let snapshot = entry.container.lock().clone();
        self.containers_store.update(Ctx::default(), &snapshot).await?;

        for ship in &entry.ship_symbols {
            self.assignments
                .assign(ship.clone(), player_id.clone(), *id, entry.operation.clone(), now)
                .await?;
        }

        let cancel = CancellationToken::new();
        entry.cancel.cancel();
        let new_entry = Arc::new(Entry {
            container: entry.container.clone(),
            cancel: cancel.clone(),
            ship_symbols: entry.ship_symbols.clone(),
            operation: entry.operation.clone(),
            body: entry.body.clone(),
            join: Mutex::new(None),
        });
        self.entries.lock().insert(*id, new_entry.clone());

        let join = self.spawn_task(
            *id,
            player_id,
            entry.ship_symbols.clone(),
            metadata,
            entry.container.clone(),
            cancel,
            entry.body.clone(),
        );
        *new_entry.join.lock() = Some(join);
        Ok(())
    }

    pub async fn reload_finished(&self, filter: ContainerFilter) -> Result<Vec<Container>, RegistryError> {
        Ok(self.containers_store.list(Ctx::default(), filter).await?)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
