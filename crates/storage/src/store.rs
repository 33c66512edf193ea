// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`WalStore`]: the shipped persistence implementation backing the port
//! traits in [`crate::port`]. Every mutation is appended to the WAL before
//! (and atomically with, from the caller's point of view) being folded into
//! [`MaterializedState`] — an in-memory success and a durable write either
//! both happen or neither does, since `apply` only ever runs after `append`
//! returns `Ok`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use wf_core::{
    Container, ContainerId, ContainerLogEntry, LogLevel, PlayerId, ReleaseReason, ShipAssignment, ShipSymbol, Status,
};

use crate::checkpoint::{load_snapshot, Checkpointer};
use crate::error::StorageError;
use crate::event::Event;
use crate::port::{ContainerFilter, Containers, ContainerLogs, Ctx, ShipAssignments};
use crate::state::MaterializedState;
use crate::wal::Wal;

struct Inner {
    wal: Wal,
    state: MaterializedState,
}

/// Single-writer handle over the WAL-backed materialized state. Cheaply
/// `Clone`-able; every clone shares the same mutex, matching the
/// single-writer discipline the registry, assignment manager,
/// and log sink all rely on.
#[derive(Clone)]
pub struct WalStore {
    inner: Arc<Mutex<Inner>>,
    checkpointer: Arc<Checkpointer>,
}

impl WalStore {
    /// Opens (or creates) the WAL and snapshot at the given paths, replaying
    /// any events recorded since the last snapshot.
    pub fn open(wal_path: impl AsRef<Path>, snapshot_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let wal_path: PathBuf = wal_path.as_ref().to_path_buf();
        let snapshot_path: PathBuf = snapshot_path.as_ref().to_path_buf();
        let (state, seq) = load_snapshot(&snapshot_path, &wal_path).map_err(|e| match e {
            crate::checkpoint::CheckpointError::Snapshot(s) => StorageError::Snapshot(s),
            crate::checkpoint::CheckpointError::Wal(w) => StorageError::Wal(w),
        })?;
        let wal = Wal::open(&wal_path, seq)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner { wal, state })),
            checkpointer: Arc::new(Checkpointer::new(snapshot_path)),
        })
    }

    fn append(&self, event: &Event) -> Result<(), StorageError> {
        let mut inner = self.inner.lock();
        inner.wal.append(event)?;
        if inner.wal.needs_flush() {
            inner.wal.flush()?;
        }
        inner.state.apply(event);
        Ok(())
    }

    /// Snapshots current state and truncates the WAL. Called on a timer by
    /// the daemon and once more during graceful shutdown.
    pub fn checkpoint(&self) -> Result<(), StorageError> {
        let mut inner = self.inner.lock();
        let seq = inner.wal.write_seq();
        inner.wal.flush()?;
        let state = inner.state.clone();
        self.checkpointer
            .checkpoint(&state, seq, &mut inner.wal)
            .map_err(|e| match e {
                crate::checkpoint::CheckpointError::Snapshot(s) => StorageError::Snapshot(s),
                crate::checkpoint::CheckpointError::Wal(w) => StorageError::Wal(w),
            })
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        Ok(self.inner.lock().wal.flush()?)
    }

    /// Snapshot of every container in memory, regardless of filter — used by
    /// reconciliation at startup before the port traits' own
    /// filtering is relevant.
    pub fn all_containers(&self) -> Vec<Container> {
        self.inner.lock().state.containers.values().map(|r| r.container.clone()).collect()
    }
}

#[async_trait]
impl Containers for WalStore {
    async fn add(&self, _ctx: Ctx, container: &Container, command_type: &str) -> Result<(), StorageError> {
        self.append(&Event::ContainerCreated { container: container.clone(), command_type: command_type.to_string() })
    }

    async fn update(&self, _ctx: Ctx, container: &Container) -> Result<(), StorageError> {
        self.append(&Event::ContainerTransitioned { container: container.clone() })
    }

    async fn find(&self, _ctx: Ctx, id: &ContainerId) -> Result<Option<Container>, StorageError> {
        Ok(self.inner.lock().state.containers.get(id).map(|r| r.container.clone()))
    }

    async fn list(&self, _ctx: Ctx, filter: ContainerFilter) -> Result<Vec<Container>, StorageError> {
        let inner = self.inner.lock();
        let matches = |c: &Container| match filter {
            ContainerFilter::All => true,
            ContainerFilter::Status(s) => c.status() == s,
            ContainerFilter::Unfinished => !c.is_finished(),
            ContainerFilter::Finished => c.is_finished(),
        };
        Ok(inner.state.containers.values().map(|r| &r.container).filter(|c| matches(c)).cloned().collect())
    }
}

#[async_trait]
impl ContainerLogs for WalStore {
    async fn log(&self, _ctx: Ctx, mut entry: ContainerLogEntry) -> Result<ContainerLogEntry, StorageError> {
        entry.id = self.inner.lock().state.next_log_id();
        self.append(&Event::ContainerLogAppended { entry: entry.clone() })?;
        Ok(entry)
    }

    async fn get(
        &self,
        _ctx: Ctx,
        container_id: &ContainerId,
        player_id: &PlayerId,
        limit: usize,
        level_filter: Option<LogLevel>,
        since_ms: Option<u64>,
    ) -> Result<Vec<ContainerLogEntry>, StorageError> {
        self.get_with_offset(_ctx, container_id, player_id, limit, 0, level_filter, since_ms).await
    }

    async fn get_with_offset(
        &self,
        _ctx: Ctx,
        container_id: &ContainerId,
        player_id: &PlayerId,
        limit: usize,
        offset: usize,
        level_filter: Option<LogLevel>,
        since_ms: Option<u64>,
    ) -> Result<Vec<ContainerLogEntry>, StorageError> {
        let inner = self.inner.lock();
        let mut matching: Vec<&ContainerLogEntry> = inner
            .state
            .container_logs
            .iter()
            .filter(|e| &e.container_id == container_id && &e.player_id == player_id)
            .filter(|e| level_filter.map_or(true, |lvl| e.level == lvl))
            .filter(|e| since_ms.map_or(true, |since| e.timestamp_ms >= since))
            .collect();
        // Newest-first.
        matching.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms).then(b.id.cmp(&a.id)));
        Ok(matching.into_iter().skip(offset).take(limit).cloned().collect())
    }
}

#[async_trait]
impl ShipAssignments for WalStore {
    async fn insert(&self, _ctx: Ctx, assignment: ShipAssignment) -> Result<(), StorageError> {
        self.append(&Event::ShipAssigned { assignment })
    }

    async fn release_by_ship(
        &self,
        _ctx: Ctx,
        ship: &ShipSymbol,
        reason: ReleaseReason,
        now_ms: u64,
    ) -> Result<bool, StorageError> {
        let was_active = self.inner.lock().state.ship_assignments.contains_key(ship);
        if !was_active {
            return Ok(false);
        }
        self.append(&Event::ShipReleased { ship_symbol: ship.clone(), released_at_ms: now_ms, reason })?;
        Ok(true)
    }

    async fn release_by_container(
        &self,
        _ctx: Ctx,
        container_id: &ContainerId,
        reason: ReleaseReason,
        now_ms: u64,
    ) -> Result<usize, StorageError> {
        let ships: Vec<ShipSymbol> = self
            .inner
            .lock()
            .state
            .ship_assignments
            .values()
            .filter(|a| &a.container_id == container_id)
            .map(|a| a.ship_symbol.clone())
            .collect();
        for ship in &ships {
            self.append(&Event::ShipReleased { ship_symbol: ship.clone(), released_at_ms: now_ms, reason })?;
        }
        Ok(ships.len())
    }

    async fn find_by_ship(&self, _ctx: Ctx, ship: &ShipSymbol) -> Result<Option<ShipAssignment>, StorageError> {
        Ok(self.inner.lock().state.ship_assignments.get(ship).cloned())
    }

    async fn release_all_active(&self, _ctx: Ctx, reason: ReleaseReason, now_ms: u64) -> Result<usize, StorageError> {
        let ships: Vec<ShipSymbol> = self.inner.lock().state.ship_assignments.keys().cloned().collect();
        for ship in &ships {
            self.append(&Event::ShipReleased { ship_symbol: ship.clone(), released_at_ms: now_ms, reason })?;
        }
        Ok(ships.len())
    }

    async fn list_active(&self, _ctx: Ctx) -> Result<Vec<ShipAssignment>, StorageError> {
        Ok(self.inner.lock().state.ship_assignments.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use wf_core::{ContainerKind, MaxIterations};

    fn store(dir: &Path) -> WalStore {
        WalStore::open(dir.join("events.wal"), dir.join("snapshot.json")).unwrap()
    }

    #[tokio::test]
    async fn container_round_trips_through_add_and_find() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let container = Container::new(
            ContainerKind::Navigate,
            PlayerId::from("p1"),
            Default::default(),
            MaxIterations::Finite(5),
            3,
            0,
        );
        store.add(Ctx::default(), &container, "navigate").await.unwrap();

        let found = store.find(Ctx::default(), &container.id).await.unwrap().unwrap();
        assert_eq!(found.id, container.id);
        assert_eq!(found.status(), Status::Pending);
    }

    #[tokio::test]
    async fn assign_then_release_clears_active_lookup() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let ship = ShipSymbol::from("S1");
        let assignment =
            ShipAssignment::new(ship.clone(), PlayerId::from("p1"), ContainerId::new(), "navigate", 0);
        store.insert(Ctx::default(), assignment).await.unwrap();
        assert!(store.find_by_ship(Ctx::default(), &ship).await.unwrap().is_some());

        let released = store.release_by_ship(Ctx::default(), &ship, ReleaseReason::Completed, 10).await.unwrap();
        assert!(released);
        assert!(store.find_by_ship(Ctx::default(), &ship).await.unwrap().is_none());

        // Releasing an already-inactive ship is a no-op, not an error.
        let released_again =
            store.release_by_ship(Ctx::default(), &ship, ReleaseReason::Manual, 20).await.unwrap();
        assert!(!released_again);
    }

    #[tokio::test]
    async fn checkpoint_then_reopen_preserves_state() {
        let dir = tempdir().unwrap();
        {
            let store = store(dir.path());
            let container = Container::new(
                ContainerKind::Scout,
                PlayerId::from("p1"),
                Default::default(),
                MaxIterations::Infinite,
                3,
                0,
            );
            store.add(Ctx::default(), &container, "scout").await.unwrap();
            store.checkpoint().unwrap();
        }

        let reopened = store(dir.path());
        assert_eq!(reopened.all_containers().len(), 1);
    }

    #[tokio::test]
    async fn logs_are_returned_newest_first_and_respect_limit() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let container_id = ContainerId::new();
        let player = PlayerId::from("p1");
        for i in 0..3u64 {
            let entry = ContainerLogEntry::new(container_id, player.clone(), i * 10, LogLevel::Info, format!("m{i}"));
            store.log(Ctx::default(), entry).await.unwrap();
        }
        let logs = store.get(Ctx::default(), &container_id, &player, 2, None, None).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].message, "m2");
        assert_eq!(logs[1].message, "m1");
    }
}
