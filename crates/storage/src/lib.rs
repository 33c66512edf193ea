// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! wf-storage: the persistence port and its shipped
//! implementation — an append-only WAL of domain events, a materialized
//! state folded from it, and periodic snapshot checkpointing.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod checkpoint;
mod error;
mod event;
mod migration;
mod port;
mod snapshot;
mod state;
mod store;
mod wal;

pub use checkpoint::{load_snapshot, CheckpointError, Checkpointer};
pub use error::StorageError;
pub use event::Event;
pub use migration::{Migration, MigrationError, MigrationRegistry};
pub use port::{ContainerFilter, ContainerLogs, Containers, Ctx, ShipAssignments};
pub use snapshot::{Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use state::{ContainerRecord, MaterializedState};
pub use store::WalStore;
pub use wal::{Wal, WalEntry, WalError};
