// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain events the WAL records. `MaterializedState::apply` folds a stream of
//! these into the authoritative in-memory state; replaying the same stream
//! twice must always produce the same state.

use serde::{Deserialize, Serialize};
use wf_core::{Container, ContainerLogEntry, ReleaseReason, ShipAssignment, ShipSymbol};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Event {
    ContainerCreated { container: Container, command_type: String },
    /// Covers every lifecycle transition and iteration-counter change: the
    /// full container is re-recorded rather than a field-level diff, mirroring
    /// how the core itself treats a container as one owned unit.
    ContainerTransitioned { container: Container },
    ContainerLogAppended { entry: ContainerLogEntry },
    ShipAssigned { assignment: ShipAssignment },
    ShipReleased { ship_symbol: ShipSymbol, released_at_ms: u64, reason: ReleaseReason },
    /// Control event: marks a clean daemon shutdown so the next startup's WAL
    /// replay can recognize where the prior run ended.
    Shutdown,
}
