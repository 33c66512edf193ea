// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ties the WAL and snapshot together: periodic checkpointing during normal
//! operation, and startup recovery (load snapshot, replay the WAL tail).

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::snapshot::{Snapshot, SnapshotError};
use crate::state::MaterializedState;
use crate::wal::{Wal, WalError};

/// Loads the snapshot at `path` (if any) and folds in every WAL entry after
/// its `seq`, returning the reconstructed state and the sequence number it
/// now reflects. Used once, at daemon startup.
pub fn load_snapshot(snapshot_path: &Path, wal_path: &Path) -> Result<(MaterializedState, u64), CheckpointError> {
    let (mut state, seq) = match Snapshot::load(snapshot_path)? {
        Some(snap) => (snap.state, snap.seq),
        None => (MaterializedState::default(), 0),
    };

    let wal = Wal::open(wal_path, seq)?;
    let mut last_seq = seq;
    for entry in wal.entries_after(seq)? {
        state.apply(&entry.event);
        last_seq = last_seq.max(entry.seq);
    }
    Ok((state, last_seq))
}

#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Wal(#[from] WalError),
}

/// Periodically snapshots [`MaterializedState`] and truncates the WAL so a
/// restart does not need to replay the entire event history.
pub struct Checkpointer {
    snapshot_path: PathBuf,
}

impl Checkpointer {
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Self {
        Self { snapshot_path: snapshot_path.into() }
    }

    /// Writes a snapshot reflecting `state` as of `seq`, then truncates `wal`
    /// to entries after `seq`.
    pub fn checkpoint(&self, state: &MaterializedState, seq: u64, wal: &mut Wal) -> Result<(), CheckpointError> {
        let snapshot = Snapshot::new(seq, state.clone(), Utc::now());
        snapshot.write_atomically(&self.snapshot_path)?;
        wal.truncate_before(seq + 1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use tempfile::tempdir;
    use wf_core::ShipSymbol;

    #[test]
    fn load_snapshot_replays_wal_tail_after_empty_snapshot() {
        let dir = tempdir().unwrap();
        let wal_path = dir.path().join("events.wal");
        let snap_path = dir.path().join("snapshot.json");

        let mut wal = Wal::open(&wal_path, 0).unwrap();
        wal.append(&Event::ShipAssigned {
            assignment: wf_core::ShipAssignment::new(
                ShipSymbol::from("S1"),
                wf_core::PlayerId::from("p1"),
                wf_core::ContainerId::new(),
                "navigate",
                0,
            ),
        })
        .unwrap();
        wal.flush().unwrap();

        let (state, seq) = load_snapshot(&snap_path, &wal_path).unwrap();
        assert_eq!(seq, 1);
        assert_eq!(state.ship_assignments.len(), 1);
    }

    #[test]
    fn checkpoint_then_reload_matches_state() {
        let dir = tempdir().unwrap();
        let wal_path = dir.path().join("events.wal");
        let snap_path = dir.path().join("snapshot.json");

        let mut wal = Wal::open(&wal_path, 0).unwrap();
        let mut state = MaterializedState::default();
        let event = Event::ShipAssigned {
            assignment: wf_core::ShipAssignment::new(
                ShipSymbol::from("S1"),
                wf_core::PlayerId::from("p1"),
                wf_core::ContainerId::new(),
                "navigate",
                0,
            ),
        };
        let seq = wal.append(&event).unwrap();
        state.apply(&event);
        wal.flush().unwrap();

        let checkpointer = Checkpointer::new(&snap_path);
        checkpointer.checkpoint(&state, seq, &mut wal).unwrap();

        let (reloaded, reloaded_seq) = load_snapshot(&snap_path, &wal_path).unwrap();
        assert_eq!(reloaded_seq, seq);
        assert_eq!(reloaded.ship_assignments.len(), 1);
    }
}
