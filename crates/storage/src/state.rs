// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state folded from the WAL. This is the authoritative
//! in-memory projection the persistence port traits (`crate::port`) read and
//! write through; `apply` is the single place an [`Event`] becomes state.
//!
//! # Idempotency
//!
//! Every arm of `apply` must tolerate being invoked twice with the same
//! event, since startup may replay entries that were already folded into the
//! snapshot being recovered from. Inserts check `contains_key`; timestamped
//! overwrites only apply a container if it is not older than what is already
//! recorded.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wf_core::{Container, ContainerId, ContainerLogEntry, ShipAssignment, ShipSymbol};

use crate::event::Event;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub container: Container,
    pub command_type: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub containers: HashMap<ContainerId, ContainerRecord>,
    #[serde(default)]
    pub container_logs: Vec<ContainerLogEntry>,
    #[serde(default)]
    pub next_log_id: u64,
    /// Active assignments only, keyed by ship symbol — mirrors the unique
    /// partial index `ship_assignments (ship_symbol) WHERE active`.
    #[serde(default)]
    pub ship_assignments: HashMap<ShipSymbol, ShipAssignment>,
    /// Released rows, append-only, never mutated again after insertion.
    #[serde(default)]
    pub ship_assignment_history: Vec<ShipAssignment>,
}

impl MaterializedState {
    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::ContainerCreated { container, command_type } => {
                self.containers.entry(container.id).or_insert_with(|| ContainerRecord {
                    container: container.clone(),
                    command_type: command_type.clone(),
                });
            }
            Event::ContainerTransitioned { container } => {
                match self.containers.get_mut(&container.id) {
                    Some(record) if record.container.updated_at_ms() <= container.updated_at_ms() => {
                        record.container = container.clone();
                    }
                    Some(_) => {}
                    None => {
                        self.containers.insert(
                            container.id,
                            ContainerRecord { container: container.clone(), command_type: String::new() },
                        );
                    }
                }
            }
            Event::ContainerLogAppended { entry } => {
                if !self.container_logs.iter().any(|e| e.id == entry.id) {
                    self.container_logs.push(entry.clone());
                    self.next_log_id = self.next_log_id.max(entry.id + 1);
                }
            }
            Event::ShipAssigned { assignment } => {
                self.ship_assignments.insert(assignment.ship_symbol.clone(), assignment.clone());
            }
            Event::ShipReleased { ship_symbol, released_at_ms, reason } => {
                if let Some(mut assignment) = self.ship_assignments.remove(ship_symbol) {
                    assignment.release(*reason, *released_at_ms);
                    self.ship_assignment_history.push(assignment);
                }
            }
            Event::Shutdown => {}
        }
    }

    pub fn next_log_id(&mut self) -> u64 {
        let id = self.next_log_id;
        self.next_log_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wf_core::{ContainerKind, MaxIterations, PlayerId, ReleaseReason};

    fn container() -> Container {
        Container::new(
            ContainerKind::Navigate,
            PlayerId::from("p1"),
            Default::default(),
            MaxIterations::Finite(5),
            3,
            0,
        )
    }

    #[test]
    fn apply_container_created_is_idempotent() {
        let mut state = MaterializedState::default();
        let c = container();
        let event = Event::ContainerCreated { container: c.clone(), command_type: "navigate".into() };
        state.apply(&event);
        state.apply(&event);
        assert_eq!(state.containers.len(), 1);
    }

    #[test]
    fn apply_transitioned_ignores_stale_replay() {
        let mut state = MaterializedState::default();
        let mut c = container();
        state.apply(&Event::ContainerCreated { container: c.clone(), command_type: "navigate".into() });

        c.start(10).unwrap();
        state.apply(&Event::ContainerTransitioned { container: c.clone() });
        assert_eq!(state.containers[&c.id].container.status(), wf_core::Status::Running);

        // Replaying the Pending snapshot event afterward must not roll back state.
        let stale = container();
        state.apply(&Event::ContainerTransitioned { container: stale });
        assert_eq!(state.containers[&c.id].container.status(), wf_core::Status::Running);
    }

    #[test]
    fn ship_assign_then_release_moves_to_history() {
        let mut state = MaterializedState::default();
        let ship = ShipSymbol::from("S1");
        let assignment = ShipAssignment::new(ship.clone(), PlayerId::from("p1"), ContainerId::new(), "navigate", 0);
        state.apply(&Event::ShipAssigned { assignment });
        assert!(state.ship_assignments.contains_key(&ship));

        state.apply(&Event::ShipReleased { ship_symbol: ship.clone(), released_at_ms: 5, reason: ReleaseReason::Completed });
        assert!(!state.ship_assignments.contains_key(&ship));
        assert_eq!(state.ship_assignment_history.len(), 1);

        // Idempotent: releasing again (replay) is a no-op.
        state.apply(&Event::ShipReleased { ship_symbol: ship, released_at_ms: 5, reason: ReleaseReason::Completed });
        assert_eq!(state.ship_assignment_history.len(), 1);
    }
}
