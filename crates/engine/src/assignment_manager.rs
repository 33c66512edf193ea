// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ship-assignment manager. Enforces the exclusive-lease invariant
//! (one active assignment per ship symbol) on top of the dumb CRUD exposed by
//! [`wf_storage::ShipAssignments`]; the storage port itself does not know
//! about "already assigned" or "wrong player" — those rules live here.

use std::collections::HashSet;
use std::sync::Arc;

use wf_core::{ContainerId, PlayerId, ReleaseReason, ShipAssignment, ShipSymbol};
use wf_storage::{Ctx, ShipAssignments};

use crate::error::AssignmentError;

pub struct AssignmentManager {
    store: Arc<dyn ShipAssignments>,
}

impl AssignmentManager {
    pub fn new(store: Arc<dyn ShipAssignments>) -> Self {
        Self { store }
    }

    /// Leases `ship` to `container_id` for `player_id`. Fails without
    /// mutating anything if the ship is already actively leased to a
    /// different container, or to a different player.
    pub async fn assign(
        &self,
        ship: ShipSymbol,
        player_id: PlayerId,
        container_id: ContainerId,
        operation: impl Into<String>,
        now_ms: u64,
    ) -> Result<(), AssignmentError> {
        if let Some(existing) = self.store.find_by_ship(Ctx::default(), &ship).await? {
            if existing.active {
                if existing.container_id != container_id {
                    return Err(AssignmentError::AlreadyAssigned {
                        ship,
                        holder: existing.container_id,
                    });
                }
                if existing.player_id != player_id {
                    return Err(AssignmentError::PlayerMismatch {
                        ship,
                        holder: existing.player_id,
                        requester: player_id,
                    });
                }
                return Ok(());
            }
        }
        let assignment = ShipAssignment::new(ship, player_id, container_id, operation, now_ms);
        self.store.insert(Ctx::default(), assignment).await?;
        Ok(())
    }

    /// Releases `ship`'s active lease. Returns `Ok(())` whether or not a row
    /// was active — callers that already know the container owns the lease
    /// (completion/failure/stop paths) don't need to special-case "already
    /// gone". Use [`Self::release_owned`] when the caller must prove it is
    /// the current holder before releasing.
    pub async fn release(
        &self,
        ship: &ShipSymbol,
        reason: ReleaseReason,
        now_ms: u64,
    ) -> Result<bool, AssignmentError> {
        Ok(self.store.release_by_ship(Ctx::default(), ship, reason, now_ms).await?)
    }

    /// Like [`Self::release`] but verifies `container_id` is the current
    /// holder first, returning [`AssignmentError::StillLocked`] otherwise.
    pub async fn release_owned(
        &self,
        ship: &ShipSymbol,
        container_id: &ContainerId,
        reason: ReleaseReason,
        now_ms: u64,
    ) -> Result<(), AssignmentError> {
        match self.store.find_by_ship(Ctx::default(), ship).await? {
            Some(existing) if existing.active && &existing.container_id == container_id => {
                self.store.release_by_ship(Ctx::default(), ship, reason, now_ms).await?;
                Ok(())
            }
            Some(existing) if existing.active => Err(AssignmentError::StillLocked {
                ship: ship.clone(),
                holder: existing.container_id,
                requester: container_id.clone(),
            }),
            _ => Ok(()),
        }
    }

    pub async fn release_by_container(
        &self,
        container_id: &ContainerId,
        reason: ReleaseReason,
        now_ms: u64,
    ) -> Result<usize, AssignmentError> {
        Ok(self.store.release_by_container(Ctx::default(), container_id, reason, now_ms).await?)
    }

    pub async fn release_all(
        &self,
        reason: ReleaseReason,
        now_ms: u64,
    ) -> Result<usize, AssignmentError> {
        Ok(self.store.release_all_active(Ctx::default(), reason, now_ms).await?)
    }

    pub async fn find(&self, ship: &ShipSymbol) -> Result<Option<ShipAssignment>, AssignmentError> {
        Ok(self.store.find_by_ship(Ctx::default(), ship).await?)
    }

    pub async fn list_active(&self) -> Result<Vec<ShipAssignment>, wf_storage::StorageError> {
        self.store.list_active(Ctx::default()).await
    }

    /// Releases every active assignment whose container is not among
    /// `live_container_ids` with reason `orphaned`. Returns the count.
    pub async fn clean_orphans(
        &self,
        live_container_ids: &HashSet<ContainerId>,
        now_ms: u64,
    ) -> Result<usize, AssignmentError> {
        let mut released = 0usize;
        for assignment in self.store.list_active(Ctx::default()).await? {
            if !live_container_ids.contains(&assignment.container_id)
                && self
                    .store
                    .release_by_ship(
                        Ctx::default(),
                        &assignment.ship_symbol,
                        ReleaseReason::Orphaned,
                        now_ms,
                    )
                    .await?
            {
                released += 1;
            }
        }
        Ok(released)
    }

    /// Releases every active assignment older than `stale_timeout_ms` with
    /// reason `stale_timeout`. Returns the count.
    pub async fn force_release_stale(
        &self,
        stale_timeout_ms: u64,
        now_ms: u64,
    ) -> Result<usize, AssignmentError> {
        let mut released = 0usize;
        for assignment in self.store.list_active(Ctx::default()).await? {
            if assignment.is_stale(now_ms, stale_timeout_ms)
                && self
                    .store
                    .release_by_ship(
                        Ctx::default(),
                        &assignment.ship_symbol,
                        ReleaseReason::StaleTimeout,
                        now_ms,
                    )
                    .await?
            {
                released += 1;
            }
        }
        Ok(released)
    }
}

#[cfg(test)]
#[path = "assignment_manager_tests.rs"]
mod tests;
