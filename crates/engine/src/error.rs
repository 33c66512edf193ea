// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;
use wf_core::{ContainerId, PlayerId, ShipSymbol};

#[derive(Debug, Error)]
pub enum AssignmentError {
    #[error("ship {ship} is already assigned to container {holder}")]
    AlreadyAssigned { ship: ShipSymbol, holder: ContainerId },
    #[error("ship {ship} is assigned to player {holder}, not {requester}")]
    PlayerMismatch { ship: ShipSymbol, holder: PlayerId, requester: PlayerId },
    #[error("{ship}: ship is locked by container {holder}, release requires {requester}")]
    StillLocked { ship: ShipSymbol, holder: ContainerId, requester: ContainerId },
    #[error(transparent)]
    Storage(#[from] wf_storage::StorageError),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("container {0} not found")]
    NotFound(ContainerId),
    #[error(transparent)]
    Container(#[from] wf_core::ContainerError),
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
    #[error(transparent)]
    Storage(#[from] wf_storage::StorageError),
}
