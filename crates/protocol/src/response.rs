// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire response type. Every response carries `status`; `container_id` and
//! `error` are populated situationally depending on the response kind.

use serde::{Deserialize, Serialize};
use wf_core::{ContainerId, Status as ContainerStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    Error,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<ContainerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_containers: Option<usize>,
    /// The container currently holding a ship's lease, for `ShipLockStatus`.
    /// Absent when the ship isn't locked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_holder: Option<ContainerId>,
    /// The holder's lifecycle status at the moment of the query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_status: Option<ContainerStatus>,
}

impl Response {
    /// A bare acknowledgement carrying no payload beyond `status`, e.g. for
    /// `Shutdown`.
    pub fn ok() -> Self {
        Self { status: Some(Status::Ok), ..Default::default() }
    }

    pub fn ok_container(container_id: ContainerId) -> Self {
        Self { status: Some(Status::Ok), container_id: Some(container_id), ..Default::default() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { status: Some(Status::Error), error: Some(message.into()), ..Default::default() }
    }

    pub fn health(version: impl Into<String>, active_containers: usize) -> Self {
        Self {
            status: Some(Status::Ok),
            version: Some(version.into()),
            active_containers: Some(active_containers),
            ..Default::default()
        }
    }

    /// A ship-lock query result. `lock_holder` is `None` when the ship is
    /// free. `lock_status` may be `None` even when `lock_holder` is `Some` if
    /// the holder's container isn't tracked in this process (e.g. a stale
    /// lease surviving a restart the registry hasn't reconciled yet).
    pub fn ship_lock(lock_holder: Option<ContainerId>, lock_status: Option<ContainerStatus>) -> Self {
        Self { status: Some(Status::Ok), lock_holder, lock_status, ..Default::default() }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Some(Status::Ok)
    }
}
