// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! wf-adapters: the external collaborators a container body and the health
//! monitor depend on but do not own — the game API client, the ship state
//! port, and the per-[`ContainerKind`](wf_core::ContainerKind) command bodies
//! built on top of them.
//!
//! None of this crate decides *whether* a ship may run a command — that is
//! the assignment manager's job, upstream of here. This crate only knows how
//! to talk to the game and how to drive one iteration of one command kind.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod body;
pub mod bodies;
pub mod game;
pub mod ship_port;

pub use body::{BodyContext, BodyError, CommandBody};
pub use game::{FleetError, GameApiClient};
pub use ship_port::{NavStatus, RecoveryError, ShipPort, ShipState};

#[cfg(any(test, feature = "test-support"))]
pub mod fake;
