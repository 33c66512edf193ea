// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wayfarerd`: the fleet automation daemon. Accepts commands over a Unix
//! socket, runs each as a container against the game API, and holds
//! exclusive ship leases for the containers' lifetime.

pub mod config;
pub mod game_client;
pub mod ipc;
pub mod logging;
pub mod process;
pub mod shutdown;

pub use config::Config;
pub use game_client::{UnconfiguredGameApiClient, UnconfiguredShipPort};
pub use ipc::{CommandServer, IpcError};
pub use process::{ensure_state_dir, reconcile_after_restart, PidLock, ProcessError};
pub use shutdown::graceful_shutdown;
