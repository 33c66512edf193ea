// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wayfarer`: the command-line client for `wayfarerd`.

pub mod client;
pub mod commands;
pub mod exit_error;
pub mod paths;

pub use client::DaemonClient;
pub use exit_error::ExitError;
