// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifiers used across the daemon core.
//!
//! [`ContainerId`] is minted by the daemon itself and uses the
//! [`crate::define_id!`] inline-buffer pattern. [`PlayerId`] and [`ShipSymbol`]
//! name entities owned by the external game service, so they wrap caller-supplied
//! strings rather than being randomly generated.

use crate::define_id;
use std::fmt;

define_id! {
    /// Identifies one container: an isolated, asynchronously executing unit of
    /// background work tracked by the daemon.
    pub struct ContainerId("ctr-");
}

/// An account on the game service. Scopes every ship, container, and assignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A ship's callsign in the game, e.g. `"VOYAGER-1"`. Opaque to the core beyond
/// equality and ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ShipSymbol(pub String);

impl ShipSymbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShipSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ShipSymbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ShipSymbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}
