// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ship assignment: an exclusive lease of one in-game ship to one container.

use crate::ids::{ContainerId, PlayerId, ShipSymbol};

/// Why an assignment was released. Recorded on the row and never mutated
/// again afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseReason {
    Completed,
    Failed,
    Stopped,
    Orphaned,
    DaemonShutdown,
    StaleTimeout,
    Manual,
}

crate::simple_display! {
    ReleaseReason {
        Completed => "completed",
        Failed => "failed",
        Stopped => "stopped",
        Orphaned => "orphaned",
        DaemonShutdown => "daemon_shutdown",
        StaleTimeout => "stale_timeout",
        Manual => "manual",
    }
}

/// An exclusive lease of `ship_symbol` to `container_id`. At most one row
/// with `active=true` exists per ship symbol at any time.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShipAssignment {
    pub ship_symbol: ShipSymbol,
    pub player_id: PlayerId,
    pub container_id: ContainerId,
    /// Free-form operation label, e.g. "navigate", "mine".
    pub operation: String,
    pub assigned_at_ms: u64,
    pub released_at_ms: Option<u64>,
    pub release_reason: Option<ReleaseReason>,
    pub active: bool,
}

impl ShipAssignment {
    pub fn new(
        ship_symbol: ShipSymbol,
        player_id: PlayerId,
        container_id: ContainerId,
        operation: impl Into<String>,
        now_ms: u64,
    ) -> Self {
        Self {
            ship_symbol,
            player_id,
            container_id,
            operation: operation.into(),
            assigned_at_ms: now_ms,
            released_at_ms: None,
            release_reason: None,
            active: true,
        }
    }

    /// `(now − assigned_at) > stale_timeout_ms ∧ active`.
    pub fn is_stale(&self, now_ms: u64, stale_timeout_ms: u64) -> bool {
        self.active && now_ms.saturating_sub(self.assigned_at_ms) > stale_timeout_ms
    }

    /// Sets `released_at`, `release_reason`, and flips `active` to false.
    /// Idempotent only in the sense that calling it twice simply overwrites
    /// the release fields — callers (the assignment manager) are responsible
    /// for never calling this on an already-inactive row.
    pub fn release(&mut self, reason: ReleaseReason, now_ms: u64) {
        self.released_at_ms = Some(now_ms);
        self.release_reason = Some(reason);
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(now_ms: u64) -> ShipAssignment {
        ShipAssignment::new(
            ShipSymbol::from("SHIP-A"),
            PlayerId::from("p1"),
            ContainerId::new(),
            "navigate",
            now_ms,
        )
    }

    #[test]
    fn release_sets_reason_and_flips_active() {
        let mut a = assignment(0);
        a.release(ReleaseReason::Completed, 10);
        assert!(!a.active);
        assert_eq!(a.released_at_ms, Some(10));
        assert_eq!(a.release_reason, Some(ReleaseReason::Completed));
    }

    #[test]
    fn staleness_requires_active_and_past_timeout() {
        let mut a = assignment(0);
        assert!(!a.is_stale(100, 200), "within timeout");
        assert!(a.is_stale(300, 200), "past timeout while active");
        a.release(ReleaseReason::Manual, 50);
        assert!(!a.is_stale(300, 200), "released rows are never stale");
    }
}
