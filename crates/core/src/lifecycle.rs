// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical lifecycle status transitions + timestamps.
//!
//! Reused as-is by containers (with container-specific extensions layered on
//! top in [`crate::container`]) and, in principle, by any other entity that
//! needs the same Pending/Running/terminal shape.

use thiserror::Error;

/// A lifecycle status. Completed, Failed, and Stopped are terminal: only
/// `reset_for_restart` transitions out of them, and only back to Pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Running,
    Completed,
    Failed,
    Stopping,
    Stopped,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Completed | Status::Failed | Status::Stopped)
    }
}

crate::simple_display! {
    Status {
        Pending => "PENDING",
        Running => "RUNNING",
        Completed => "COMPLETED",
        Failed => "FAILED",
        Stopping => "STOPPING",
        Stopped => "STOPPED",
    }
}

/// A lifecycle operation, named for error messages and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Start,
    Complete,
    Fail,
    Stop,
    MarkStopped,
    ResetForRestart,
}

crate::simple_display! {
    Operation {
        Start => "start",
        Complete => "complete",
        Fail => "fail",
        Stop => "stop",
        MarkStopped => "mark_stopped",
        ResetForRestart => "reset_for_restart",
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// `op` is not a legal transition from `from`. State is left untouched.
    #[error("cannot {op} from {from}")]
    InvalidTransition { from: Status, op: Operation },
}

/// Canonical lifecycle state: status plus the timestamps and error that travel
/// with it. All timestamps are epoch milliseconds from a [`crate::Clock`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Lifecycle {
    status: Status,
    created_at_ms: u64,
    updated_at_ms: u64,
    started_at_ms: Option<u64>,
    stopped_at_ms: Option<u64>,
    last_error: Option<String>,
}

impl Lifecycle {
    /// A freshly created, Pending lifecycle.
    pub fn new(now_ms: u64) -> Self {
        Self {
            status: Status::Pending,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
            started_at_ms: None,
            stopped_at_ms: None,
            last_error: None,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    pub fn updated_at_ms(&self) -> u64 {
        self.updated_at_ms
    }

    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    pub fn stopped_at_ms(&self) -> Option<u64> {
        self.stopped_at_ms
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    /// (stopped_at or now) − started_at, zero if never started.
    pub fn runtime_duration_ms(&self, now_ms: u64) -> u64 {
        match self.started_at_ms {
            None => 0,
            Some(started) => self.stopped_at_ms.unwrap_or(now_ms).saturating_sub(started),
        }
    }

    fn touch(&mut self, now_ms: u64) {
        self.updated_at_ms = now_ms;
    }

    fn invalid(&self, op: Operation) -> LifecycleError {
        LifecycleError::InvalidTransition { from: self.status, op }
    }

    /// Pending → Running. Sets `started_at` (immutable thereafter).
    pub fn start(&mut self, now_ms: u64) -> Result<(), LifecycleError> {
        if self.status != Status::Pending {
            return Err(self.invalid(Operation::Start));
        }
        self.status = Status::Running;
        self.started_at_ms = Some(now_ms);
        self.touch(now_ms);
        Ok(())
    }

    /// Running → Completed.
    pub fn complete(&mut self, now_ms: u64) -> Result<(), LifecycleError> {
        if self.status != Status::Running {
            return Err(self.invalid(Operation::Complete));
        }
        self.status = Status::Completed;
        self.stopped_at_ms = Some(now_ms);
        self.touch(now_ms);
        Ok(())
    }

    /// Running → Failed. Records `err` as the last error.
    pub fn fail(&mut self, err: impl Into<String>, now_ms: u64) -> Result<(), LifecycleError> {
        if self.status != Status::Running {
            return Err(self.invalid(Operation::Fail));
        }
        self.status = Status::Failed;
        self.stopped_at_ms = Some(now_ms);
        self.last_error = Some(err.into());
        self.touch(now_ms);
        Ok(())
    }

    /// Pending|Running → Stopping. Does not itself set `stopped_at`; that
    /// happens on `mark_stopped`.
    pub fn stop(&mut self, now_ms: u64) -> Result<(), LifecycleError> {
        if !matches!(self.status, Status::Pending | Status::Running) {
            return Err(self.invalid(Operation::Stop));
        }
        self.status = Status::Stopping;
        self.touch(now_ms);
        Ok(())
    }

    /// Stopping → Stopped.
    pub fn mark_stopped(&mut self, now_ms: u64) -> Result<(), LifecycleError> {
        if self.status != Status::Stopping {
            return Err(self.invalid(Operation::MarkStopped));
        }
        self.status = Status::Stopped;
        self.stopped_at_ms = Some(now_ms);
        self.touch(now_ms);
        Ok(())
    }

    /// Pending → Pending (no-op besides touching `updated_at`), or
    /// Completed|Failed|Stopped → Pending. Clears `last_error`. Restart-budget
    /// accounting is a container-level concern layered on top of this.
    pub fn reset_for_restart(&mut self, now_ms: u64) -> Result<(), LifecycleError> {
        if self.status != Status::Pending && !self.status.is_terminal() {
            return Err(self.invalid(Operation::ResetForRestart));
        }
        self.status = Status::Pending;
        self.started_at_ms = None;
        self.stopped_at_ms = None;
        self.last_error = None;
        self.touch(now_ms);
        Ok(())
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
