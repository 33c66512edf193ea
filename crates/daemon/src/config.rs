// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration. Every setting is resolvable from a CLI flag, falling
//! back to an environment variable, falling back to a default derived from
//! the XDG state directory — in that priority order.

use std::path::PathBuf;

use clap::Parser;

use wf_engine::HealthMonitorConfig;

#[derive(Debug, Clone, Parser)]
#[command(name = "wayfarerd", about = "Wayfarer fleet automation daemon")]
pub struct Config {
    /// Directory holding the WAL, snapshot, socket, and PID file.
    #[arg(long, env = "WAYFARERD_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    #[arg(long, env = "WAYFARERD_HEALTH_INTERVAL_MS", default_value_t = 30_000)]
    pub health_interval_ms: u64,

    #[arg(long, env = "WAYFARERD_RECOVERY_TIMEOUT_MS", default_value_t = 300_000)]
    pub recovery_timeout_ms: u64,

    #[arg(long, env = "WAYFARERD_MAX_RECOVERY_ATTEMPTS", default_value_t = 3)]
    pub max_recovery_attempts: u32,

    #[arg(long, env = "WAYFARERD_LOG_DEDUP_MS", default_value_t = 5_000)]
    pub log_dedup_ms: u64,

    #[arg(long, env = "WAYFARERD_SHUTDOWN_TIMEOUT_MS", default_value_t = 30_000)]
    pub shutdown_timeout_ms: u64,

    /// Game API bearer token. Required to actually reach the game; absent in
    /// tests, which run entirely against fakes.
    #[arg(long, env = "SPACETRADERS_TOKEN", hide_env_values = true)]
    pub spacetraders_token: Option<String>,
}

impl Config {
    /// Resolves `state_dir`, falling back to `$XDG_STATE_HOME/wayfarer` (or
    /// the platform equivalent) when unset.
    pub fn resolved_state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(|| {
            dirs::data_dir().unwrap_or_else(std::env::temp_dir).join("wayfarer")
        })
    }

    pub fn socket_path(&self) -> PathBuf {
        self.resolved_state_dir().join("daemon.sock")
    }

    pub fn pid_path(&self) -> PathBuf {
        self.resolved_state_dir().join("daemon.pid")
    }

    pub fn wal_path(&self) -> PathBuf {
        self.resolved_state_dir().join("wal.log")
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.resolved_state_dir().join("snapshot.json")
    }

    pub fn shutdown_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn health_monitor_config(&self) -> HealthMonitorConfig {
        HealthMonitorConfig {
            check_interval_ms: self.health_interval_ms,
            recovery_timeout_ms: self.recovery_timeout_ms,
            max_recovery_attempts: self.max_recovery_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_state_dir_wins_over_the_xdg_default() {
        let cfg = Config {
            state_dir: Some(PathBuf::from("/tmp/explicit")),
            health_interval_ms: 30_000,
            recovery_timeout_ms: 300_000,
            max_recovery_attempts: 3,
            log_dedup_ms: 5_000,
            shutdown_timeout_ms: 30_000,
            spacetraders_token: None,
        };
        assert_eq!(cfg.resolved_state_dir(), PathBuf::from("/tmp/explicit"));
        assert_eq!(cfg.socket_path(), PathBuf::from("/tmp/explicit/daemon.sock"));
    }
}
