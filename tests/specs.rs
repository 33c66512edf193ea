// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end specs driving the real `wayfarerd` and `wayfarer` binaries
//! over their actual Unix socket, rather than exercising crate internals.

use std::path::{Path, PathBuf};
use std::process::{Child, Command as StdCommand};
use std::time::{Duration, Instant};

use assert_cmd::cargo::cargo_bin;
use serial_test::serial;
use tempfile::TempDir;

struct Daemon {
    child: Child,
    state_dir: TempDir,
}

impl Daemon {
    fn start() -> Self {
        let state_dir = TempDir::new().expect("tempdir");
        let child = StdCommand::new(cargo_bin("wayfarerd"))
            .env("WAYFARERD_STATE_DIR", state_dir.path())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .spawn()
            .expect("spawn wayfarerd");
        let daemon = Self { child, state_dir };
        daemon.wait_until_ready();
        daemon
    }

    fn state_dir(&self) -> &Path {
        self.state_dir.path()
    }

    fn wait_until_ready(&self) {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if self.wayfarer(&["status"]).status().map(|s| s.success()).unwrap_or(false) {
                return;
            }
            if Instant::now() >= deadline {
                panic!("wayfarerd did not become ready within 10s");
            }
            std::thread::sleep(Duration::from_millis(100));
        }
    }

    fn wayfarer(&self, args: &[&str]) -> StdCommand {
        let mut cmd = StdCommand::new(cargo_bin("wayfarer"));
        cmd.env("WAYFARERD_STATE_DIR", self.state_dir());
        cmd.args(args);
        cmd
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.wayfarer(&["stop"]).status();
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Ok(Some(_)) = self.child.try_wait() {
                return;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn pid_file(state_dir: &Path) -> PathBuf {
    state_dir.join("daemon.pid")
}

#[test]
#[serial]
fn health_check_reports_ok_once_the_daemon_is_ready() {
    let daemon = Daemon::start();
    let output = daemon.wayfarer(&["status"]).output().expect("run wayfarer status");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("active_containers"));
}

#[test]
#[serial]
fn navigate_returns_a_container_id_that_status_can_query() {
    let daemon = Daemon::start();
    let output = daemon
        .wayfarer(&["navigate", "player-1", "SHIP-1", "X1-A1"])
        .output()
        .expect("run wayfarer navigate");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let container_id = String::from_utf8_lossy(&output.stdout).trim().to_string();
    assert!(container_id.starts_with("ctr-"), "unexpected container id: {container_id}");

    let status_output = daemon
        .wayfarer(&["container-status", &container_id])
        .output()
        .expect("run wayfarer container-status");
    assert!(status_output.status.success());
}

#[test]
#[serial]
fn a_ship_already_claimed_by_one_container_rejects_a_second_assignment() {
    let daemon = Daemon::start();

    let first = daemon
        .wayfarer(&["mine", "player-1", "SHIP-7"])
        .output()
        .expect("run first mine");
    assert!(first.status.success(), "stderr: {}", String::from_utf8_lossy(&first.stderr));

    let second = daemon
        .wayfarer(&["mine", "player-1", "SHIP-7"])
        .output()
        .expect("run second mine");
    assert!(!second.status.success(), "second claim on the same ship should have been rejected");
    assert_eq!(second.status.code(), Some(3));
}

#[test]
#[serial]
fn stop_terminates_the_daemon_and_removes_its_pid_file() {
    let daemon = Daemon::start();
    let pid_path = pid_file(daemon.state_dir());
    assert!(pid_path.exists());

    let stop_output = daemon.wayfarer(&["stop"]).output().expect("run wayfarer stop");
    assert!(stop_output.status.success());

    let deadline = Instant::now() + Duration::from_secs(5);
    while pid_path.exists() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(50));
    }
    assert!(!pid_path.exists(), "PID file should be removed once the daemon exits");

    let status_after_stop = daemon.wayfarer(&["status"]).output().expect("run wayfarer status");
    assert!(!status_after_stop.status.success());
    assert_eq!(status_after_stop.status.code(), Some(2));
}
