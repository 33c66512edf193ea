// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wayfarerd`: the fleet automation daemon binary. Parses configuration,
//! recovers whatever a previous instance left behind, then serves commands
//! until a termination signal starts the graceful shutdown sequence.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use wf_core::{Clock, SystemClock};
use wf_daemon::{ensure_state_dir, graceful_shutdown, reconcile_after_restart, CommandServer, Config, PidLock};
use wf_engine::{AssignmentManager, HealthMonitor, LogSink, Registry};
use wf_storage::WalStore;

#[tokio::main]
async fn main() {
    let config = Config::parse();
    let state_dir = config.resolved_state_dir();

    if let Err(e) = ensure_state_dir(&state_dir) {
        eprintln!("failed to create state directory {}: {e}", state_dir.display());
        std::process::exit(1);
    }

    let _log_guard = wf_daemon::logging::init(&state_dir);

    let _pid_lock = match PidLock::acquire(config.pid_path()) {
        Ok(lock) => lock,
        Err(e) => {
            error!(error = %e, "failed to acquire PID lock");
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config, state_dir).await {
        error!(error = %e, "wayfarerd exited with an error");
        std::process::exit(1);
    }
}

async fn run(config: Config, state_dir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let clock = SystemClock;
    let now_ms = clock.epoch_ms();

    let store = Arc::new(WalStore::open(config.wal_path(), config.snapshot_path())?);
    let assignments = Arc::new(AssignmentManager::new(store.clone()));
    let logs = Arc::new(LogSink::new(store.clone(), config.log_dedup_ms));
    let registry = Arc::new(Registry::new(store.clone(), assignments.clone(), logs.clone(), clock));

    let reconciled = reconcile_after_restart(store.as_ref(), &assignments, &logs, now_ms).await?;
    info!(reconciled, state_dir = %state_dir.display(), "wayfarerd starting");

    let game_client: Arc<dyn wf_adapters::GameApiClient> = Arc::new(wf_daemon::UnconfiguredGameApiClient);
    let ship_port: Arc<dyn wf_adapters::ShipPort> = Arc::new(wf_daemon::UnconfiguredShipPort);

    let health_monitor = Arc::new(HealthMonitor::new(
        store.clone(),
        assignments.clone(),
        registry.clone(),
        ship_port,
        logs.clone(),
        config.health_monitor_config(),
    ));

    let shutdown_requested = Arc::new(Notify::new());

    let server = Arc::new(CommandServer::new(
        config.socket_path(),
        registry.clone(),
        assignments.clone(),
        game_client,
        shutdown_requested.clone(),
        env!("CARGO_PKG_VERSION"),
    ));
    let listener = server.bind()?;

    let accept_shutdown = CancellationToken::new();
    let second_signal = CancellationToken::new();

    let serve_handle = {
        let server = server.clone();
        let accept_shutdown = accept_shutdown.clone();
        tokio::spawn(async move { server.serve(listener, accept_shutdown).await })
    };

    let health_handle = {
        let health_monitor = health_monitor.clone();
        let accept_shutdown = accept_shutdown.clone();
        let interval = std::time::Duration::from_millis(config.health_interval_ms);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        let (_, report) = health_monitor.tick(SystemClock.epoch_ms()).await;
                        if !report.stuck_ships.is_empty() || !report.abandoned.is_empty() {
                            info!(
                                stuck = report.stuck_ships.len(),
                                recovered = report.recovered.len(),
                                abandoned = report.abandoned.len(),
                                "health monitor tick"
                            );
                        }
                    }
                    _ = accept_shutdown.cancelled() => return,
                }
            }
        })
    };

    let checkpoint_handle = {
        let store = store.clone();
        let accept_shutdown = accept_shutdown.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(std::time::Duration::from_secs(60)) => {
                        if let Err(e) = store.checkpoint() {
                            error!(error = %e, "periodic checkpoint failed");
                        }
                    }
                    _ = accept_shutdown.cancelled() => return,
                }
            }
        })
    };

    println!("READY");
    info!(socket = %config.socket_path().display(), "wayfarerd ready");

    wait_for_termination(&second_signal, &shutdown_requested).await?;

    let shutdown_timeout = config.shutdown_timeout();
    graceful_shutdown(
        &accept_shutdown,
        &second_signal,
        &registry,
        &assignments,
        shutdown_timeout,
        &config.socket_path(),
        SystemClock.epoch_ms(),
    )
    .await;

    let _ = store.checkpoint();
    let _ = serve_handle.await;
    let _ = health_handle.await;
    let _ = checkpoint_handle.await;

    Ok(())
}

/// Waits for the first SIGINT/SIGTERM or an IPC `Shutdown` request, then
/// keeps listening for OS signals in the background so a second one cancels
/// `second_signal` and escalates the in-progress graceful shutdown to an
/// immediate force-stop.
async fn wait_for_termination(
    second_signal: &CancellationToken,
    shutdown_requested: &Notify,
) -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, starting graceful shutdown"),
        _ = sigint.recv() => info!("received SIGINT, starting graceful shutdown"),
        _ = shutdown_requested.notified() => info!("received shutdown request over IPC, starting graceful shutdown"),
    }

    let second = second_signal.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
        info!("received second termination signal, forcing shutdown");
        second.cancel();
    });

    Ok(())
}
