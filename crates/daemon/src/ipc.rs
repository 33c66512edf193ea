// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The IPC command server — a Unix-socket listener speaking the
//! length-prefixed framing from `wf-protocol`, dispatching each request to
//! the registry and assignment manager and replying immediately once the
//! container exists. `Shutdown` is the one request that doesn't touch the
//! registry: it notifies the daemon's main loop, which owns the actual
//! graceful-shutdown sequence.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use wf_adapters::GameApiClient;
use wf_core::{Clock, ContainerKind, MaxIterations, Metadata, MetadataValue};
use wf_engine::{AssignmentManager, Registry};
use wf_protocol::{read_frame, write_frame, Request, Response};

#[derive(Debug, Error)]
pub enum IpcError {
    #[error("socket parent directory does not exist: {0}")]
    MissingParentDir(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub struct CommandServer<C: Clock + 'static> {
    socket_path: PathBuf,
    registry: Arc<Registry<C>>,
    assignments: Arc<AssignmentManager>,
    game_client: Arc<dyn GameApiClient>,
    shutdown_requested: Arc<Notify>,
    version: String,
}

impl<C: Clock + 'static> CommandServer<C> {
    pub fn new(
        socket_path: PathBuf,
        registry: Arc<Registry<C>>,
        assignments: Arc<AssignmentManager>,
        game_client: Arc<dyn GameApiClient>,
        shutdown_requested: Arc<Notify>,
        version: impl Into<String>,
    ) -> Self {
        Self { socket_path, registry, assignments, game_client, shutdown_requested, version: version.into() }
    }

    /// Binds the listener, applying the daemon's startup checks. Does not accept
    /// connections yet — call [`Self::serve`] with the bound listener.
    pub fn bind(&self) -> Result<UnixListener, IpcError> {
        let parent = self.socket_path.parent().filter(|p| p.exists());
        let Some(_parent) = parent else {
            return Err(IpcError::MissingParentDir(
                self.socket_path.parent().map(Path::to_path_buf).unwrap_or_default(),
            ));
        };
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }
        let listener = UnixListener::bind(&self.socket_path)?;
        std::fs::set_permissions(&self.socket_path, std::fs::Permissions::from_mode(0o600))?;
        Ok(listener)
    }

    /// Accepts connections until `shutdown` is cancelled.
    pub async fn serve(self: Arc<Self>, listener: UnixListener, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("command server stopped accepting connections");
                    return;
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, _addr)) => {
                            let this = self.clone();
                            tokio::spawn(async move { this.handle_connection(stream).await });
                        }
                        Err(e) => warn!(error = %e, "failed to accept connection"),
                    }
                }
            }
        }
    }

    async fn handle_connection(&self, mut stream: UnixStream) {
        loop {
            let request: Request = match read_frame(&mut stream).await {
                Ok(Some(req)) => req,
                Ok(None) => return,
                Err(e) => {
                    warn!(error = %e, "malformed request frame");
                    return;
                }
            };
            let response = self.dispatch(request).await;
            if write_frame(&mut stream, &response).await.is_err() {
                return;
            }
        }
    }

    async fn dispatch(&self, request: Request) -> Response {
        match request {
            Request::HealthCheck => {
                Response::health(self.version.clone(), self.registry.live_container_ids().len())
            }
            Request::ContainerStatus { container_id } => match self.registry.query(&container_id) {
                Some(container) => Response::ok_container(container.id),
                None => Response::error(format!("container {container_id} not found")),
            },
            Request::ShipLockStatus { ship_symbol } => {
                // Read-only: answered straight from the assignment manager, never
                // routed through the registry's mutating create-and-start path.
                match self.assignments.find(&ship_symbol).await {
                    Ok(Some(assignment)) => {
                        let status = self.registry.query(&assignment.container_id).map(|c| c.status());
                        Response::ship_lock(Some(assignment.container_id), status)
                    }
                    Ok(None) => Response::ship_lock(None, None),
                    Err(e) => Response::error(e.to_string()),
                }
            }
            Request::Shutdown => {
                self.shutdown_requested.notify_one();
                Response::ok()
            }
            other => self.dispatch_command(other).await,
        }
    }

    async fn dispatch_command(&self, request: Request) -> Response {
        let Some(player_id) = request.player_id().cloned() else {
            return Response::error("request carries no player id");
        };
        let ship_symbols = request.ship_symbols();

        let (kind, metadata, operation): (ContainerKind, Metadata, &str) = match &request {
            Request::Navigate { waypoint, .. } => {
                let mut m = Metadata::new();
                m.insert("waypoint".into(), MetadataValue::Str(waypoint.clone()));
                (ContainerKind::Navigate, m, "navigate")
            }
            Request::Scout { params, .. } => (ContainerKind::Scout, params.clone(), "scout"),
            Request::Mine { .. } => (ContainerKind::Mine, Metadata::new(), "mine"),
            Request::Trade { .. } => (ContainerKind::Trade, Metadata::new(), "trade"),
            Request::Refuel { .. } => (ContainerKind::Refuel, Metadata::new(), "refuel"),
            Request::Deliver { contract_id, .. } => {
                let mut m = Metadata::new();
                m.insert("contract_id".into(), MetadataValue::Str(contract_id.clone()));
                (ContainerKind::Deliver, m, "deliver")
            }
            Request::NegotiateContract { .. } => {
                (ContainerKind::NegotiateContract, Metadata::new(), "negotiate_contract")
            }
            Request::AcceptContract { contract_id, .. } => {
                let mut m = Metadata::new();
                m.insert("contract_id".into(), MetadataValue::Str(contract_id.clone()));
                (ContainerKind::AcceptContract, m, "accept_contract")
            }
            Request::FulfillContract { contract_id, .. } => {
                let mut m = Metadata::new();
                m.insert("contract_id".into(), MetadataValue::Str(contract_id.clone()));
                (ContainerKind::FulfillContract, m, "fulfill_contract")
            }
            Request::ArbitrageCoordinator { .. } => {
                (ContainerKind::ArbitrageCoordinator, Metadata::new(), "arbitrage_coordinator")
            }
            Request::HealthCheck
            | Request::ContainerStatus { .. }
            | Request::ShipLockStatus { .. }
            | Request::Shutdown => unreachable!("handled in dispatch"),
        };

        let body = Arc::from(wf_adapters::bodies::make_body(kind, self.game_client.clone()));
        let max_iterations = match kind {
            ContainerKind::Mine | ContainerKind::Scout | ContainerKind::Trade | ContainerKind::ArbitrageCoordinator => {
                MaxIterations::Infinite
            }
            _ => MaxIterations::Finite(1),
        };

        match self
            .registry
            .create_and_start(kind, player_id, metadata, ship_symbols, max_iterations, 2, operation, body)
            .await
        {
            Ok(container_id) => Response::ok_container(container_id),
            Err(e) => Response::error(e.to_string()),
        }
    }
}
