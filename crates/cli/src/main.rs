// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wayfarer`: dispatches start/stop/status and business-verb subcommands to
//! `wayfarerd` over its Unix socket, or manages the daemon process directly
//! for start/stop.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use wf_cli::client::DaemonClient;
use wf_cli::commands::{daemon, status, verbs};
use wf_cli::exit_error::ExitError;
use wf_cli::paths;

#[derive(Parser)]
#[command(name = "wayfarer", about = "Wayfarer fleet automation client")]
struct Cli {
    /// Overrides the daemon's state directory (socket, PID file).
    #[arg(long, global = true, env = "WAYFARERD_STATE_DIR")]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the daemon.
    Start {
        #[arg(long)]
        foreground: bool,
    },
    /// Stop the daemon.
    Stop,
    /// Check daemon health and fleet status.
    Status,
    #[command(flatten)]
    Verb(verbs::Verb),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let state_dir = paths::state_dir(cli.state_dir);
    let socket_path = paths::socket_path(&state_dir);

    let result = match cli.command {
        Command::Start { foreground } => daemon::start(foreground, &state_dir, &socket_path).await,
        Command::Stop => daemon::stop(&socket_path).await,
        Command::Status => status::run(&DaemonClient::new(&socket_path)).await,
        Command::Verb(verb) => verbs::run(&DaemonClient::new(&socket_path), verb).await,
    };

    if let Err(e) = result {
        print_exit_error(&e);
        std::process::exit(e.code);
    }
}

fn print_exit_error(e: &ExitError) {
    eprintln!("error: {e}");
}
