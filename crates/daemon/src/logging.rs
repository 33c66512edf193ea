// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured logging. Defaults to `info`, overridable via
//! `RUST_LOG`; writes to a daily-rolling file under the state directory in
//! addition to stderr so a crash leaves a trail behind.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// The returned guard must be kept alive for the process lifetime — dropping
/// it stops the background flush thread the non-blocking file writer uses.
pub fn init(state_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(state_dir, "wayfarerd.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(filter)
        .init();

    guard
}
