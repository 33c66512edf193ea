// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolves the same state-directory layout `wayfarerd` uses, so the CLI can
//! find its socket without the two binaries sharing a config type.

use std::path::PathBuf;

pub fn state_dir(override_dir: Option<PathBuf>) -> PathBuf {
    override_dir.unwrap_or_else(|| {
        std::env::var_os("WAYFARERD_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| dirs::data_dir().unwrap_or_else(std::env::temp_dir).join("wayfarer"))
    })
}

pub fn socket_path(state_dir: &std::path::Path) -> PathBuf {
    state_dir.join("daemon.sock")
}
