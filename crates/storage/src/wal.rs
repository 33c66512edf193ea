// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only write-ahead log of domain [`Event`]s, one JSON object per line.
//!
//! Corruption tolerance: a line that fails to parse as JSON (or as valid
//! UTF-8) is treated as the tail of a torn write. `open` rotates everything
//! from the first bad line onward into a `.bak` file (keeping up to
//! [`MAX_BAK_FILES`] prior backups) and continues with only the valid prefix.
//! Readers (`next_unprocessed`, `entries_after`) apply the same rule mid-run:
//! a bad line stops iteration rather than erroring, since a reader may be
//! racing a writer's in-flight `append`.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::Event;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub event: Event,
}

const MAX_BAK_FILES: u32 = 3;
const FLUSH_THRESHOLD: usize = 100;

fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };
    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

/// A line-delimited JSON WAL. One writer at a time (enforced by the owning
/// [`crate::store::WalStore`]'s single mutex, not by this type itself).
pub struct Wal {
    path: PathBuf,
    file: File,
    write_seq: u64,
    processed_seq: u64,
    unflushed: usize,
}

impl Wal {
    /// Opens (creating if absent) the WAL at `path`. `processed_seq` is the
    /// sequence number the caller has already folded into a snapshot; reads
    /// via [`Self::next_unprocessed`] start just after it.
    pub fn open(path: impl AsRef<Path>, processed_seq: u64) -> Result<Self, WalError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let (valid_entries, write_seq, had_corruption) = Self::scan(&path)?;
        if had_corruption {
            let bak = rotate_bak_path(&path);
            if path.exists() {
                fs::rename(&path, &bak)?;
            }
            let mut clean = File::create(&path)?;
            for entry in &valid_entries {
                let line = serde_json::to_string(entry)?;
                writeln!(clean, "{line}")?;
            }
            clean.flush()?;
        }

        let file = OpenOptions::new().append(true).read(true).open(&path)?;
        Ok(Self { path, file, write_seq, processed_seq, unflushed: 0 })
    }

    /// Reads every line, returning the valid prefix and whether any
    /// unreadable byte was encountered (signalling a rotation is needed).
    fn scan(path: &Path) -> Result<(Vec<WalEntry>, u64, bool), WalError> {
        if !path.exists() {
            return Ok((Vec::new(), 0, false));
        }
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut valid = Vec::new();
        let mut had_corruption = false;
        let mut max_seq = 0;
        loop {
            let mut raw = Vec::new();
            let n = reader.read_until(b'\n', &mut raw)?;
            if n == 0 {
                break;
            }
            while raw.last() == Some(&b'\n') || raw.last() == Some(&b'\r') {
                raw.pop();
            }
            if raw.is_empty() {
                continue;
            }
            match std::str::from_utf8(&raw).ok().and_then(|s| serde_json::from_str::<WalEntry>(s).ok()) {
                Some(entry) => {
                    max_seq = max_seq.max(entry.seq);
                    valid.push(entry);
                }
                None => {
                    had_corruption = true;
                    break;
                }
            }
        }
        Ok((valid, max_seq, had_corruption))
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    pub fn needs_flush(&self) -> bool {
        self.unflushed >= FLUSH_THRESHOLD
    }

    /// Appends `event`, assigning it the next sequence number. Does not flush
    /// by itself; callers decide batching via [`Self::needs_flush`] /
    /// [`Self::flush`].
    pub fn append(&mut self, event: &Event) -> Result<u64, WalError> {
        self.write_seq += 1;
        let entry = WalEntry { seq: self.write_seq, event: event.clone() };
        let line = serde_json::to_string(&entry)?;
        self.file.seek(SeekFrom::End(0))?;
        writeln!(self.file, "{line}")?;
        self.unflushed += 1;
        Ok(entry.seq)
    }

    pub fn flush(&mut self) -> Result<(), WalError> {
        self.file.flush()?;
        self.file.sync_data()?;
        self.unflushed = 0;
        Ok(())
    }

    /// Returns entries with `seq > processed_seq`, advancing a read cursor
    /// one entry at a time. Used during startup replay after a snapshot load.
    pub fn next_unprocessed(&mut self) -> Result<Option<WalEntry>, WalError> {
        let entries = self.entries_after(self.processed_seq)?;
        Ok(entries.into_iter().next())
    }

    pub fn mark_processed(&mut self, seq: u64) {
        self.processed_seq = self.processed_seq.max(seq);
    }

    /// All entries with `seq > after`, read fresh from disk. Stops (without
    /// erroring) at the first unparseable line, which a concurrent writer may
    /// have only partially flushed.
    pub fn entries_after(&self, after: u64) -> Result<Vec<WalEntry>, WalError> {
        let mut file = File::open(&self.path)?;
        let mut contents = String::new();
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        if let Ok(s) = String::from_utf8(bytes) {
            contents = s;
        }
        let mut out = Vec::new();
        for line in contents.lines() {
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<WalEntry>(line) {
                Ok(entry) if entry.seq > after => out.push(entry),
                Ok(_) => continue,
                Err(_) => break,
            }
        }
        Ok(out)
    }

    /// Drops all entries with `seq < keep_from` by rewriting the file.
    /// Used after a successful checkpoint to bound WAL growth.
    pub fn truncate_before(&mut self, keep_from: u64) -> Result<(), WalError> {
        let keep = self.entries_after(keep_from.saturating_sub(1))?;
        let mut tmp = self.path.with_extension("wal.tmp");
        tmp.set_extension("tmp");
        {
            let mut f = File::create(&tmp)?;
            for entry in &keep {
                let line = serde_json::to_string(entry)?;
                writeln!(f, "{line}")?;
            }
            f.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        self.file = OpenOptions::new().append(true).read(true).open(&self.path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
