//! Append-only files next to the board: the activity journal (JSONL) and
//! the ledger of reminder dedupe keys already sent.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::warn;
use tronika_core::ActivityEntry;

fn open_append(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))
}

#[derive(Debug, Clone)]
pub struct ActivityJournal {
    path: PathBuf,
}

impl ActivityJournal {
    pub const FILE_NAME: &'static str = "activity.jsonl";

    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            path: root.as_ref().join(Self::FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, entry: &ActivityEntry) -> Result<()> {
        let mut f = open_append(&self.path)?;
        let line = serde_json::to_string(entry).context("serialize activity entry")?;
        writeln!(f, "{line}").with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }

    /// Most recent `limit` entries, newest first. Unreadable lines are
    /// skipped with a warning.
    pub fn read_recent(&self, limit: usize) -> Result<Vec<ActivityEntry>> {
        if !self.path.exists() {
            return Ok(vec![]);
        }

        let f = fs::File::open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        let mut rows = Vec::new();
        for (n, line) in BufReader::new(f).lines().enumerate() {
            let line = line.with_context(|| format!("read {}", self.path.display()))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ActivityEntry>(&line) {
                Ok(e) => rows.push(e),
                Err(e) => warn!(line = n + 1, error = %e, "skipping bad activity line"),
            }
        }

        Ok(rows.into_iter().rev().take(limit).collect())
    }
}

#[derive(Debug, Clone)]
pub struct SentLedger {
    path: PathBuf,
}

impl SentLedger {
    pub const FILE_NAME: &'static str = "sent_keys.txt";

    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            path: root.as_ref().join("reminders").join(Self::FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<HashSet<String>> {
        if !self.path.exists() {
            return Ok(HashSet::new());
        }
        let f = fs::File::open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        let mut keys = HashSet::new();
        for line in BufReader::new(f).lines() {
            let line = line.with_context(|| format!("read {}", self.path.display()))?;
            let key = line.trim();
            if !key.is_empty() {
                keys.insert(key.to_string());
            }
        }
        Ok(keys)
    }

    /// Drop keys dated before `day` (`YYYY-MM-DD`). Keys are `task_id:day`;
    /// lines without a date suffix are kept. Returns how many were dropped.
    pub fn prune_before(&self, day: &str) -> Result<usize> {
        if !self.path.exists() {
            return Ok(0);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;

        let mut kept = String::new();
        let mut dropped = 0;
        for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let stale = line
                .rsplit_once(':')
                .is_some_and(|(_, d)| d.len() == day.len() && d < day);
            if stale {
                dropped += 1;
            } else {
                kept.push_str(line);
                kept.push('\n');
            }
        }
        if dropped == 0 {
            return Ok(0);
        }

        let tmp = self.path.with_extension("txt.tmp");
        fs::write(&tmp, kept).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("rename {} -> {}", tmp.display(), self.path.display()))?;
        Ok(dropped)
    }

    pub fn record<'a>(&self, keys: impl IntoIterator<Item = &'a String>) -> Result<usize> {
        let mut f = open_append(&self.path)?;
        let mut n = 0;
        for k in keys {
            writeln!(f, "{k}").with_context(|| format!("write {}", self.path.display()))?;
            n += 1;
        }
        Ok(n)
    }
}
