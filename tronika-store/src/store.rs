//! Board persistence.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use tronika_core::TaskBoard;

use crate::snapshot::{BoardSnapshot, SNAPSHOT_VERSION};

pub trait TaskStore {
    fn load(&self) -> Result<BoardSnapshot>;
    fn save(&mut self, snapshot: &BoardSnapshot) -> Result<()>;

    fn load_board(&self) -> Result<TaskBoard> {
        Ok(self.load()?.into_board())
    }

    fn save_board(&mut self, board: &TaskBoard) -> Result<()> {
        self.save(&BoardSnapshot::from_board(board))
    }
}

/// `board.json` under a root directory.
///
/// A missing file loads as a first-run board. Saves go to a sibling temp
/// file first and are renamed into place, so a crash mid-write leaves the
/// previous board intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub const FILE_NAME: &'static str = "board.json";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.root.join(Self::FILE_NAME)
    }
}

impl TaskStore for JsonFileStore {
    fn load(&self) -> Result<BoardSnapshot> {
        let p = self.path();
        if !p.exists() {
            debug!(path = %p.display(), "no board yet, starting fresh");
            return Ok(BoardSnapshot::default());
        }

        let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
        let snap: BoardSnapshot =
            serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))?;

        if snap.version > SNAPSHOT_VERSION {
            bail!(
                "{} was written by a newer version (format v{}, this build reads v{})",
                p.display(),
                snap.version,
                SNAPSHOT_VERSION
            );
        }

        debug!(
            path = %p.display(),
            tasks = snap.tasks.len(),
            courses = snap.courses.len(),
            "board loaded"
        );
        Ok(snap)
    }

    fn save(&mut self, snapshot: &BoardSnapshot) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("create {}", self.root.display()))?;

        let p = self.path();
        let tmp = self.root.join(format!("{}.tmp", Self::FILE_NAME));
        let json = serde_json::to_string_pretty(snapshot).context("serialize board")?;

        fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &p)
            .with_context(|| format!("rename {} -> {}", tmp.display(), p.display()))?;

        debug!(path = %p.display(), tasks = snapshot.tasks.len(), "board saved");
        Ok(())
    }
}

/// In-memory store, for exercising board logic without touching disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Option<BoardSnapshot>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: BoardSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            saves: 0,
        }
    }

    /// How many times `save` has been called.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl TaskStore for MemoryStore {
    fn load(&self) -> Result<BoardSnapshot> {
        Ok(self.snapshot.clone().unwrap_or_default())
    }

    fn save(&mut self, snapshot: &BoardSnapshot) -> Result<()> {
        self.snapshot = Some(snapshot.clone());
        self.saves += 1;
        Ok(())
    }
}
