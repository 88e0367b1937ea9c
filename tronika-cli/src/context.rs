use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::path::{Path, PathBuf};
use tracing::warn;
use tronika_core::{ActivityEntry, TaskBoard, parse_tz};
use tronika_store::{ActivityJournal, JsonFileStore, SentLedger, TaskStore};

use crate::config::{Config, load_config};
use crate::state::ensure_tronika_home;

/// Everything a command needs: where data lives, the effective config, and
/// the clock.
pub struct Ctx {
    pub home: PathBuf,
    pub config: Config,
    pub tz: Tz,
    fixed_now: Option<DateTime<Utc>>,
}

impl Ctx {
    pub fn load(home: Option<&Path>, fixed_now: Option<DateTime<Utc>>) -> Result<Self> {
        let home = ensure_tronika_home(home)?;
        let config = load_config(&home)?;
        let tz = parse_tz(&config.general.timezone)?;
        Ok(Self {
            home,
            config,
            tz,
            fixed_now,
        })
    }

    /// `--now` when given, else the wall clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }

    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.home)
    }

    pub fn journal(&self) -> ActivityJournal {
        ActivityJournal::new(&self.home)
    }

    pub fn ledger(&self) -> SentLedger {
        SentLedger::new(&self.home)
    }

    pub fn load_board(&self) -> Result<TaskBoard> {
        self.store().load_board()
    }

    /// Persist the board, then journal what happened.
    ///
    /// Only the board save can fail the command. A journal write that fails
    /// after it is logged and skipped.
    pub fn commit(&self, board: &TaskBoard, entries: &[ActivityEntry]) -> Result<()> {
        self.store().save_board(board)?;
        let journal = self.journal();
        for e in entries {
            if let Err(err) = journal.append(e) {
                warn!(
                    task_id = %e.task_id,
                    action = %e.action,
                    error = %format!("{err:#}"),
                    "board saved but activity not journaled"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tronika_core::{ActivityAction, NewTask};

    #[test]
    fn journal_failure_does_not_fail_commit() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let ctx = Ctx::load(Some(dir.path()), Some(now)).unwrap();
        // A directory where the journal file should be makes every append fail.
        std::fs::create_dir_all(ctx.journal().path()).unwrap();

        let mut board = ctx.load_board().unwrap();
        let task = board.add_task(NewTask::new("Kuis", now), now).unwrap().clone();
        let entry = ActivityEntry::for_task(ActivityAction::Created, &task, now);

        ctx.commit(&board, &[entry]).unwrap();
        assert_eq!(ctx.load_board().unwrap().tasks().len(), 1);
    }
}
