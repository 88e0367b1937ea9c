//! Reminder dispatchers available from the command line.
//!
//! Neither one talks to a mail server. `console` prints, `outbox` appends a
//! JSON line per message for an external mailer to pick up.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tronika_core::ReminderDispatcher;

pub struct ConsoleDispatcher;

impl ReminderDispatcher for ConsoleDispatcher {
    fn send(&mut self, destination: &str, subject: &str, body: &str) -> Result<()> {
        println!("To: {destination}\nSubject: {subject}\n\n{body}\n");
        Ok(())
    }
}

/// Prints what would be sent and records nothing.
pub struct DryRunDispatcher;

impl ReminderDispatcher for DryRunDispatcher {
    fn send(&mut self, destination: &str, subject: &str, _body: &str) -> Result<()> {
        println!("[DRY RUN] would send '{subject}' -> {destination}");
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub queued_at_utc: DateTime<Utc>,
}

pub struct OutboxDispatcher {
    path: PathBuf,
    now: DateTime<Utc>,
}

impl OutboxDispatcher {
    pub fn new(path: PathBuf, now: DateTime<Utc>) -> Self {
        Self { path, now }
    }
}

impl ReminderDispatcher for OutboxDispatcher {
    fn send(&mut self, destination: &str, subject: &str, body: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let msg = OutboxMessage {
            to: destination.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            queued_at_utc: self.now,
        };
        let line = serde_json::to_string(&msg).context("serialize outbox message")?;
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        writeln!(f, "{line}").with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn outbox_appends_one_line_per_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reminders").join("outbox.jsonl");
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();

        let mut d = OutboxDispatcher::new(path.clone(), now);
        d.send("ani@example.com", "Task deadline: Kuis", "Kuis is due in 1 day.")
            .unwrap();
        d.send("budi@example.com", "Task deadline: UTS", "UTS is due in 3 days.")
            .unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let msgs: Vec<OutboxMessage> = raw
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[1].to, "budi@example.com");
        assert_eq!(msgs[0].queued_at_utc, now);
    }
}
