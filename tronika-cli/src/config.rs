use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tronika_core::{ReminderNotice, is_valid_destination, parse_tz};

use crate::state::config_path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralSection,
    #[serde(default)]
    pub reminders: RemindersSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSection {
    /// IANA zone used to read and display local deadlines.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersSection {
    #[serde(default)]
    pub channel: Channel,
    /// Used when a task has no owner, or the owner has no entry in `recipients`.
    #[serde(default)]
    pub default_recipient: Option<String>,
    #[serde(default = "default_interval_hours")]
    pub sweep_interval_hours: u64,
    /// owner -> address
    #[serde(default)]
    pub recipients: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    Console,
    Outbox,
}

impl FromStr for Channel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "console" => Ok(Channel::Console),
            "outbox" => Ok(Channel::Outbox),
            other => bail!("unknown channel '{other}' (expected console or outbox)"),
        }
    }
}

fn default_timezone() -> String {
    "Asia/Jakarta".to_string()
}

fn default_interval_hours() -> u64 {
    24
}

impl Default for GeneralSection {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

impl Default for RemindersSection {
    fn default() -> Self {
        Self {
            channel: Channel::Console,
            default_recipient: None,
            sweep_interval_hours: default_interval_hours(),
            recipients: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Reject values that would only fail later, mid-sweep.
    pub fn validate(&self) -> Result<()> {
        parse_tz(&self.general.timezone)?;
        if self.reminders.sweep_interval_hours == 0 {
            bail!("reminders.sweep_interval_hours must be at least 1");
        }
        if let Some(r) = self.reminders.default_recipient.as_deref() {
            if !is_valid_destination(r) {
                bail!("reminders.default_recipient is not an email address: {r}");
            }
        }
        for (owner, addr) in &self.reminders.recipients {
            if !is_valid_destination(addr) {
                bail!("reminders.recipients.{owner} is not an email address: {addr}");
            }
        }
        Ok(())
    }

    /// Owner's address, falling back to the default recipient.
    pub fn resolve_destination(&self, notice: &ReminderNotice) -> Option<String> {
        notice
            .owner
            .as_ref()
            .and_then(|o| self.reminders.recipients.get(o))
            .or(self.reminders.default_recipient.as_ref())
            .cloned()
    }
}

pub fn load_config(home: &Path) -> Result<Config> {
    let p = config_path(home);
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", p.display()))?;
    Ok(cfg)
}

pub fn save_config(home: &Path, cfg: &Config) -> Result<()> {
    let p = config_path(home);
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config(home: &Path) -> Result<()> {
    let p = config_path(home);
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(home, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config(cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    println!("{}", s.trim_end());

    if cfg.reminders.default_recipient.is_none() && cfg.reminders.recipients.is_empty() {
        println!("\n# No reminder recipients configured. Add to config.toml:");
        println!("# [reminders]");
        println!("# default_recipient = \"student@example.com\"");
    }
    Ok(())
}
