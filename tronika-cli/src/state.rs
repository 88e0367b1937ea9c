use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Data directory: `--home`, else `$TRONIKA_HOME`, else `~/.tronika`.
pub fn tronika_home(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    if let Ok(p) = std::env::var("TRONIKA_HOME") {
        if !p.trim().is_empty() {
            return Ok(PathBuf::from(p));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".tronika"))
}

pub fn ensure_tronika_home(explicit: Option<&Path>) -> Result<PathBuf> {
    let dir = tronika_home(explicit)?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn config_path(home: &Path) -> PathBuf {
    home.join("config.toml")
}

pub fn outbox_path(home: &Path) -> PathBuf {
    home.join("reminders").join("outbox.jsonl")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_home_wins() {
        let p = tronika_home(Some(Path::new("/tmp/tronika-test"))).unwrap();
        assert_eq!(p, PathBuf::from("/tmp/tronika-test"));
        assert_eq!(
            outbox_path(&p),
            PathBuf::from("/tmp/tronika-test/reminders/outbox.jsonl")
        );
    }
}
