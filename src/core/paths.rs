use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::model::Runner;

const HOME_ENV: &str = "GAMEDECK_HOME";

/// On-disk layout of the launcher data directory.
#[derive(Debug, Clone)]
pub struct LauncherPaths {
    root: PathBuf,
}

impl LauncherPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `explicit`, then `$GAMEDECK_HOME`, then `~/.gamedeck`.
    pub fn discover(explicit: Option<PathBuf>) -> Result<Self> {
        if let Some(root) = explicit {
            return Ok(Self::new(root));
        }
        if let Some(root) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(root));
        }
        let home = dirs::home_dir().context("Home directory not available")?;
        Ok(Self::new(home.join(".gamedeck")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn library_file(&self, runner: Runner, app_name: &str) -> PathBuf {
        self.root
            .join("library")
            .join(runner.as_str())
            .join(format!("{}.json", app_name))
    }

    pub fn default_settings_file(&self) -> PathBuf {
        self.root.join("config").join("default.json")
    }

    pub fn game_settings_file(&self, app_name: &str) -> PathBuf {
        self.root.join("config").join(format!("{}.json", app_name))
    }

    pub fn progress_file(&self, app_name: &str) -> PathBuf {
        self.root.join("progress").join(format!("{}.json", app_name))
    }

    pub fn queue_dir(&self) -> PathBuf {
        self.root.join("queue")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let paths = LauncherPaths::new("/data");
        assert_eq!(
            paths.library_file(Runner::Gog, "1207658930"),
            PathBuf::from("/data/library/gog/1207658930.json")
        );
        assert_eq!(
            paths.game_settings_file("Fortnite"),
            PathBuf::from("/data/config/Fortnite.json")
        );
        assert_eq!(paths.queue_dir(), PathBuf::from("/data/queue"));
    }

    #[test]
    fn test_explicit_root_wins() {
        let paths = LauncherPaths::discover(Some(PathBuf::from("/explicit"))).unwrap();
        assert_eq!(paths.root(), Path::new("/explicit"));
    }
}
