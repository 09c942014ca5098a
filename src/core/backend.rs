use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs as async_fs;
use tracing::{debug, info};

use super::model::{
    AppSettings, GameInfo, GameSettings, InstallInfo, InstallOutcome, InstallProgress,
    InstallRequest, Runner,
};
use super::paths::LauncherPaths;
use super::services::{GameLibrary, InstallOrchestrator, ProgressStore, SettingsProvider};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{app_name} is not in the {runner} library")]
    TitleNotFound { app_name: String, runner: Runner },
    #[error("Invalid app name: {0:?}")]
    InvalidAppName(String),
}

/// Library record for one title as synced from its store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub install_info: InstallInfo,
    #[serde(default)]
    pub game_info: GameInfo,
    #[serde(default)]
    pub installer_languages: Vec<String>,
}

#[derive(Debug, Serialize)]
struct QueuedInstall<'a> {
    id: &'a str,
    queued_at: String,
    request: &'a InstallRequest,
}

/// Launcher data kept as JSON files under [`LauncherPaths`]. Install requests
/// are queued as files for the external installer to pick up.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    paths: LauncherPaths,
}

impl LocalBackend {
    pub fn new(paths: LauncherPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &LauncherPaths {
        &self.paths
    }

    fn check_app_name(app_name: &str) -> Result<()> {
        let invalid = app_name.is_empty()
            || app_name == "default"
            || app_name.contains(['/', '\\'])
            || app_name.starts_with('.');
        if invalid {
            return Err(BackendError::InvalidAppName(app_name.to_string()).into());
        }
        Ok(())
    }

    async fn load_entry(&self, app_name: &str, runner: Runner) -> Result<LibraryEntry> {
        Self::check_app_name(app_name)?;
        let path = self.paths.library_file(runner, app_name);
        if !async_fs::try_exists(&path).await.unwrap_or(false) {
            return Err(BackendError::TitleNotFound {
                app_name: app_name.to_string(),
                runner,
            }
            .into());
        }
        read_json(&path).await
    }

    fn default_app_settings() -> AppSettings {
        let games = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/"))
            .join("Games")
            .join("GameDeck");
        AppSettings {
            default_wine_prefix: games.join("Prefixes"),
            default_install_path: games,
            ..Default::default()
        }
    }
}

async fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = async_fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }
    let content = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    async_fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {:?}", path))
}

#[async_trait]
impl GameLibrary for LocalBackend {
    async fn install_info(&self, app_name: &str, runner: Runner) -> Result<InstallInfo> {
        Ok(self.load_entry(app_name, runner).await?.install_info)
    }

    async fn game_info(&self, app_name: &str, runner: Runner) -> Result<GameInfo> {
        Ok(self.load_entry(app_name, runner).await?.game_info)
    }

    async fn linux_installer_languages(&self, app_name: &str) -> Result<Vec<String>> {
        Ok(self
            .load_entry(app_name, Runner::Gog)
            .await?
            .installer_languages)
    }
}

#[async_trait]
impl SettingsProvider for LocalBackend {
    async fn app_settings(&self) -> Result<AppSettings> {
        let path = self.paths.default_settings_file();
        if async_fs::try_exists(&path).await.unwrap_or(false) {
            read_json(&path).await
        } else {
            debug!("No launcher settings at {:?}, using defaults", path);
            Ok(Self::default_app_settings())
        }
    }

    async fn game_settings(&self, app_name: &str) -> Result<GameSettings> {
        Self::check_app_name(app_name)?;
        let path = self.paths.game_settings_file(app_name);
        if async_fs::try_exists(&path).await.unwrap_or(false) {
            read_json(&path).await
        } else {
            Ok(GameSettings::default())
        }
    }

    async fn write_game_settings(&self, app_name: &str, settings: &GameSettings) -> Result<()> {
        Self::check_app_name(app_name)?;
        write_json(&self.paths.game_settings_file(app_name), settings).await
    }
}

#[async_trait]
impl InstallOrchestrator for LocalBackend {
    async fn install(&self, request: InstallRequest) -> Result<InstallOutcome> {
        let id = uuid::Uuid::new_v4().to_string();
        let path = self.paths.queue_dir().join(format!("{}.json", id));
        let queued = QueuedInstall {
            id: &id,
            queued_at: chrono::Utc::now().to_rfc3339(),
            request: &request,
        };
        write_json(&path, &queued).await?;

        info!(app_name = %request.app_name, request_id = %id, "Install request queued");
        Ok(InstallOutcome::Queued { request_id: id })
    }
}

impl ProgressStore for LocalBackend {
    fn previous_progress(&self, app_name: &str) -> Option<InstallProgress> {
        Self::check_app_name(app_name).ok()?;
        let path = self.paths.progress_file(app_name);
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(progress) => Some(progress),
            Err(err) => {
                debug!("Ignoring unreadable progress record {:?}: {}", path, err);
                None
            }
        }
    }
}
