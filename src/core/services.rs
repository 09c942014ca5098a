//! Collaborators the install dialog talks to. The host application provides
//! the implementations; [`crate::core::backend::LocalBackend`] is the
//! filesystem-backed one used by the binary.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::model::{
    AppSettings, GameInfo, GameSettings, InstallInfo, InstallOutcome, InstallProgress,
    InstallRequest, Runner,
};

/// Read access to store metadata.
#[async_trait]
pub trait GameLibrary: Send + Sync {
    async fn install_info(&self, app_name: &str, runner: Runner) -> Result<InstallInfo>;

    async fn game_info(&self, app_name: &str, runner: Runner) -> Result<GameInfo>;

    /// Languages shipped by the native Linux installer of a GOG title.
    async fn linux_installer_languages(&self, app_name: &str) -> Result<Vec<String>>;
}

#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Launcher-wide defaults.
    async fn app_settings(&self) -> Result<AppSettings>;

    async fn game_settings(&self, app_name: &str) -> Result<GameSettings>;

    async fn write_game_settings(&self, app_name: &str, settings: &GameSettings) -> Result<()>;
}

#[async_trait]
pub trait InstallOrchestrator: Send + Sync {
    async fn install(&self, request: InstallRequest) -> Result<InstallOutcome>;
}

/// Local key-value record of earlier download progress, keyed by app name.
pub trait ProgressStore: Send + Sync {
    /// Best effort: unreadable records come back as `None`.
    fn previous_progress(&self, app_name: &str) -> Option<InstallProgress>;
}

#[derive(Clone)]
pub struct Services {
    pub library: Arc<dyn GameLibrary>,
    pub settings: Arc<dyn SettingsProvider>,
    pub installer: Arc<dyn InstallOrchestrator>,
    pub progress: Arc<dyn ProgressStore>,
}

impl Services {
    /// Wire all four roles to one backend.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: GameLibrary + SettingsProvider + InstallOrchestrator + ProgressStore + 'static,
    {
        Self {
            library: backend.clone(),
            settings: backend.clone(),
            installer: backend.clone(),
            progress: backend,
        }
    }
}
