use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::dialog::{FollowUp, InstallDialogState, LoadTicket};
use super::model::{AppSettings, GameInfo, InstallInfo, Runner};
use super::services::Services;

/// Result of one asynchronous fetch, tagged with the load round it belongs to.
#[derive(Debug)]
pub enum LoadEvent {
    InstallInfo(LoadTicket, Result<InstallInfo>),
    GameInfo(LoadTicket, Result<GameInfo>),
    InstallerLanguages(LoadTicket, Result<Vec<String>>),
    AppSettings(LoadTicket, Result<AppSettings>),
}

impl LoadEvent {
    pub fn ticket(&self) -> LoadTicket {
        match self {
            LoadEvent::InstallInfo(ticket, _)
            | LoadEvent::GameInfo(ticket, _)
            | LoadEvent::InstallerLanguages(ticket, _)
            | LoadEvent::AppSettings(ticket, _) => *ticket,
        }
    }
}

pub async fn fetch_install_info(
    services: Services,
    app_name: String,
    runner: Runner,
    ticket: LoadTicket,
) -> LoadEvent {
    debug!(%app_name, %runner, "Fetching install info");
    let result = services
        .library
        .install_info(&app_name, runner)
        .await
        .with_context(|| format!("Failed to load install info for {}", app_name));
    LoadEvent::InstallInfo(ticket, result)
}

pub async fn fetch_game_info(
    services: Services,
    app_name: String,
    runner: Runner,
    ticket: LoadTicket,
) -> LoadEvent {
    debug!(%app_name, %runner, "Fetching game info");
    let result = services
        .library
        .game_info(&app_name, runner)
        .await
        .with_context(|| format!("Failed to load game info for {}", app_name));
    LoadEvent::GameInfo(ticket, result)
}

pub async fn fetch_installer_languages(
    services: Services,
    app_name: String,
    ticket: LoadTicket,
) -> LoadEvent {
    debug!(%app_name, "Fetching Linux installer languages");
    let result = services
        .library
        .linux_installer_languages(&app_name)
        .await
        .with_context(|| format!("Failed to list installer languages for {}", app_name));
    LoadEvent::InstallerLanguages(ticket, result)
}

pub async fn fetch_app_settings(services: Services, ticket: LoadTicket) -> LoadEvent {
    let result = services
        .settings
        .app_settings()
        .await
        .context("Failed to load launcher settings");
    LoadEvent::AppSettings(ticket, result)
}

/// Run a full load round against `state` without a UI: install info, game
/// info and settings concurrently, then any follow-up fetch.
///
/// Failures are collected rather than aborting the round, matching how the
/// dialog keeps going when one fetch fails.
pub async fn load_dialog(state: &mut InstallDialogState, services: &Services) -> Vec<anyhow::Error> {
    let ticket = state.begin_load();
    let app_name = state.app_name().to_string();
    let runner = state.runner();

    let (install_info, game_info, settings) = tokio::join!(
        fetch_install_info(services.clone(), app_name.clone(), runner, ticket),
        fetch_game_info(services.clone(), app_name.clone(), runner, ticket),
        fetch_app_settings(services.clone(), ticket),
    );

    let mut errors = Vec::new();
    let mut follow_ups = Vec::new();
    for event in [install_info, game_info, settings] {
        match state.apply(event) {
            Ok(Some(follow_up)) => follow_ups.push(follow_up),
            Ok(None) => {}
            Err(err) => {
                warn!("{:#}", err);
                errors.push(err);
            }
        }
    }

    for follow_up in follow_ups {
        let FollowUp::FetchInstallerLanguages(ticket) = follow_up;
        let event = fetch_installer_languages(services.clone(), app_name.clone(), ticket).await;
        if let Err(err) = state.apply(event) {
            warn!("{:#}", err);
            errors.push(err);
        }
    }

    errors
}
