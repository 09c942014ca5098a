use anyhow::{Context, Result};
use tracing::{error, info, warn};

use super::dialog::InstallPlan;
use super::model::InstallOutcome;
use super::services::Services;

/// Hand a confirmed plan to the orchestrator.
///
/// When the plan carries a wine prefix, the title's settings are read, the
/// prefix merged in and written back first. A failed write is logged and the
/// install goes ahead; a failed read aborts.
pub async fn dispatch_install(services: &Services, plan: InstallPlan) -> Result<InstallOutcome> {
    let InstallPlan {
        wine_prefix,
        request,
    } = plan;
    let app_name = request.app_name.clone();

    if let Some(prefix) = wine_prefix {
        let current = services
            .settings
            .game_settings(&app_name)
            .await
            .with_context(|| format!("Failed to read settings for {}", app_name))?;
        let merged = current.with_wine_prefix(prefix);

        if let Err(err) = services.settings.write_game_settings(&app_name, &merged).await {
            warn!(%app_name, "Failed to save wine prefix: {:#}", err);
        }
    }

    info!(
        %app_name,
        runner = %request.runner,
        target = ?request.target,
        language = ?request.language,
        install_dlcs = request.install_dlcs,
        sdl_tags = request.sdl_tags.len(),
        "Dispatching install"
    );

    services
        .installer
        .install(request)
        .await
        .with_context(|| format!("Install of {} failed", app_name))
}

/// Owned variant of [`dispatch_install`] for running detached from the dialog.
///
/// The future holds everything it needs, so the install goes through even
/// when the dialog that confirmed it is torn down first. `report` receives
/// the title and the outcome.
pub async fn dispatch_and_report<F>(services: Services, plan: InstallPlan, report: F)
where
    F: FnOnce(String, Result<InstallOutcome>) + Send + 'static,
{
    let app_name = plan.request.app_name.clone();
    let result = dispatch_install(&services, plan).await;
    match &result {
        Ok(outcome) => info!(%app_name, ?outcome, "Install dispatched"),
        Err(err) => error!(%app_name, "{:#}", err),
    }
    report(app_name, result);
}
