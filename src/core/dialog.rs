use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::format::{format_size, strip_path_quotes, suggested_wine_prefix};
use super::language::resolve_install_language;
use super::loader::LoadEvent;
use super::model::{
    AppSettings, DlcInfo, GameInfo, InstallInfo, InstallProgress, InstallRequest, InstallTarget,
    Platform, Runner,
};
use super::selective::{entries_for, SelectiveDownload, TagSelection};

/// What the dialog is opened for.
#[derive(Debug, Clone)]
pub struct DialogInit {
    pub app_name: String,
    pub runner: Runner,
    pub platform: Platform,
    pub preferred_locales: Vec<String>,
    pub previous_progress: Option<InstallProgress>,
    /// Folder the library already tracks for this title, if any.
    pub library_folder: Option<PathBuf>,
}

/// Identifies one round of loading. Results carrying an older ticket are
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Extra fetch requested after a load result was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    FetchInstallerLanguages(LoadTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformBadge {
    Windows,
    Linux,
    Mac,
}

impl PlatformBadge {
    pub fn label(self) -> &'static str {
        match self {
            PlatformBadge::Windows => "Windows",
            PlatformBadge::Linux => "Linux",
            PlatformBadge::Mac => "macOS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Install,
    ContinueDownload,
}

impl PrimaryAction {
    pub fn label(self) -> &'static str {
        match self {
            PrimaryAction::Install => "Install",
            PrimaryAction::ContinueDownload => "Continue Download",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Install,
    Import,
}

/// Work handed to the dispatcher once the user confirms.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallPlan {
    /// Merged into the title's settings before installing. Only set on Linux.
    pub wine_prefix: Option<PathBuf>,
    pub request: InstallRequest,
}

/// Transient state of one install dialog.
///
/// All asynchronous results enter through [`InstallDialogState::apply`], which
/// drops anything from an older load round or arriving after the dialog closed.
#[derive(Debug)]
pub struct InstallDialogState {
    app_name: String,
    runner: Runner,
    platform: Platform,
    preferred_locales: Vec<String>,
    previous_progress: Option<InstallProgress>,
    library_folder: Option<PathBuf>,

    generation: u64,
    closed: bool,

    install_info: Option<InstallInfo>,
    linux_native: bool,
    mac_native: bool,

    languages: Vec<String>,
    languages_from_installer: bool,
    language: Option<String>,

    install_dlcs: bool,

    install_path: Option<PathBuf>,
    install_path_chosen: bool,
    default_install_path: Option<PathBuf>,

    wine_prefix: Option<PathBuf>,
    wine_prefix_edited: bool,
    wine_prefix_root: Option<PathBuf>,

    sdl_entries: &'static [SelectiveDownload],
    sdl_selection: TagSelection,
}

impl InstallDialogState {
    pub fn new(init: DialogInit) -> Self {
        let sdl_entries = entries_for(&init.app_name);
        let install_path = init
            .previous_progress
            .as_ref()
            .and_then(|p| p.folder.clone());

        Self {
            app_name: init.app_name,
            runner: init.runner,
            platform: init.platform,
            preferred_locales: init.preferred_locales,
            previous_progress: init.previous_progress,
            library_folder: init.library_folder,
            generation: 0,
            closed: false,
            install_info: None,
            linux_native: false,
            mac_native: false,
            languages: Vec::new(),
            languages_from_installer: false,
            language: None,
            install_dlcs: false,
            install_path_chosen: install_path.is_some(),
            install_path,
            default_install_path: None,
            wine_prefix: None,
            wine_prefix_edited: false,
            wine_prefix_root: None,
            sdl_entries,
            sdl_selection: TagSelection::seeded(sdl_entries),
        }
    }

    /// Start a load round. Anything still in flight from earlier rounds will
    /// be ignored when it lands.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.languages_from_installer = false;
        debug!(app_name = %self.app_name, generation = self.generation, "Starting install info load");
        LoadTicket(self.generation)
    }

    /// Preferred locales changed: languages must be resolved again.
    pub fn set_preferred_locales(&mut self, locales: Vec<String>) -> LoadTicket {
        self.preferred_locales = locales;
        self.begin_load()
    }

    /// Point the dialog at another title and reset everything tied to the
    /// previous one.
    pub fn retarget(&mut self, init: DialogInit) -> LoadTicket {
        let generation = self.generation;
        *self = Self::new(init);
        self.generation = generation;
        self.begin_load()
    }

    fn accepts(&self, ticket: LoadTicket) -> bool {
        !self.closed && ticket.0 == self.generation
    }

    /// Apply one load result.
    ///
    /// Stale results are dropped and yield `Ok(None)`. A failed fetch for the
    /// current round is returned as the error.
    pub fn apply(&mut self, event: LoadEvent) -> Result<Option<FollowUp>> {
        let ticket = event.ticket();
        if !self.accepts(ticket) {
            debug!(
                app_name = %self.app_name,
                ticket = ticket.0,
                generation = self.generation,
                closed = self.closed,
                "Dropping stale load result"
            );
            return Ok(None);
        }

        match event {
            LoadEvent::InstallInfo(_, result) => {
                self.apply_install_info(result?);
                Ok(None)
            }
            LoadEvent::GameInfo(_, result) => Ok(self.apply_game_info(ticket, result?)),
            LoadEvent::InstallerLanguages(_, result) => {
                self.apply_installer_languages(result?);
                Ok(None)
            }
            LoadEvent::AppSettings(_, result) => {
                self.apply_app_settings(result?);
                Ok(None)
            }
        }
    }

    fn apply_install_info(&mut self, info: InstallInfo) {
        if !self.languages_from_installer {
            if let Some(languages) = info.manifest.as_ref().and_then(|m| m.languages.clone()) {
                self.language = resolve_install_language(&languages, &self.preferred_locales);
                self.languages = languages;
            }
        }
        self.install_info = Some(info);
        self.refresh_suggested_prefix();
    }

    fn apply_game_info(&mut self, ticket: LoadTicket, info: GameInfo) -> Option<FollowUp> {
        self.linux_native = info.is_linux_native && self.platform.is_linux();
        self.mac_native = info.is_mac_native && self.platform.is_mac();

        (self.linux_native && self.runner == Runner::Gog)
            .then_some(FollowUp::FetchInstallerLanguages(ticket))
    }

    fn apply_installer_languages(&mut self, languages: Vec<String>) {
        self.language = resolve_install_language(&languages, &self.preferred_locales);
        self.languages = languages;
        self.languages_from_installer = true;
    }

    fn apply_app_settings(&mut self, settings: AppSettings) {
        let default_path = non_empty(settings.default_install_path);
        if !self.install_path_chosen {
            self.install_path = default_path.clone();
        }
        self.default_install_path = default_path;
        self.wine_prefix_root = non_empty(settings.default_wine_prefix);
        self.refresh_suggested_prefix();
    }

    fn refresh_suggested_prefix(&mut self) {
        if self.wine_prefix_edited {
            return;
        }
        let suggestion = match (&self.wine_prefix_root, self.title()) {
            (Some(root), Some(title)) => Some(suggested_wine_prefix(root, title)),
            _ => None,
        };
        if suggestion.is_some() {
            self.wine_prefix = suggestion;
        }
    }

    /// Typed text is kept as is. Quotes are dropped once the plan is built.
    pub fn set_install_path_text(&mut self, text: &str) {
        self.install_path = non_empty(PathBuf::from(text));
        self.install_path_chosen = true;
    }

    /// Result of the directory picker. Cancelling falls back to the default.
    pub fn apply_picked_install_path(&mut self, picked: Option<PathBuf>) {
        self.install_path = picked.or_else(|| self.default_install_path.clone());
        self.install_path_chosen = true;
    }

    pub fn set_wine_prefix_text(&mut self, text: &str) {
        self.wine_prefix = non_empty(PathBuf::from(text));
        self.wine_prefix_edited = true;
    }

    /// Result of the directory picker. Cancelling keeps the current prefix.
    pub fn apply_picked_wine_prefix(&mut self, picked: Option<PathBuf>) {
        if let Some(path) = picked {
            self.wine_prefix = Some(path);
            self.wine_prefix_edited = true;
        }
    }

    /// Returns false when `language` is not offered for this title.
    pub fn select_language(&mut self, language: &str) -> bool {
        if self.languages.iter().any(|l| l == language) {
            self.language = Some(language.to_string());
            true
        } else {
            false
        }
    }

    pub fn toggle_dlcs(&mut self) {
        self.install_dlcs = !self.install_dlcs;
    }

    /// Toggle a selective download by entry name. Returns false for unknown
    /// or mandatory entries.
    pub fn toggle_selective(&mut self, name: &str) -> bool {
        match self.sdl_entries.iter().find(|e| e.name == name) {
            Some(entry) if !entry.mandatory => {
                self.sdl_selection.toggle(entry);
                true
            }
            _ => false,
        }
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Close the dialog and build the install plan.
    ///
    /// Returns `None` when the dialog was already closed. Installing without
    /// any resolvable folder is an error and keeps the dialog open.
    pub fn confirm(&mut self, action: ConfirmAction) -> Result<Option<InstallPlan>> {
        if self.closed {
            return Ok(None);
        }

        let target = match action {
            ConfirmAction::Import => InstallTarget::Import,
            ConfirmAction::Install => InstallTarget::Folder(
                self.install_folder()
                    .map(|folder| strip_path_quotes(folder))
                    .ok_or_else(|| anyhow!("No install folder selected for {}", self.app_name))?,
            ),
        };

        self.closed = true;

        let wine_prefix = if self.platform.is_linux() {
            self.wine_prefix.as_deref().map(strip_path_quotes)
        } else {
            None
        };

        Ok(Some(InstallPlan {
            wine_prefix,
            request: InstallRequest {
                app_name: self.app_name.clone(),
                runner: self.runner,
                target,
                language: self.language.clone(),
                install_dlcs: self.install_dlcs,
                sdl_tags: self.sdl_selection.tags().to_vec(),
                previous_progress: self.previous_progress.clone(),
            },
        }))
    }

    /// Folder an install goes to: the library's folder for this title wins
    /// over the chosen path, which wins over the launcher default.
    pub fn install_folder(&self) -> Option<&PathBuf> {
        self.library_folder
            .as_ref()
            .or(self.install_path.as_ref())
            .or(self.default_install_path.as_ref())
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn runner(&self) -> Runner {
        self.runner
    }

    pub fn is_loaded(&self) -> bool {
        self.title().is_some()
    }

    pub fn title(&self) -> Option<&str> {
        self.install_info
            .as_ref()
            .map(|info| info.game.title.as_str())
            .filter(|t| !t.is_empty())
    }

    pub fn download_size(&self) -> Option<String> {
        self.install_info
            .as_ref()
            .and_then(|info| info.manifest.as_ref())
            .map(|m| m.download_size)
            .filter(|size| *size > 0)
            .map(format_size)
    }

    pub fn install_size(&self) -> Option<String> {
        self.install_info
            .as_ref()
            .and_then(|info| info.manifest.as_ref())
            .map(|m| m.disk_size)
            .filter(|size| *size > 0)
            .map(format_size)
    }

    pub fn platform_badge(&self) -> PlatformBadge {
        if self.mac_native {
            PlatformBadge::Mac
        } else if self.linux_native {
            PlatformBadge::Linux
        } else {
            PlatformBadge::Windows
        }
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn shows_language_picker(&self) -> bool {
        self.languages.len() > 1
    }

    pub fn shows_wine_prefix(&self) -> bool {
        self.platform.is_linux() && !self.linux_native
    }

    pub fn install_path(&self) -> Option<&Path> {
        self.install_path.as_deref()
    }

    pub fn default_install_path(&self) -> Option<&Path> {
        self.default_install_path.as_deref()
    }

    pub fn wine_prefix(&self) -> Option<&Path> {
        self.wine_prefix.as_deref()
    }

    pub fn dlcs(&self) -> &[DlcInfo] {
        self.install_info
            .as_ref()
            .map(|info| info.game.owned_dlc.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_dlcs(&self) -> bool {
        !self.dlcs().is_empty()
    }

    pub fn install_dlcs(&self) -> bool {
        self.install_dlcs
    }

    pub fn has_selective_downloads(&self) -> bool {
        !self.sdl_entries.is_empty()
    }

    /// Entries the user can toggle.
    pub fn optional_downloads(&self) -> impl Iterator<Item = &SelectiveDownload> + '_ {
        self.sdl_entries.iter().filter(|e| !e.mandatory)
    }

    pub fn is_selected(&self, entry: &SelectiveDownload) -> bool {
        self.sdl_selection.covers(entry)
    }

    pub fn selected_tags(&self) -> &[String] {
        self.sdl_selection.tags()
    }

    /// Percent already downloaded, when the earlier download went to the
    /// path currently shown.
    pub fn downloaded_percent(&self) -> Option<u8> {
        self.previous_progress
            .as_ref()
            .filter(|p| p.matches_folder(self.install_path.as_ref()))
            .map(InstallProgress::percent_complete)
    }

    pub fn primary_action(&self) -> PrimaryAction {
        if self.downloaded_percent().is_some() {
            PrimaryAction::ContinueDownload
        } else {
            PrimaryAction::Install
        }
    }

    pub fn can_install(&self) -> bool {
        !self.closed && self.install_folder().is_some()
    }
}

fn non_empty(path: PathBuf) -> Option<PathBuf> {
    (!path.as_os_str().is_empty()).then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{GameMetadata, Manifest};

    fn init(app_name: &str, runner: Runner, platform: Platform) -> DialogInit {
        DialogInit {
            app_name: app_name.to_string(),
            runner,
            platform,
            preferred_locales: vec!["de".to_string(), "en".to_string()],
            previous_progress: None,
            library_folder: None,
        }
    }

    fn install_info(title: &str, languages: &[&str]) -> InstallInfo {
        InstallInfo {
            game: GameMetadata {
                title: title.to_string(),
                owned_dlc: Vec::new(),
            },
            manifest: Some(Manifest {
                download_size: 2_000_000_000,
                disk_size: 3_500_000_000,
                languages: Some(languages.iter().map(|l| l.to_string()).collect()),
            }),
        }
    }

    fn settings(install: &str, prefix: &str) -> AppSettings {
        AppSettings {
            default_install_path: PathBuf::from(install),
            default_wine_prefix: PathBuf::from(prefix),
            ..Default::default()
        }
    }

    #[test]
    fn test_install_info_resolves_language_and_sizes() {
        let mut state = InstallDialogState::new(init("game", Runner::Legendary, Platform::Linux));
        let ticket = state.begin_load();

        state
            .apply(LoadEvent::InstallInfo(
                ticket,
                Ok(install_info("Hollow Knight", &["en-US", "de-DE"])),
            ))
            .unwrap();

        assert!(state.is_loaded());
        assert_eq!(state.language(), Some("de-DE"));
        assert!(state.shows_language_picker());
        assert_eq!(state.download_size().as_deref(), Some("2.00 GB"));
        assert_eq!(state.install_size().as_deref(), Some("3.50 GB"));
    }

    #[test]
    fn test_stale_results_are_dropped() {
        let mut state = InstallDialogState::new(init("game", Runner::Legendary, Platform::Linux));
        let old = state.begin_load();
        let _current = state.set_preferred_locales(vec!["en".to_string()]);

        let follow_up = state
            .apply(LoadEvent::InstallInfo(old, Ok(install_info("Old", &["en"]))))
            .unwrap();

        assert_eq!(follow_up, None);
        assert!(!state.is_loaded());
    }

    #[test]
    fn test_stale_errors_are_swallowed() {
        let mut state = InstallDialogState::new(init("game", Runner::Legendary, Platform::Linux));
        let ticket = state.begin_load();
        state.close();

        let result = state.apply(LoadEvent::GameInfo(ticket, Err(anyhow!("offline"))));
        assert!(result.is_ok());
    }

    #[test]
    fn test_current_errors_surface() {
        let mut state = InstallDialogState::new(init("game", Runner::Legendary, Platform::Linux));
        let ticket = state.begin_load();

        let result = state.apply(LoadEvent::InstallInfo(ticket, Err(anyhow!("offline"))));
        assert!(result.is_err());
    }

    #[test]
    fn test_gog_linux_native_requests_installer_languages() {
        let mut state = InstallDialogState::new(init("1207658930", Runner::Gog, Platform::Linux));
        let ticket = state.begin_load();

        let follow_up = state
            .apply(LoadEvent::GameInfo(
                ticket,
                Ok(GameInfo {
                    is_linux_native: true,
                    is_mac_native: false,
                }),
            ))
            .unwrap();

        assert_eq!(follow_up, Some(FollowUp::FetchInstallerLanguages(ticket)));
        assert_eq!(state.platform_badge(), PlatformBadge::Linux);
        assert!(!state.shows_wine_prefix());
    }

    #[test]
    fn test_no_installer_languages_off_linux() {
        let mut state = InstallDialogState::new(init("1207658930", Runner::Gog, Platform::MacOs));
        let ticket = state.begin_load();

        let follow_up = state
            .apply(LoadEvent::GameInfo(
                ticket,
                Ok(GameInfo {
                    is_linux_native: true,
                    is_mac_native: true,
                }),
            ))
            .unwrap();

        assert_eq!(follow_up, None);
        assert_eq!(state.platform_badge(), PlatformBadge::Mac);
        assert!(!state.shows_wine_prefix());
    }

    #[test]
    fn test_installer_languages_win_over_late_manifest() {
        let mut state = InstallDialogState::new(init("1207658930", Runner::Gog, Platform::Linux));
        let ticket = state.begin_load();

        state
            .apply(LoadEvent::InstallerLanguages(
                ticket,
                Ok(vec!["en-US".to_string(), "de-DE".to_string()]),
            ))
            .unwrap();
        state
            .apply(LoadEvent::InstallInfo(ticket, Ok(install_info("Game", &["en", "fr"]))))
            .unwrap();

        assert_eq!(state.languages(), ["en-US", "de-DE"]);
        assert_eq!(state.language(), Some("de-DE"));
    }

    #[test]
    fn test_settings_fill_default_path_and_suggest_prefix() {
        let mut state = InstallDialogState::new(init("game", Runner::Legendary, Platform::Linux));
        let ticket = state.begin_load();

        state
            .apply(LoadEvent::AppSettings(ticket, Ok(settings("/games", "/prefixes"))))
            .unwrap();
        assert_eq!(state.install_path(), Some(Path::new("/games")));
        assert_eq!(state.wine_prefix(), None);

        state
            .apply(LoadEvent::InstallInfo(ticket, Ok(install_info("Hades: II", &["en"]))))
            .unwrap();
        assert_eq!(state.wine_prefix(), Some(Path::new("/prefixes/Hades-II")));
        assert!(state.shows_wine_prefix());
        assert!(!state.shows_language_picker());
    }

    #[test]
    fn test_edited_prefix_is_not_overwritten() {
        let mut state = InstallDialogState::new(init("game", Runner::Legendary, Platform::Linux));
        let ticket = state.begin_load();
        state.set_wine_prefix_text("'/custom/prefix'");

        state
            .apply(LoadEvent::AppSettings(ticket, Ok(settings("/games", "/prefixes"))))
            .unwrap();
        state
            .apply(LoadEvent::InstallInfo(ticket, Ok(install_info("Game", &["en"]))))
            .unwrap();

        assert_eq!(state.wine_prefix(), Some(Path::new("'/custom/prefix'")));
    }

    #[test]
    fn test_quotes_are_kept_while_typing_and_dropped_on_confirm() {
        let mut state = InstallDialogState::new(init("game", Runner::Legendary, Platform::Linux));
        state.set_install_path_text("'/games/my dir");
        assert_eq!(state.install_path(), Some(Path::new("'/games/my dir")));
        state.set_install_path_text("'/games/my dir'");
        state.set_wine_prefix_text("'/prefixes/game'");

        let plan = state.confirm(ConfirmAction::Install).unwrap().unwrap();

        assert_eq!(
            plan.request.target,
            InstallTarget::Folder(PathBuf::from("/games/my dir"))
        );
        assert_eq!(plan.wine_prefix, Some(PathBuf::from("/prefixes/game")));
    }

    #[test]
    fn test_picker_cancel_falls_back() {
        let mut state = InstallDialogState::new(init("game", Runner::Legendary, Platform::Linux));
        let ticket = state.begin_load();
        state
            .apply(LoadEvent::AppSettings(ticket, Ok(settings("/games", "/prefixes"))))
            .unwrap();
        state
            .apply(LoadEvent::InstallInfo(ticket, Ok(install_info("Game", &["en"]))))
            .unwrap();

        state.set_install_path_text("/elsewhere");
        state.apply_picked_install_path(None);
        assert_eq!(state.install_path(), Some(Path::new("/games")));

        state.apply_picked_wine_prefix(None);
        assert_eq!(state.wine_prefix(), Some(Path::new("/prefixes/Game")));
    }

    #[test]
    fn test_previous_progress_folder_drives_primary_action() {
        let mut init = init("game", Runner::Legendary, Platform::Linux);
        init.previous_progress = Some(InstallProgress {
            folder: Some(PathBuf::from("/games/partial")),
            percent: Some(37.4),
            ..Default::default()
        });
        let mut state = InstallDialogState::new(init);
        let ticket = state.begin_load();

        // A previous folder counts as an explicit choice.
        state
            .apply(LoadEvent::AppSettings(ticket, Ok(settings("/games", "/prefixes"))))
            .unwrap();
        assert_eq!(state.install_path(), Some(Path::new("/games/partial")));
        assert_eq!(state.downloaded_percent(), Some(37));
        assert_eq!(state.primary_action(), PrimaryAction::ContinueDownload);

        state.set_install_path_text("/games/other");
        assert_eq!(state.downloaded_percent(), None);
        assert_eq!(state.primary_action(), PrimaryAction::Install);
    }

    #[test]
    fn test_confirm_builds_request_and_closes() {
        let mut state = InstallDialogState::new(init("Fortnite", Runner::Legendary, Platform::Linux));
        let ticket = state.begin_load();
        state
            .apply(LoadEvent::AppSettings(ticket, Ok(settings("/games", "/prefixes"))))
            .unwrap();
        state
            .apply(LoadEvent::InstallInfo(ticket, Ok(install_info("Fortnite", &["en", "de"]))))
            .unwrap();
        state.toggle_dlcs();
        assert!(state.toggle_selective("High Resolution Textures"));
        assert!(!state.toggle_selective("Fortnite Core"));

        let plan = state.confirm(ConfirmAction::Install).unwrap().unwrap();

        assert!(state.is_closed());
        assert_eq!(plan.wine_prefix, Some(PathBuf::from("/prefixes/Fortnite")));
        assert_eq!(plan.request.target, InstallTarget::Folder(PathBuf::from("/games")));
        assert_eq!(plan.request.language.as_deref(), Some("de"));
        assert!(plan.request.install_dlcs);
        assert_eq!(plan.request.sdl_tags, ["chunk0", "chunk10", "chunk10optional"]);

        assert_eq!(state.confirm(ConfirmAction::Install).unwrap(), None);
    }

    #[test]
    fn test_library_folder_wins_and_import_needs_no_folder() {
        let mut init = init("game", Runner::Legendary, Platform::Windows);
        init.library_folder = Some(PathBuf::from("D:/Games/Tracked"));
        let mut state = InstallDialogState::new(init);
        state.set_install_path_text("D:/Games/Other");

        assert_eq!(state.install_folder(), Some(&PathBuf::from("D:/Games/Tracked")));

        let plan = state.confirm(ConfirmAction::Import).unwrap().unwrap();
        assert_eq!(plan.request.target, InstallTarget::Import);
        assert_eq!(plan.wine_prefix, None);
    }

    #[test]
    fn test_install_without_folder_keeps_dialog_open() {
        let mut state = InstallDialogState::new(init("game", Runner::Legendary, Platform::Linux));
        assert!(!state.can_install());
        assert!(state.confirm(ConfirmAction::Install).is_err());
        assert!(!state.is_closed());
    }

    #[test]
    fn test_language_must_be_offered() {
        let mut state = InstallDialogState::new(init("game", Runner::Legendary, Platform::Linux));
        let ticket = state.begin_load();
        state
            .apply(LoadEvent::InstallInfo(ticket, Ok(install_info("Game", &["en", "fr"]))))
            .unwrap();

        assert!(!state.select_language("de"));
        assert!(state.select_language("fr"));
        assert_eq!(state.language(), Some("fr"));
    }

    #[test]
    fn test_retarget_resets_title_state() {
        let mut state = InstallDialogState::new(init("Fortnite", Runner::Legendary, Platform::Linux));
        let first = state.begin_load();
        state
            .apply(LoadEvent::InstallInfo(first, Ok(install_info("Fortnite", &["en"]))))
            .unwrap();

        let second = state.retarget(init("other", Runner::Gog, Platform::Linux));

        assert_ne!(first, second);
        assert!(!state.is_loaded());
        assert!(!state.has_selective_downloads());
        assert!(state
            .apply(LoadEvent::InstallInfo(first, Ok(install_info("Late", &["en"]))))
            .unwrap()
            .is_none());
        assert!(!state.is_loaded());
    }

    #[test]
    fn test_retarget_reopens_and_seeds_new_title_downloads() {
        let mut state = InstallDialogState::new(init("other", Runner::Gog, Platform::Linux));
        state.begin_load();
        state.close();

        let ticket = state.retarget(init("Fortnite", Runner::Legendary, Platform::Linux));

        assert!(!state.is_closed());
        assert!(state.has_selective_downloads());
        assert_eq!(state.selected_tags(), ["chunk0", "chunk10"]);
        state
            .apply(LoadEvent::InstallInfo(ticket, Ok(install_info("Fortnite", &["en"]))))
            .unwrap();
        assert_eq!(state.title(), Some("Fortnite"));
    }
}
