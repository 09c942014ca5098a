use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Store backend responsible for a title's install mechanics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runner {
    /// Epic Games Store titles, installed through legendary.
    Legendary,
    Gog,
}

impl Runner {
    pub fn as_str(self) -> &'static str {
        match self {
            Runner::Legendary => "legendary",
            Runner::Gog => "gog",
        }
    }
}

impl fmt::Display for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Runner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legendary" | "epic" => Ok(Runner::Legendary),
            "gog" => Ok(Runner::Gog),
            other => Err(format!("unknown runner '{}' (expected epic or gog)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "linux" => Platform::Linux,
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            _ => Platform::Other,
        }
    }

    pub fn is_linux(self) -> bool {
        self == Platform::Linux
    }

    pub fn is_mac(self) -> bool {
        self == Platform::MacOs
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallInfo {
    pub game: GameMetadata,
    #[serde(default)]
    pub manifest: Option<Manifest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameMetadata {
    pub title: String,
    #[serde(default)]
    pub owned_dlc: Vec<DlcInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DlcInfo {
    pub app_name: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Bytes to fetch from the store.
    #[serde(default)]
    pub download_size: u64,
    /// Bytes on disk once installed.
    #[serde(default)]
    pub disk_size: u64,
    #[serde(default)]
    pub languages: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GameInfo {
    #[serde(default)]
    pub is_linux_native: bool,
    #[serde(default)]
    pub is_mac_native: bool,
}

/// Launcher-wide defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default)]
    pub default_install_path: PathBuf,
    #[serde(default)]
    pub default_wine_prefix: PathBuf,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-title settings. Keys this crate does not know about are carried
/// through `extra` so a read-merge-write cycle never drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wine_prefix: Option<PathBuf>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GameSettings {
    pub fn with_wine_prefix(mut self, prefix: PathBuf) -> Self {
        self.wine_prefix = Some(prefix);
        self
    }
}

/// Last known download progress for a title, as recorded by the installer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstallProgress {
    #[serde(default)]
    pub folder: Option<PathBuf>,
    #[serde(default, deserialize_with = "percent_from_number_or_string")]
    pub percent: Option<f64>,
    #[serde(default)]
    pub bytes: Option<String>,
    #[serde(default)]
    pub eta: Option<String>,
}

impl InstallProgress {
    pub fn percent_complete(&self) -> u8 {
        match self.percent {
            Some(p) if p.is_finite() => p.round().clamp(0.0, 100.0) as u8,
            _ => 0,
        }
    }

    pub fn matches_folder(&self, folder: Option<&PathBuf>) -> bool {
        matches!((self.folder.as_ref(), folder), (Some(a), Some(b)) if a == b)
    }
}

// Installers write the percentage either as a number or as "42.5%".
fn percent_from_number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(text)) => text.trim().trim_end_matches('%').trim().parse().ok(),
        None => None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum InstallTarget {
    /// Adopt an existing installation instead of downloading.
    Import,
    Folder(PathBuf),
}

/// Everything the orchestrator needs for one install or import action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallRequest {
    pub app_name: String,
    pub runner: Runner,
    pub target: InstallTarget,
    /// `None` leaves the choice to the store's default language.
    #[serde(default)]
    pub language: Option<String>,
    /// Defaults to `false`: base game only.
    #[serde(default)]
    pub install_dlcs: bool,
    /// Selective-download tags. Empty means the full download.
    #[serde(default)]
    pub sdl_tags: Vec<String>,
    /// Lets the orchestrator resume a matching partial download.
    #[serde(default)]
    pub previous_progress: Option<InstallProgress>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Queued { request_id: String },
    Finished,
    Aborted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_parses_store_aliases() {
        assert_eq!("epic".parse::<Runner>(), Ok(Runner::Legendary));
        assert_eq!("Legendary".parse::<Runner>(), Ok(Runner::Legendary));
        assert_eq!("gog".parse::<Runner>(), Ok(Runner::Gog));
        assert!("steam".parse::<Runner>().is_err());
    }

    #[test]
    fn test_progress_percent_accepts_text_and_numbers() {
        let text: InstallProgress =
            serde_json::from_str(r#"{"folder": "/games/a", "percent": "41.6%"}"#).unwrap();
        assert_eq!(text.percent_complete(), 42);

        let number: InstallProgress = serde_json::from_str(r#"{"percent": 12.2}"#).unwrap();
        assert_eq!(number.percent_complete(), 12);

        let garbage: InstallProgress = serde_json::from_str(r#"{"percent": "n/a"}"#).unwrap();
        assert_eq!(garbage.percent_complete(), 0);
    }

    #[test]
    fn test_progress_percent_is_clamped() {
        let progress = InstallProgress {
            percent: Some(130.0),
            ..Default::default()
        };
        assert_eq!(progress.percent_complete(), 100);
    }

    #[test]
    fn test_game_settings_keep_unknown_keys() {
        let settings: GameSettings =
            serde_json::from_str(r#"{"winePrefix": "/p", "wineVersion": {"name": "GE"}}"#)
                .unwrap();
        let merged = settings.with_wine_prefix(PathBuf::from("/q"));
        let json = serde_json::to_value(&merged).unwrap();

        assert_eq!(json["winePrefix"], "/q");
        assert_eq!(json["wineVersion"]["name"], "GE");
    }

    #[test]
    fn test_install_target_serialization() {
        let json = serde_json::to_value(InstallTarget::Folder(PathBuf::from("/g"))).unwrap();
        assert_eq!(json["kind"], "folder");
        assert_eq!(json["path"], "/g");

        let import = serde_json::to_value(InstallTarget::Import).unwrap();
        assert_eq!(import["kind"], "import");
    }
}
