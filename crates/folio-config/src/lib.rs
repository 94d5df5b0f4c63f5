use std::path::{Path, PathBuf};

use anyhow::Context;
use folio_core::{Layout, Theme};
use serde::{Deserialize, Serialize};

/// Settings for folio, read from `config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub github: GitHubSettings,

    #[serde(default)]
    pub profile: ProfileSettings,

    #[serde(default)]
    pub defaults: DefaultsSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Database file; the platform data directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSettings {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Environment variable holding the access token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default = "default_per_page")]
    pub per_page: u32,

    #[serde(default = "default_commit_scan_limit")]
    pub commit_scan_limit: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSettings {
    #[serde(default = "default_owner")]
    pub owner: String,
}

/// Style used before any configuration has been saved
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsSettings {
    #[serde(default)]
    pub layout: Layout,

    #[serde(default)]
    pub theme: Theme,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token_env: default_token_env(),
            per_page: default_per_page(),
            commit_scan_limit: default_commit_scan_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            owner: default_owner(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_per_page() -> u32 {
    100
}

fn default_commit_scan_limit() -> usize {
    30
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_owner() -> String {
    "default".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

impl GitHubSettings {
    /// Token from the configured environment variable
    pub fn token(&self) -> anyhow::Result<String> {
        match std::env::var(&self.token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => anyhow::bail!(
                "GitHub access token not found. Set {} or use --from FILE.",
                self.token_env
            ),
        }
    }
}

impl Settings {
    /// Load settings from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            Self::load_from(&path)
        } else {
            let settings = Settings::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&settings)?;
            std::fs::write(&path, content)?;
            Ok(settings)
        }
    }

    /// Load settings from an explicit file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    /// Get settings file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "folio", "folio") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.folio/config.toml")
        }
    }
}
