//! Plugin configuration.
//!
//! Settings are read from `~/.zeedas/config.toml`; a missing file yields the
//! defaults. The engine never writes this file back.
//!
//! ```toml
//! [settings]
//! api_key = "..."
//! transport = "cli"            # or "http"
//! status_bar_team = true
//!
//! [cli]
//! path = "/usr/local/bin/zeedas-cli"
//!
//! [http]
//! timeout_secs = 30
//!
//! [plugin]
//! app_name = "Visual Studio Code"
//! editor_version = "1.90.0"
//! ```
//!
//! `ZEEDAS_API_KEY`, `ZEEDAS_API_URL` and `ZEEDAS_DEBUG_LOG` override the
//! file.

use crate::error::{Result, ZeedasError};
use crate::storage::StorageConfig;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://plugin-staging.zeedas.com/api/v1";

const API_KEY_ENV: &str = "ZEEDAS_API_KEY";
const API_URL_ENV: &str = "ZEEDAS_API_URL";
const DEBUG_ENV: &str = "ZEEDAS_DEBUG_LOG";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Editor application names mapped to the agent identifier sent upstream.
const APP_AGENTS: &[(&str, &str)] = &[
    ("Arduino IDE", "arduino"),
    ("Azure Data Studio", "azdata"),
    ("SQL Operations Studio", "sqlops"),
    ("Visual Studio Code", "vscode"),
    ("Onivim", "onivim"),
    ("Onivim 2", "onivim"),
];

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Cli,
    Http,
}

impl std::str::FromStr for TransportKind {
    type Err = ZeedasError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cli" => Ok(Self::Cli),
            "http" => Ok(Self::Http),
            other => Err(ZeedasError::InvalidSetting {
                key: "transport".to_string(),
                reason: format!("expected \"cli\" or \"http\", got \"{}\"", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ZeedasConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub cli: CliSettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub plugin: PluginIdentity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub transport: TransportKind,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_true")]
    pub status_bar_enabled: bool,
    #[serde(default = "default_true")]
    pub status_bar_coding_activity: bool,
    #[serde(default = "default_true")]
    pub status_bar_team: bool,
    #[serde(default)]
    pub status_bar_hide_categories: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: None,
            transport: TransportKind::default(),
            disabled: false,
            debug: false,
            status_bar_enabled: true,
            status_bar_coding_activity: true,
            status_bar_team: true,
            status_bar_hide_categories: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CliSettings {
    /// Activity CLI binary; defaults to `~/.zeedas/zeedas-cli`.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Passed as `--config` when set (portable installs).
    #[serde(default)]
    pub config_file: Option<PathBuf>,
    /// Passed as `--log-file` when set.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Identity of the editor and plugin, used to build the user agent.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginIdentity {
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default = "default_editor_version")]
    pub editor_version: String,
    #[serde(default = "default_plugin_name")]
    pub plugin_name: String,
    #[serde(default = "default_plugin_version")]
    pub plugin_version: String,
}

impl Default for PluginIdentity {
    fn default() -> Self {
        Self {
            app_name: None,
            editor_version: default_editor_version(),
            plugin_name: default_plugin_name(),
            plugin_version: default_plugin_version(),
        }
    }
}

impl PluginIdentity {
    /// Agent identifier for the host editor; unknown editors report as `vscode`.
    pub fn agent(&self) -> &'static str {
        self.app_name
            .as_deref()
            .and_then(|name| {
                APP_AGENTS
                    .iter()
                    .find(|(app, _)| *app == name)
                    .map(|(_, agent)| *agent)
            })
            .unwrap_or("vscode")
    }

    /// `{agent}/{editor_version} {plugin_name}/{plugin_version}`
    pub fn user_agent(&self) -> String {
        format!(
            "{}/{} {}/{}",
            self.agent(),
            self.editor_version,
            self.plugin_name,
            self.plugin_version
        )
    }
}

fn default_true() -> bool {
    true
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_editor_version() -> String {
    "0.0.0".to_string()
}

fn default_plugin_name() -> String {
    "vscode-zeedas".to_string()
}

fn default_plugin_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl ZeedasConfig {
    /// Loads the config file (defaults when missing) and applies environment overrides.
    pub fn load(storage: &StorageConfig, path: Option<&Path>) -> Result<Self> {
        let default_path = storage.config_file();
        let mut config = load_config_file(path.unwrap_or(&default_path))?;
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|value| !value.trim().is_empty()) {
            self.settings.api_key = Some(key.trim().to_string());
        }
        if let Some(url) = lookup(API_URL_ENV).filter(|value| !value.trim().is_empty()) {
            self.settings.api_url = Some(url.trim().to_string());
        }
        if let Some(flag) = lookup(DEBUG_ENV) {
            if matches!(flag.as_str(), "1" | "true" | "TRUE" | "yes" | "YES") {
                self.settings.debug = true;
            }
        }
    }

    /// API URL with surrounding slashes trimmed, falling back to the public endpoint.
    pub fn api_url(&self) -> String {
        self.settings
            .api_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .to_string()
    }

    pub fn cli_binary(&self, storage: &StorageConfig) -> PathBuf {
        self.cli
            .path
            .clone()
            .unwrap_or_else(|| storage.cli_binary())
    }
}

fn load_config_file(path: &Path) -> Result<ZeedasConfig> {
    if !path.exists() {
        return Ok(ZeedasConfig::default());
    }

    let content = fs_err::read_to_string(path).map_err(|source| ZeedasError::Io {
        context: format!("reading config {}", path.display()),
        source,
    })?;
    toml::from_str::<ZeedasConfig>(&content).map_err(|err| ZeedasError::ConfigMalformed {
        path: path.to_path_buf(),
        details: err.to_string(),
    })
}
