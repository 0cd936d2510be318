//! Configuration resolution for alertbridge.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/alertbridge/settings.json)
//! 3. Explicit config file (`--config`)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default Slide API endpoint.
pub const DEFAULT_SLIDE_URL: &str = "https://api.slide.tech";

/// Default timeout applied to every outbound API call.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Complete alertbridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub slide: SlideSettings,
    #[serde(default)]
    pub connectwise: ConnectWiseSettings,
    #[serde(default)]
    pub service: ServiceSettings,
}

/// Credentials for the backup-monitoring (source) API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideSettings {
    pub base_url: String,
    pub api_key: String,
}

impl Default for SlideSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SLIDE_URL.to_string(),
            api_key: String::new(),
        }
    }
}

/// Credentials for the ticketing (target) API.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConnectWiseSettings {
    pub base_url: String,
    pub company_id: String,
    pub public_key: String,
    pub private_key: String,
    pub client_id: String,
}

/// Process-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub database_path: Option<PathBuf>,
    pub log_level: String,
    /// Unset means [`DEFAULT_HTTP_TIMEOUT_SECS`]. Zero fails to parse.
    pub http_timeout_secs: Option<NonZeroU64>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: "info".to_string(),
            http_timeout_secs: None,
        }
    }
}

impl Config {
    /// Resolved database path: configured value or the per-user default.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.service.database_path.clone().or_else(database_path)
    }

    /// Outbound request timeout.
    pub fn http_timeout(&self) -> std::time::Duration {
        let secs = self
            .service
            .http_timeout_secs
            .map_or(DEFAULT_HTTP_TIMEOUT_SECS, NonZeroU64::get);
        std::time::Duration::from_secs(secs)
    }
}

/// Load configuration with hierarchical resolution.
///
/// A missing global file is skipped; a missing explicit file is an error.
pub fn load_config(config_file: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            let global = load_config_file(&global_path)?;
            merge_config(&mut config, global);
        }
    }

    if let Some(path) = config_file {
        let explicit = load_config_file(path)?;
        merge_config(&mut config, explicit);
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("alertbridge").join("settings.json"))
}

/// Get the default mapping store path: ~/.alertbridge/alertbridge.db
pub fn database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".alertbridge").join("alertbridge.db"))
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn overlay(base: &mut String, value: String) {
    if !value.is_empty() {
        *base = value;
    }
}

fn merge_config(base: &mut Config, overlay_cfg: Config) {
    overlay(&mut base.slide.base_url, overlay_cfg.slide.base_url);
    overlay(&mut base.slide.api_key, overlay_cfg.slide.api_key);

    let cw = overlay_cfg.connectwise;
    overlay(&mut base.connectwise.base_url, cw.base_url);
    overlay(&mut base.connectwise.company_id, cw.company_id);
    overlay(&mut base.connectwise.public_key, cw.public_key);
    overlay(&mut base.connectwise.private_key, cw.private_key);
    overlay(&mut base.connectwise.client_id, cw.client_id);

    if overlay_cfg.service.database_path.is_some() {
        base.service.database_path = overlay_cfg.service.database_path;
    }
    overlay(&mut base.service.log_level, overlay_cfg.service.log_level);
    if overlay_cfg.service.http_timeout_secs.is_some() {
        base.service.http_timeout_secs = overlay_cfg.service.http_timeout_secs;
    }
}

/// Apply environment overrides, reading variables through `lookup`.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let string_vars: [(&str, &mut String); 8] = [
        ("SLIDE_API_URL", &mut config.slide.base_url),
        ("SLIDE_API_KEY", &mut config.slide.api_key),
        ("CONNECTWISE_API_URL", &mut config.connectwise.base_url),
        ("CONNECTWISE_COMPANY_ID", &mut config.connectwise.company_id),
        ("CONNECTWISE_PUBLIC_KEY", &mut config.connectwise.public_key),
        ("CONNECTWISE_PRIVATE_KEY", &mut config.connectwise.private_key),
        ("CONNECTWISE_CLIENT_ID", &mut config.connectwise.client_id),
        ("ALERTBRIDGE_LOG_LEVEL", &mut config.service.log_level),
    ];
    for (key, slot) in string_vars {
        if let Some(val) = lookup(key) {
            overlay(slot, val);
        }
    }

    if let Some(val) = lookup("DATABASE_PATH") {
        if !val.is_empty() {
            config.service.database_path = Some(PathBuf::from(val));
        }
    }
    if let Some(val) = lookup("ALERTBRIDGE_HTTP_TIMEOUT_SECS") {
        if let Ok(n) = val.parse::<NonZeroU64>() {
            config.service.http_timeout_secs = Some(n);
        }
    }
}
