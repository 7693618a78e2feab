//! Configuration types for avniconf components.
//!
//! Effective values are layered: built-in defaults, then the optional
//! `settings.toml` file, then CLI flags and environment variables (applied
//! by the CLI crate).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// HTTP client configuration for calls to the Avni server.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    /// Timeout for lookup (GET) requests.
    pub read_timeout: Duration,
    /// Timeout for creation (POST) requests.
    pub write_timeout: Duration,
    /// Attempts per lookup before giving up. Creations are never retried.
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

/// How definition names are compared with remote record names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatch {
    Exact,
    #[default]
    CaseInsensitive,
}

impl NameMatch {
    /// Compares two names under this policy. Surrounding whitespace is ignored.
    ///
    /// ```
    /// use avniconf_core::NameMatch;
    ///
    /// assert!(NameMatch::CaseInsensitive.matches("State", "state"));
    /// assert!(!NameMatch::Exact.matches("State", "state"));
    /// ```
    pub fn matches(&self, wanted: &str, candidate: &str) -> bool {
        let (wanted, candidate) = (wanted.trim(), candidate.trim());
        match self {
            NameMatch::Exact => wanted == candidate,
            NameMatch::CaseInsensitive => wanted.to_lowercase() == candidate.to_lowercase(),
        }
    }
}

/// Reconciliation behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileConfig {
    /// Look up every entity before creating it.
    pub require_existence_check: bool,
    pub name_match: NameMatch,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            require_existence_check: true,
            name_match: NameMatch::default(),
        }
    }
}

/// Contents of `settings.toml`.
///
/// ```toml
/// [server]
/// base_url = "https://staging.avniproject.org"
/// user_name = "admin@demo"
/// org_name = "demo"
/// org_type = "trial"
///
/// [http]
/// read_timeout_secs = 10
/// write_timeout_secs = 30
/// max_retries = 3
///
/// [reconcile]
/// name_match = "case_insensitive"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub http: HttpSettings,
    pub reconcile: ReconcileSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    pub base_url: Option<String>,
    pub user_name: Option<String>,
    pub org_name: Option<String>,
    pub org_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpSettings {
    pub read_timeout_secs: Option<u64>,
    pub write_timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconcileSettings {
    pub name_match: Option<NameMatch>,
}

impl Settings {
    /// Applies file overrides on top of the built-in HTTP defaults.
    pub fn http_config(&self) -> HttpConfig {
        let mut config = HttpConfig::default();
        if let Some(secs) = self.http.read_timeout_secs {
            config.read_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.http.write_timeout_secs {
            config.write_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = self.http.max_retries {
            config.max_retries = retries.max(1);
        }
        config
    }

    pub fn reconcile_config(&self) -> ReconcileConfig {
        ReconcileConfig {
            name_match: self.reconcile.name_match.unwrap_or_default(),
            ..ReconcileConfig::default()
        }
    }
}

/// Default location of the settings file: `<config_dir>/avniconf/settings.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("avniconf").join("settings.toml"))
}

/// Loads settings from `path`, or from the default location when `path` is `None`.
///
/// A missing file at the default location yields `Settings::default()`;
/// a missing file at an explicit path is an error.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, AppError> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path() {
            Some(p) => (p, false),
            None => return Ok(Settings::default()),
        },
    };

    if !path.exists() {
        if explicit {
            return Err(AppError::Settings(format!(
                "settings file not found: {}",
                path.display()
            )));
        }
        tracing::debug!("No settings file at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    let raw = std::fs::read_to_string(&path)
        .map_err(|e| AppError::Settings(format!("{}: {}", path.display(), e)))?;
    toml::from_str(&raw).map_err(|e| AppError::Settings(format!("{}: {}", path.display(), e)))
}
