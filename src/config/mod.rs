//! Configuration for the Ezlo cloud handshake
//!
//! Values come from built-in defaults, an optional TOML file and `EZLO_*`
//! environment variables, in that order. Command line flags are applied last
//! by the binary.

pub mod credentials;

use crate::error::{EzloError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs, time::Duration};
use tracing::{debug, warn};
use url::Url;

/// MiOS auth endpoint; the user id is appended as the last path segment
pub const DEFAULT_AUTH_URL: &str = "https://vera-us-oem-autha11.mios.com/autha/auth/username/";

/// Legacy identity to cloud token exchange endpoint
pub const DEFAULT_TOKEN_EXCHANGE_URL: &str =
    "https://cloud.ezlo.com/mca-router/token/exchange/legacy-to-cloud/";

/// Ezlo cloud request endpoint used for `access_keys_sync`
pub const DEFAULT_KEY_SYNC_URL: &str = "https://api-cloud.ezlo.com/v1/request";

/// Port the hub serves its local HTTPS API on
pub const HUB_LOCAL_PORT: u16 = 17000;

const CONFIG_DIR_NAME: &str = "ezlo-curl-config";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Cloud endpoints and request settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Password-hash authentication endpoint (must end with `/`)
    pub auth_url: Url,

    /// Token exchange endpoint
    pub token_exchange_url: Url,

    /// Access key sync endpoint
    pub key_sync_url: Url,

    /// Total time allowed per request
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Time allowed to establish a connection
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Verify TLS certificates of the cloud endpoints
    pub verify_ssl: bool,

    /// `PK_Oem` query parameter of the auth call
    pub oem_id: u32,

    /// `TokenVersion` query parameter of the auth call
    pub token_version: u32,

    /// Protocol version sent in `access_keys_sync` params
    pub key_sync_version: u32,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            auth_url: Url::parse(DEFAULT_AUTH_URL).expect("valid default auth URL"),
            token_exchange_url: Url::parse(DEFAULT_TOKEN_EXCHANGE_URL)
                .expect("valid default token exchange URL"),
            key_sync_url: Url::parse(DEFAULT_KEY_SYNC_URL).expect("valid default key sync URL"),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            verify_ssl: false,
            oem_id: 1,
            token_version: 2,
            key_sync_version: 53,
        }
    }
}

impl CloudConfig {
    /// Default config file location, `<config_dir>/ezlo-curl-config/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from defaults, file and environment
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// read only when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| {
            EzloError::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| EzloError::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Apply `EZLO_*` environment overrides
    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(url) = env_url("EZLO_AUTH_URL")? {
            self.auth_url = url;
        }
        if let Some(url) = env_url("EZLO_TOKEN_EXCHANGE_URL")? {
            self.token_exchange_url = url;
        }
        if let Some(url) = env_url("EZLO_KEY_SYNC_URL")? {
            self.key_sync_url = url;
        }
        if let Ok(timeout) = env::var("EZLO_TIMEOUT") {
            self.timeout = humantime_serde::re::humantime::parse_duration(&timeout)
                .map_err(|e| EzloError::config(format!("Invalid EZLO_TIMEOUT '{timeout}': {e}")))?;
        }
        if let Ok(verify) = env::var("EZLO_VERIFY_SSL") {
            self.verify_ssl = parse_bool(&verify).ok_or_else(|| {
                EzloError::config(format!("Invalid EZLO_VERIFY_SSL '{verify}'"))
            })?;
        }
        Ok(())
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if !self.auth_url.path().ends_with('/') {
            return Err(EzloError::config(format!(
                "auth_url must end with '/', got {}",
                self.auth_url
            )));
        }
        for url in [&self.auth_url, &self.token_exchange_url, &self.key_sync_url] {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(EzloError::config(format!("Unsupported URL scheme: {url}")));
            }
            if url.scheme() == "http" {
                warn!("Endpoint {url} is not using TLS");
            }
        }
        if self.timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(EzloError::config("Timeouts must be greater than zero"));
        }
        Ok(())
    }
}

fn env_url(name: &str) -> Result<Option<Url>> {
    match env::var(name) {
        Ok(value) => Url::parse(&value)
            .map(Some)
            .map_err(|e| EzloError::config(format!("Invalid {name} '{value}': {e}"))),
        Err(_) => Ok(None),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
