//! Shared settings used across the portal crates.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file consulted when `PORTAL_CONFIG` is unset (extension optional, resolved by `config`).
pub const DEFAULT_CONFIG_PATH: &str = "config/portal";

/// Portal API settings. Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Base URL of the REST API gateway; endpoints such as `/api/share` are appended to it.
    pub api_base_url: String,
    /// Per-request timeout applied by the HTTP client.
    pub request_timeout_secs: u64,
    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    format!("portal-sharing/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 30,
            user_agent: default_user_agent(),
        }
    }
}

impl PortalConfig {
    /// Load config from file and environment. Precedence: env `PORTAL__*` > file (`PORTAL_CONFIG` path or `config/portal`) > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("PORTAL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Same as [`PortalConfig::load`] with an explicit file path. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let builder = config::Config::builder()
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("user_agent", defaults.user_agent)?;

        let builder = if path.exists() {
            tracing::debug!(path = %path.display(), "loading portal config file");
            builder.add_source(config::File::from(path))
        } else {
            builder.add_source(config::File::with_name(&path.to_string_lossy()).required(false))
        };

        let built = builder
            .add_source(config::Environment::with_prefix("PORTAL").separator("__"))
            .build()?;

        built.try_deserialize()
    }

    /// `api_base_url` without a trailing slash, ready for endpoint concatenation.
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}
