//! # Configuration
//!
//! Settings are loaded by [`confique`] in priority order:
//! 1. **Environment variables**: `PORTALZ_API_BASE_URL`, `PORTALZ_MAX_PAGE`, etc.
//! 2. **Config file**: `portalz.toml` in the data directory.
//! 3. **Compiled defaults**: the `#[config(default = ...)]` values below.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `api_base_url` | `https://rickandmortyapi.com/api` | Character API root |
//! | `max_page` | `42` | Highest catalog page, until the API reports its own count |
//! | `episode_limit` | `10` | Episodes shown on the detail page (0 shows none) |
//! | `request_timeout_secs` | `10` | Bound on a page load or a whole detail load |
//! | `storage_quota_bytes` | `5242880` | Byte limit for the stored cart |

use crate::error::{PortalError, Result};
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "portalz.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// Root of the character API, without a trailing slash.
    #[config(env = "PORTALZ_API_BASE_URL", default = "https://rickandmortyapi.com/api")]
    pub api_base_url: String,

    #[config(env = "PORTALZ_MAX_PAGE", default = 42)]
    pub max_page: u32,

    #[config(env = "PORTALZ_EPISODE_LIMIT", default = 10)]
    pub episode_limit: usize,

    #[config(env = "PORTALZ_REQUEST_TIMEOUT_SECS", default = 10)]
    pub request_timeout_secs: u64,

    #[config(env = "PORTALZ_STORAGE_QUOTA_BYTES", default = 5242880)]
    pub storage_quota_bytes: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base_url: crate::source::http::DEFAULT_API_BASE_URL.to_string(),
            max_page: crate::catalog::DEFAULT_MAX_PAGE,
            episode_limit: crate::detail::DEFAULT_EPISODE_LIMIT,
            request_timeout_secs: 10,
            storage_quota_bytes: crate::store::fs::DEFAULT_QUOTA_BYTES,
        }
    }
}

impl PortalConfig {
    /// Load from the environment, then `portalz.toml` in `data_dir` if present.
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let config = Self::builder()
            .env()
            .file(data_dir.as_ref().join(CONFIG_FILENAME))
            .load()
            .map_err(|e| PortalError::Config(e.to_string()))?;
        config.validated()
    }

    fn validated(self) -> Result<Self> {
        if self.max_page == 0 {
            return Err(PortalError::Config("max_page must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(PortalError::Config(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        if self.storage_quota_bytes == 0 {
            return Err(PortalError::Config(
                "storage_quota_bytes must be at least 1".into(),
            ));
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `(key, value)` pairs for `portalz config`.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("api_base_url", self.api_base_url.clone()),
            ("max_page", self.max_page.to_string()),
            ("episode_limit", self.episode_limit.to_string()),
            ("request_timeout_secs", self.request_timeout_secs.to_string()),
            ("storage_quota_bytes", self.storage_quota_bytes.to_string()),
        ]
    }
}
