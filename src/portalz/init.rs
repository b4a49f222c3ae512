use crate::api::PortalApi;
use crate::config::PortalConfig;
use crate::error::{PortalError, Result};
use crate::source::http::HttpSource;
use crate::store::fs::FileStorage;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::debug;

/// Overrides the data directory. Tests point it at a temp dir.
pub const HOME_ENV: &str = "PORTALZ_HOME";

pub struct PortalContext {
    pub api: PortalApi<FileStorage, HttpSource>,
    pub data_dir: PathBuf,
}

/// `$PORTALZ_HOME` if set and non-empty, otherwise the OS data directory.
pub fn data_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "portalz", "portalz")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| PortalError::Config("Could not determine a data directory".into()))
}

/// Load config, open storage and rehydrate the cart.
pub fn initialize() -> Result<PortalContext> {
    let data_dir = data_dir()?;
    let config = PortalConfig::load(&data_dir)?;
    debug!(data_dir = %data_dir.display(), api = %config.api_base_url, "initializing");

    let storage = FileStorage::new(data_dir.clone()).with_quota(config.storage_quota_bytes);
    let source = HttpSource::new(config.api_base_url.clone())?;
    let api = PortalApi::new(storage, source, config);

    Ok(PortalContext { api, data_dir })
}
