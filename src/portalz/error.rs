use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Character ID not found in navigation query")]
    MissingIdentifier,

    #[error("Invalid character ID: {0}")]
    InvalidIdentifier(String),

    #[error("Stored cart is corrupt: {0}")]
    StorageCorrupt(String),

    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    StorageQuotaExceeded { needed: u64, quota: u64 },

    #[error("Amount for character {id} is too large")]
    CartOverflow { id: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Api Error: {0}")]
    Api(String),
}

impl PortalError {
    /// Network-side failures the user can retry by hand.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PortalError::Network(_) | PortalError::Http { .. } | PortalError::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
