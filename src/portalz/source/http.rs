use super::CharacterSource;
use crate::error::{PortalError, Result};
use crate::model::{Character, CharacterPage, Episode};
use serde::de::DeserializeOwned;
use tracing::debug;

pub const DEFAULT_API_BASE_URL: &str = "https://rickandmortyapi.com/api";

pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("portalz/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn page_url(&self, page: u32) -> String {
        format!("{}/character?page={}", self.base_url, page)
    }

    pub fn character_url(&self, id: u32) -> String {
        format!("{}/character/{}", self.base_url, id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url, "GET");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PortalError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.json::<T>().await?)
    }
}

impl CharacterSource for HttpSource {
    async fn fetch_page(&self, page: u32) -> Result<CharacterPage> {
        self.get_json(&self.page_url(page)).await
    }

    async fn fetch_character(&self, id: u32) -> Result<Character> {
        self.get_json(&self.character_url(id)).await
    }

    async fn fetch_episode(&self, url: &str) -> Result<Episode> {
        self.get_json(url).await
    }
}
