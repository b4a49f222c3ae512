//! # Character Source
//!
//! Everything the controllers know about the outside world goes through
//! [`CharacterSource`]:
//!
//! - [`http::HttpSource`]: the public character API, over reqwest.
//! - `fixture::FixtureSource`: canned pages and characters for tests (behind
//!   `cfg(test)` or the `test_utils` feature).
//!
//! Methods return `Send` futures so detail loads can fan episode fetches out
//! onto a tokio `JoinSet`.
//!
//! Sources do not time out on their own. Controllers bound every fetch with
//! [`with_timeout`] so a hung request always ends in a failure state.

use crate::error::{PortalError, Result};
use crate::model::{Character, CharacterPage, Episode};
use std::future::Future;
use std::time::Duration;

#[cfg(any(test, feature = "test_utils"))]
pub mod fixture;
pub mod http;

pub trait CharacterSource {
    /// `GET /character?page=N`
    fn fetch_page(&self, page: u32) -> impl Future<Output = Result<CharacterPage>> + Send;

    /// `GET /character/{id}`
    fn fetch_character(&self, id: u32) -> impl Future<Output = Result<Character>> + Send;

    /// Episode references are full URLs; fetch one as-is.
    fn fetch_episode(&self, url: &str) -> impl Future<Output = Result<Episode>> + Send;
}

/// Run `fut`, failing with [`PortalError::Timeout`] once `limit` passes.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(PortalError::Timeout(limit.as_secs())),
    }
}
