use super::CharacterSource;
use crate::error::{PortalError, Result};
use crate::model::{Character, CharacterPage, Episode, PageInfo, Status};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// A canned character API. Anything not registered answers 404.
#[derive(Default)]
pub struct FixtureSource {
    pages: HashMap<u32, CharacterPage>,
    characters: HashMap<u32, Character>,
    episodes: HashMap<String, Episode>,
    failing_episodes: HashSet<String>,
    hang: AtomicBool,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

pub fn episode_url(n: u32) -> String {
    format!("https://rickandmortyapi.com/api/episode/{}", n)
}

/// A character appearing in episodes `1..=episodes`.
pub fn character(id: u32, name: &str, status: Status, species: &str, episodes: u32) -> Character {
    Character {
        id,
        name: name.to_string(),
        status,
        species: species.to_string(),
        gender: "Male".to_string(),
        image: format!("https://rickandmortyapi.com/api/character/avatar/{}.jpeg", id),
        episodes: (1..=episodes).map(episode_url).collect(),
        ..Default::default()
    }
}

pub fn episode(n: u32) -> Episode {
    Episode {
        id: n,
        name: format!("Episode {}", n),
        code: format!("S01E{:02}", n),
        air_date: String::new(),
    }
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page; its characters become fetchable by id too.
    pub fn with_page(mut self, page: u32, results: Vec<Character>, pages: u32) -> Self {
        for c in &results {
            self.characters.insert(c.id, c.clone());
        }
        let info = PageInfo {
            count: results.len() as u32,
            pages,
            next: None,
            prev: None,
        };
        self.pages.insert(page, CharacterPage { info, results });
        self
    }

    pub fn with_character(mut self, character: Character) -> Self {
        self.characters.insert(character.id, character);
        self
    }

    /// Answer `/character/{id}` with `character`, whatever its own id says.
    pub fn with_record(mut self, id: u32, character: Character) -> Self {
        self.characters.insert(id, character);
        self
    }

    /// Register episodes `1..=count`.
    pub fn with_episodes(mut self, count: u32) -> Self {
        for n in 1..=count {
            self.episodes.insert(episode_url(n), episode(n));
        }
        self
    }

    pub fn with_failing_episode(mut self, n: u32) -> Self {
        self.failing_episodes.insert(episode_url(n));
        self
    }

    /// Every fetch takes `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every later fetch never resolves.
    pub fn set_hang(&self, hang: bool) {
        self.hang.store(hang, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn not_found(url: String) -> PortalError {
    PortalError::Http { status: 404, url }
}

impl CharacterSource for FixtureSource {
    async fn fetch_page(&self, page: u32) -> Result<CharacterPage> {
        self.enter().await;
        self.pages
            .get(&page)
            .cloned()
            .ok_or_else(|| not_found(format!("/character?page={}", page)))
    }

    async fn fetch_character(&self, id: u32) -> Result<Character> {
        self.enter().await;
        self.characters
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(format!("/character/{}", id)))
    }

    async fn fetch_episode(&self, url: &str) -> Result<Episode> {
        self.enter().await;
        if self.failing_episodes.contains(url) {
            return Err(PortalError::Http {
                status: 500,
                url: url.to_string(),
            });
        }
        self.episodes
            .get(url)
            .cloned()
            .ok_or_else(|| not_found(url.to_string()))
    }
}
