//! # Detail Controller
//!
//! The single-character page. Resolves an id from the navigation query,
//! fetches the character, then fetches up to `episode_limit` of its episodes
//! in parallel. The view renders only once everything has arrived: if any
//! fetch fails, the whole page goes to `Failed` and whatever was rendered
//! before is dropped. A single `request_timeout` bounds the whole load.

use crate::cart::{Added, CartStore};
use crate::error::{PortalError, Result};
use crate::model::{Character, Episode};
use crate::price::unit_price;
use crate::source::{with_timeout, CharacterSource};
use crate::store::KeyValueStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, warn};

pub const DEFAULT_EPISODE_LIMIT: usize = 10;

/// Pull the character id out of a navigation query.
///
/// Accepts `?id=5`, `id=5&tab=episodes`, `character.html?id=5` or a bare `5`.
pub fn resolve_identifier(query: &str) -> Result<u32> {
    let query = query.trim();
    let query = query.split('#').next().unwrap_or_default();
    let query = query.split_once('?').map_or(query, |(_, q)| q);

    let raw = if query.contains('=') {
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "id")
            .map(|(_, value)| value.trim())
    } else {
        Some(query.trim())
    };

    match raw {
        None | Some("") => Err(PortalError::MissingIdentifier),
        Some(value) => value
            .parse::<u32>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| PortalError::InvalidIdentifier(value.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub character: Character,
    pub unit_price: u64,
    /// The first `episode_limit` episodes, in the character's order.
    pub episodes: Vec<Episode>,
    /// Episodes the character appears in beyond those shown.
    pub more_episodes: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Idle,
    Loading { id: u32 },
    Rendered(Box<DetailView>),
    Failed {
        id: u32,
        message: String,
        /// Whether asking again could succeed.
        retryable: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailTicket {
    id: u32,
    generation: u64,
}

impl DetailTicket {
    pub fn id(&self) -> u32 {
        self.id
    }
}

pub struct DetailController {
    state: DetailState,
    generation: u64,
    episode_limit: usize,
    timeout: Duration,
}

impl DetailController {
    pub fn new(episode_limit: usize, timeout: Duration) -> Self {
        Self {
            state: DetailState::Idle,
            generation: 0,
            episode_limit,
            timeout,
        }
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn view(&self) -> Option<&DetailView> {
        match &self.state {
            DetailState::Rendered(view) => Some(view),
            _ => None,
        }
    }

    /// Enter `Loading` for `id`. Any earlier ticket becomes stale.
    pub fn begin(&mut self, id: u32) -> DetailTicket {
        self.generation += 1;
        self.state = DetailState::Loading { id };
        DetailTicket {
            id,
            generation: self.generation,
        }
    }

    /// Apply a finished load. Returns false if the ticket was stale.
    pub fn complete(&mut self, ticket: DetailTicket, outcome: Result<DetailView>) -> bool {
        let current = ticket.generation == self.generation
            && self.state == DetailState::Loading { id: ticket.id };
        if !current {
            debug!(id = ticket.id, "discarding stale detail response");
            return false;
        }

        self.state = match outcome {
            Ok(mut view) if view.character.id == ticket.id || view.character.id == 0 => {
                // A record with no id is the one we asked for
                view.character.id = ticket.id;
                debug!(id = ticket.id, episodes = view.episodes.len(), "detail rendered");
                DetailState::Rendered(Box::new(view))
            }
            Ok(view) => {
                warn!(
                    asked = ticket.id,
                    got = view.character.id,
                    "API answered with another character"
                );
                DetailState::Failed {
                    id: ticket.id,
                    message: format!(
                        "Asked for character {} but received {}",
                        ticket.id, view.character.id
                    ),
                    retryable: false,
                }
            }
            Err(e) => {
                warn!(id = ticket.id, error = %e, "detail load failed");
                DetailState::Failed {
                    id: ticket.id,
                    message: format!("Failed to load character {}: {}", ticket.id, e),
                    retryable: e.is_retryable(),
                }
            }
        };
        true
    }

    /// Navigation away from the page.
    pub fn cancel(&mut self) {
        self.generation += 1;
        if matches!(self.state, DetailState::Loading { .. }) {
            self.state = DetailState::Idle;
        }
    }

    pub async fn load<C>(&mut self, source: &Arc<C>, id: u32)
    where
        C: CharacterSource + Send + Sync + 'static,
    {
        let ticket = self.begin(id);
        // One bound for the character and its episodes together
        let fetch = fetch_view(source, id, self.episode_limit);
        let outcome = with_timeout(self.timeout, fetch).await;
        let _ = self.complete(ticket, outcome);
    }

    /// Resolve the id from `query`, then load. A missing id fails before any fetch.
    pub async fn load_from_query<C>(&mut self, source: &Arc<C>, query: &str) -> Result<u32>
    where
        C: CharacterSource + Send + Sync + 'static,
    {
        let id = resolve_identifier(query)?;
        self.load(source, id).await;
        Ok(id)
    }

    /// Add one unit of the character on screen.
    pub fn add_to_cart<S: KeyValueStore>(&self, cart: &mut CartStore<S>) -> Result<Added> {
        let view = self
            .view()
            .ok_or_else(|| PortalError::Api("No character is loaded".to_string()))?;
        Ok(cart.add_character(&view.character, view.unit_price, 1))
    }
}

async fn fetch_view<C>(source: &Arc<C>, id: u32, episode_limit: usize) -> Result<DetailView>
where
    C: CharacterSource + Send + Sync + 'static,
{
    let character = source.fetch_character(id).await?;
    let shown: Vec<String> = character
        .episodes
        .iter()
        .take(episode_limit)
        .cloned()
        .collect();
    let more_episodes = character.episodes.len() - shown.len();

    let mut tasks = JoinSet::new();
    for (slot, url) in shown.into_iter().enumerate() {
        let source = Arc::clone(source);
        tasks.spawn(async move { (slot, source.fetch_episode(&url).await) });
    }

    let mut slots: Vec<Option<Episode>> = vec![None; tasks.len()];
    while let Some(joined) = tasks.join_next().await {
        let (slot, fetched) =
            joined.map_err(|e| PortalError::Api(format!("Episode fetch aborted: {}", e)))?;
        slots[slot] = Some(fetched?);
    }

    Ok(DetailView {
        unit_price: unit_price(&character),
        character,
        episodes: slots.into_iter().flatten().collect(),
        more_episodes,
    })
}
