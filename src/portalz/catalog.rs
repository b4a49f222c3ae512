//! # Catalog Controller
//!
//! Drives the paginated character grid.
//!
//! ```text
//!            request_page               complete(Ok)
//!   Idle ─────────────────▶ Loading ───────────────▶ Rendered
//!                              │                        │
//!                              │ complete(Err)          │ request_page
//!                              ▼                        ▼
//!                           Failed ──── retry ───▶ Loading
//! ```
//!
//! Only one page fetch is in flight at a time: asking for a page while
//! `Loading` is ignored ([`PageRequest::Busy`]). Pages outside
//! `1..=max_page` are never requested.
//!
//! Each request gets a [`PageTicket`] stamped with a generation number.
//! [`CatalogController::cancel`] (navigating away) bumps the generation, so a
//! response that arrives afterwards is recognised as stale and dropped.
//!
//! Per-card pending quantities (the `- 1 +` selector) live here as plain
//! state, reset to 1 whenever a page is rendered.

use crate::cart::{Added, CartStore};
use crate::error::{PortalError, Result};
use crate::model::{Character, CharacterPage};
use crate::price::unit_price;
use crate::source::{with_timeout, CharacterSource};
use crate::store::KeyValueStore;
use std::time::Duration;
use tracing::{debug, warn};

/// The character API served 42 pages when this was written.
pub const DEFAULT_MAX_PAGE: u32 = 42;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogState {
    Idle,
    Loading { page: u32 },
    Rendered { page: u32 },
    Failed {
        page: u32,
        message: String,
        /// Whether asking again could succeed.
        retryable: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub character: Character,
    pub price: u64,
    /// Quantity the next add-to-cart will use. Never below 1.
    pub pending: u32,
}

impl Card {
    fn new(character: Character) -> Self {
        let price = unit_price(&character);
        Self {
            character,
            price,
            pending: 1,
        }
    }

    pub fn pending_total(&self) -> u64 {
        u64::from(self.pending) * self.price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    page: u32,
    generation: u64,
}

impl PageTicket {
    pub fn page(&self) -> u32 {
        self.page
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Issued(PageTicket),
    /// A fetch is already in flight; this request was dropped.
    Busy,
    OutOfRange { page: u32, max: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

pub struct CatalogController {
    state: CatalogState,
    cards: Vec<Card>,
    max_page: u32,
    generation: u64,
    timeout: Duration,
}

impl CatalogController {
    pub fn new(max_page: u32, timeout: Duration) -> Self {
        Self {
            state: CatalogState::Idle,
            cards: Vec::new(),
            max_page: max_page.max(1),
            generation: 0,
            timeout,
        }
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: u32) -> Option<&Card> {
        self.cards.iter().find(|c| c.character.id == id)
    }

    pub fn max_page(&self) -> u32 {
        self.max_page
    }

    /// The page currently on screen, if any.
    pub fn current_page(&self) -> Option<u32> {
        match self.state {
            CatalogState::Rendered { page } => Some(page),
            _ => None,
        }
    }

    pub fn request_page(&mut self, page: u32) -> PageRequest {
        if let CatalogState::Loading { page: loading } = self.state {
            debug!(page, loading, "page request ignored, fetch in flight");
            return PageRequest::Busy;
        }
        if page < 1 || page > self.max_page {
            debug!(page, max = self.max_page, "page out of range, not requested");
            return PageRequest::OutOfRange {
                page,
                max: self.max_page,
            };
        }

        self.generation += 1;
        self.state = CatalogState::Loading { page };
        PageRequest::Issued(PageTicket {
            page,
            generation: self.generation,
        })
    }

    pub fn complete(&mut self, ticket: PageTicket, outcome: Result<CharacterPage>) -> Completion {
        let current = ticket.generation == self.generation
            && self.state == CatalogState::Loading { page: ticket.page };
        if !current {
            debug!(page = ticket.page, "discarding stale page response");
            return Completion::Stale;
        }

        match outcome {
            Ok(page) => {
                if page.info.pages > 0 {
                    self.max_page = page.info.pages;
                }
                debug!(
                    page = ticket.page,
                    cards = page.results.len(),
                    "page rendered"
                );
                let total = page.results.len();
                self.cards = page
                    .results
                    .into_iter()
                    .filter(|c| c.id > 0)
                    .map(Card::new)
                    .collect();
                if self.cards.len() < total {
                    warn!(
                        page = ticket.page,
                        dropped = total - self.cards.len(),
                        "dropping characters without an id"
                    );
                }
                self.state = CatalogState::Rendered { page: ticket.page };
            }
            Err(e) => {
                warn!(page = ticket.page, error = %e, "page load failed");
                self.cards.clear();
                self.state = CatalogState::Failed {
                    page: ticket.page,
                    message: format!("Could not load page {}: {}", ticket.page, e),
                    retryable: e.is_retryable(),
                };
            }
        }
        Completion::Applied
    }

    /// Navigation away: any response still in flight becomes stale.
    pub fn cancel(&mut self) {
        self.generation += 1;
        if matches!(self.state, CatalogState::Loading { .. }) {
            self.state = CatalogState::Idle;
        }
    }

    /// Request, fetch (bounded by the timeout) and complete one page.
    pub async fn load_page<C: CharacterSource>(&mut self, source: &C, page: u32) -> PageRequest {
        let request = self.request_page(page);
        if let PageRequest::Issued(ticket) = request {
            let outcome = with_timeout(self.timeout, source.fetch_page(page)).await;
            let _ = self.complete(ticket, outcome);
        }
        request
    }

    /// Re-enter `Loading` for the page that failed. `None` if nothing failed.
    pub async fn retry<C: CharacterSource>(&mut self, source: &C) -> Option<PageRequest> {
        let CatalogState::Failed { page, .. } = self.state else {
            return None;
        };
        Some(self.load_page(source, page).await)
    }

    pub async fn next_page<C: CharacterSource>(&mut self, source: &C) -> PageRequest {
        let page = self.current_page().map_or(1, |p| p.saturating_add(1));
        self.load_page(source, page).await
    }

    pub async fn previous_page<C: CharacterSource>(&mut self, source: &C) -> PageRequest {
        let page = self.current_page().map_or(1, |p| p.saturating_sub(1));
        self.load_page(source, page).await
    }

    pub fn increment(&mut self, id: u32) -> Option<u32> {
        let card = self.card_mut(id)?;
        card.pending = card.pending.saturating_add(1);
        Some(card.pending)
    }

    /// Step down, stopping at 1.
    pub fn decrement(&mut self, id: u32) -> Option<u32> {
        let card = self.card_mut(id)?;
        card.pending = card.pending.saturating_sub(1).max(1);
        Some(card.pending)
    }

    pub fn set_pending(&mut self, id: u32, quantity: u32) -> Option<u32> {
        let card = self.card_mut(id)?;
        card.pending = quantity.max(1);
        Some(card.pending)
    }

    pub fn pending(&self, id: u32) -> Option<u32> {
        self.card(id).map(|c| c.pending)
    }

    /// Add a card's pending quantity to the cart at the card's price.
    pub fn add_to_cart<S: KeyValueStore>(
        &self,
        id: u32,
        cart: &mut CartStore<S>,
    ) -> Result<Added> {
        let card = self.card(id).ok_or_else(|| {
            PortalError::Api(format!("Character {} is not on the current page", id))
        })?;
        Ok(cart.add_character(&card.character, card.price, card.pending))
    }

    fn card_mut(&mut self, id: u32) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.character.id == id)
    }
}
