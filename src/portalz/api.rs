//! # API Facade
//!
//! A **thin facade** over the command layer and the single entry point for
//! every storefront operation, whatever UI drives it.
//!
//! The facade:
//! - **Owns** the cart store, the character source and both page controllers
//! - **Dispatches** to the matching command function
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no printing and holds no business logic; that lives in
//! `commands/*.rs`.
//!
//! ## Generic Over Storage and Source
//!
//! `PortalApi<S: KeyValueStore, C: CharacterSource>`:
//! - Production: `PortalApi<FileStorage, HttpSource>`
//! - Testing: `PortalApi<MemStorage, FixtureSource>`

use crate::cart::CartStore;
use crate::catalog::CatalogController;
use crate::commands;
use crate::config::PortalConfig;
use crate::detail::DetailController;
use crate::error::Result;
use crate::source::CharacterSource;
use crate::store::KeyValueStore;
use std::sync::Arc;

pub use crate::commands::browse::CardAdd;
pub use crate::commands::{CmdMessage, CmdResult, MessageLevel, PageView};

pub struct PortalApi<S: KeyValueStore, C: CharacterSource> {
    cart: CartStore<S>,
    source: Arc<C>,
    catalog: CatalogController,
    detail: DetailController,
    config: PortalConfig,
}

impl<S, C> PortalApi<S, C>
where
    S: KeyValueStore,
    C: CharacterSource + Send + Sync + 'static,
{
    /// Rehydrates the cart from `storage`; that is the "page load".
    pub fn new(storage: S, source: C, config: PortalConfig) -> Self {
        let timeout = config.request_timeout();
        Self {
            cart: CartStore::load(storage),
            source: Arc::new(source),
            catalog: CatalogController::new(config.max_page, timeout),
            detail: DetailController::new(config.episode_limit, timeout),
            config,
        }
    }

    /// Warning left behind if the stored cart could not be read.
    pub fn take_load_notice(&mut self) -> Option<CmdMessage> {
        self.cart.take_load_notice().map(CmdMessage::warning)
    }

    pub async fn browse(&mut self, page: u32, add: Option<CardAdd>) -> Result<CmdResult> {
        commands::browse::run(
            &mut self.catalog,
            self.source.as_ref(),
            &mut self.cart,
            page,
            add,
        )
        .await
    }

    pub async fn show(&mut self, query: &str, add: bool) -> Result<CmdResult> {
        commands::view::run(&mut self.detail, &self.source, &mut self.cart, query, add).await
    }

    pub fn cart(&self) -> Result<CmdResult> {
        commands::list::run(&self.cart)
    }

    pub fn summary(&self) -> Result<CmdResult> {
        commands::list::summary(&self.cart)
    }

    pub fn set_quantity(&mut self, id: u32, quantity: u32) -> Result<CmdResult> {
        commands::update::set(&mut self.cart, id, quantity)
    }

    pub fn increment(&mut self, id: u32) -> Result<CmdResult> {
        commands::update::adjust(&mut self.cart, id, 1)
    }

    pub fn decrement(&mut self, id: u32) -> Result<CmdResult> {
        commands::update::adjust(&mut self.cart, id, -1)
    }

    pub fn remove(&mut self, ids: &[u32]) -> Result<CmdResult> {
        commands::remove::run(&mut self.cart, ids)
    }

    pub fn clear(&mut self, confirmed: bool) -> Result<CmdResult> {
        commands::clear::run(&mut self.cart, confirmed)
    }

    pub fn checkout(&mut self, confirmed: bool) -> Result<CmdResult> {
        commands::checkout::run(&mut self.cart, confirmed)
    }

    pub fn config(&self) -> Result<CmdResult> {
        Ok(CmdResult::default().with_config(self.config.clone()))
    }

    pub fn is_cart_empty(&self) -> bool {
        self.cart.is_empty()
    }
}
