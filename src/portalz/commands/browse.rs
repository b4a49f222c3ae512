use crate::cart::CartStore;
use crate::catalog::{CatalogController, CatalogState, PageRequest};
use crate::commands::{CmdMessage, CmdResult, PageView};
use crate::error::Result;
use crate::source::CharacterSource;
use crate::store::KeyValueStore;

/// An add-to-cart action issued from the catalog page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardAdd {
    pub id: u32,
    pub quantity: u32,
}

pub async fn run<S: KeyValueStore, C: CharacterSource>(
    catalog: &mut CatalogController,
    source: &C,
    cart: &mut CartStore<S>,
    page: u32,
    add: Option<CardAdd>,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    match catalog.load_page(source, page).await {
        PageRequest::Issued(_) => {}
        PageRequest::Busy => {
            result.add_message(CmdMessage::info("A page is already loading."));
            return Ok(result);
        }
        PageRequest::OutOfRange { page, max } => {
            result.add_message(CmdMessage::error(format!(
                "Page {} is out of range (1-{}).",
                page, max
            )));
            return Ok(result);
        }
    }

    match catalog.state() {
        CatalogState::Rendered { page } => {
            result.page = Some(PageView {
                page: *page,
                max_page: catalog.max_page(),
            });
        }
        CatalogState::Failed {
            page,
            message,
            retryable,
        } => {
            result.add_message(CmdMessage::error(message.clone()));
            if *retryable {
                result.add_message(CmdMessage::info(format!(
                    "Run `portalz browse {}` to try again.",
                    page
                )));
            }
            return Ok(result.with_summary(cart.summary()));
        }
        CatalogState::Idle | CatalogState::Loading { .. } => {}
    }

    if let Some(add) = add {
        if catalog.set_pending(add.id, add.quantity).is_none() {
            result.add_message(CmdMessage::error(format!(
                "Character {} is not on page {}.",
                add.id, page
            )));
        } else {
            let added = catalog.add_to_cart(add.id, cart)?;
            result.note_added(&added);
        }
    }

    result.cards = catalog.cards().to_vec();
    Ok(result.with_summary(cart.summary()))
}
