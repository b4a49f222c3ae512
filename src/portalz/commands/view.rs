use crate::cart::CartStore;
use crate::commands::{CmdMessage, CmdResult};
use crate::detail::{DetailController, DetailState};
use crate::error::Result;
use crate::source::CharacterSource;
use crate::store::KeyValueStore;
use std::sync::Arc;

/// Show one character. A query without an id is an error, and nothing is fetched.
pub async fn run<S, C>(
    detail: &mut DetailController,
    source: &Arc<C>,
    cart: &mut CartStore<S>,
    query: &str,
    add: bool,
) -> Result<CmdResult>
where
    S: KeyValueStore,
    C: CharacterSource + Send + Sync + 'static,
{
    let id = detail.load_from_query(source, query).await?;
    let mut result = CmdResult::default();

    match detail.state() {
        DetailState::Rendered(view) => {
            result.detail = Some((**view).clone());
        }
        DetailState::Failed {
            message, retryable, ..
        } => {
            result.add_message(CmdMessage::error(message.clone()));
            if *retryable {
                result.add_message(CmdMessage::info(format!(
                    "Run `portalz show {}` to try again.",
                    id
                )));
            }
            return Ok(result.with_summary(cart.summary()));
        }
        DetailState::Idle | DetailState::Loading { .. } => {}
    }

    if add {
        let added = detail.add_to_cart(cart)?;
        result.note_added(&added);
    }

    Ok(result.with_summary(cart.summary()))
}
