use crate::cart::CartStore;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::KeyValueStore;

/// Empty the cart. The caller asks the user first and passes the answer in.
pub fn run<S: KeyValueStore>(cart: &mut CartStore<S>, confirmed: bool) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    if cart.is_empty() {
        result.add_message(CmdMessage::info("Cart is already empty."));
        return Ok(result.with_summary(cart.summary()));
    }
    if !confirmed {
        result.add_message(CmdMessage::info("Operation cancelled."));
        return Ok(result.with_summary(cart.summary()));
    }

    let items = cart.summary().total_items;
    let persistence = cart.clear();
    result.add_message(CmdMessage::success(format!(
        "Cart cleared ({} item{} removed).",
        items,
        if items == 1 { "" } else { "s" }
    )));
    result.note_persistence(&persistence);
    Ok(result.with_summary(cart.summary()))
}
