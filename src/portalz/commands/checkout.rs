use crate::cart::CartStore;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::price::format_price;
use crate::store::KeyValueStore;
use tracing::info;

/// Place the order: report what was bought, then empty the cart.
///
/// There is no payment step. The order lines are returned in `cart_lines`
/// and the summary reflects the order, not the emptied cart.
pub fn run<S: KeyValueStore>(cart: &mut CartStore<S>, confirmed: bool) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    if cart.is_empty() {
        result.add_message(CmdMessage::warning("Your cart is empty, nothing to check out."));
        return Ok(result.with_summary(cart.summary()));
    }
    if !confirmed {
        result.add_message(CmdMessage::info("Operation cancelled."));
        return Ok(result.with_summary(cart.summary()));
    }

    let order = cart.summary();
    result.cart_lines = cart.lines().into_iter().cloned().collect();

    let persistence = cart.clear();
    info!(
        items = order.total_items,
        total = order.total_price,
        "order placed"
    );
    result.add_message(CmdMessage::success(format!(
        "Order placed: {} item{} for {}. Thank you for shopping!",
        order.total_items,
        if order.total_items == 1 { "" } else { "s" },
        format_price(order.total_price)
    )));
    result.note_persistence(&persistence);
    Ok(result.with_summary(order))
}
