use crate::cart::{CartStore, Persistence};
use crate::commands::{not_in_cart, CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::KeyValueStore;

pub fn run<S: KeyValueStore>(cart: &mut CartStore<S>, ids: &[u32]) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    for &id in ids {
        let persistence = cart.remove(id);
        match (cart.entry(id), &persistence) {
            (None, _) => result.add_message(not_in_cart(id)),
            (Some(entry), Persistence::Unchanged) => result.add_message(CmdMessage::info(
                format!("{} is not in the cart.", entry.snapshot.name),
            )),
            (Some(entry), _) => result.add_message(CmdMessage::success(format!(
                "Removed {} from cart.",
                entry.snapshot.name
            ))),
        }
        result.note_persistence(&persistence);
    }

    result.cart_lines = cart.lines().into_iter().cloned().collect();
    Ok(result.with_summary(cart.summary()))
}
