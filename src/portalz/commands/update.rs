use crate::cart::{CartStore, Persistence};
use crate::commands::{not_in_cart, CmdMessage, CmdResult};
use crate::error::Result;
use crate::price::format_price;
use crate::store::KeyValueStore;

/// Set a line's quantity outright. Zero removes the line.
pub fn set<S: KeyValueStore>(cart: &mut CartStore<S>, id: u32, quantity: u32) -> Result<CmdResult> {
    let persistence = cart.set_quantity(id, quantity);
    Ok(report(cart, id, persistence))
}

/// The cart page's `+` and `-` buttons.
pub fn adjust<S: KeyValueStore>(cart: &mut CartStore<S>, id: u32, delta: i64) -> Result<CmdResult> {
    let persistence = cart.adjust(id, delta);
    Ok(report(cart, id, persistence))
}

fn report<S: KeyValueStore>(cart: &CartStore<S>, id: u32, persistence: Persistence) -> CmdResult {
    let mut result = CmdResult::default();
    match (cart.entry(id), &persistence) {
        (None, _) => result.add_message(not_in_cart(id)),
        (Some(entry), Persistence::Unchanged) => result.add_message(CmdMessage::info(format!(
            "{} already at quantity {}.",
            entry.snapshot.name, entry.quantity
        ))),
        (Some(_), Persistence::Rejected(_)) => {}
        (Some(entry), _) if entry.quantity == 0 => result.add_message(CmdMessage::success(
            format!("Removed {} from cart.", entry.snapshot.name),
        )),
        (Some(entry), _) => result.add_message(CmdMessage::success(format!(
            "{} x {} = {}",
            entry.quantity,
            entry.snapshot.name,
            format_price(entry.line_total)
        ))),
    }
    result.note_persistence(&persistence);
    result.cart_lines = cart.lines().into_iter().cloned().collect();
    result.with_summary(cart.summary())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::model::Snapshot;
    use crate::store::memory::{MemStorage, WriteFailure};

    fn cart_with_rick() -> CartStore<MemStorage> {
        let mut cart = CartStore::load(MemStorage::new());
        let snapshot = Snapshot {
            id: 1,
            name: "Rick Sanchez".into(),
            image: String::new(),
            price: 234,
        };
        let _ = cart.add(1, snapshot, 234, 2);
        cart
    }

    #[test]
    fn set_updates_line_and_totals() {
        let mut cart = cart_with_rick();
        let result = set(&mut cart, 1, 5).unwrap();
        assert_eq!(result.messages[0].content, "5 x Rick Sanchez = $1,170.00");
        assert_eq!(result.summary.unwrap().total_price, 1170);
        assert_eq!(result.cart_lines.len(), 1);
    }

    #[test]
    fn set_unknown_id_is_a_no_op() {
        let mut cart = cart_with_rick();
        let writes = cart.storage().write_count();
        let result = set(&mut cart, 42, 3).unwrap();
        assert_eq!(result.messages[0].content, "Character 42 is not in the cart.");
        assert_eq!(cart.storage().write_count(), writes);
        assert_eq!(result.summary.unwrap().total_items, 2);
    }

    #[test]
    fn decrement_to_zero_removes() {
        let mut cart = cart_with_rick();
        adjust(&mut cart, 1, -1).unwrap();
        let result = adjust(&mut cart, 1, -1).unwrap();
        assert_eq!(result.messages[0].content, "Removed Rick Sanchez from cart.");
        assert!(result.cart_lines.is_empty());
        assert_eq!(result.summary.unwrap().total_items, 0);
    }

    #[test]
    fn failed_write_is_a_warning() {
        let mut cart = cart_with_rick();
        cart.storage()
            .set_simulate_write_error(Some(WriteFailure::QuotaExceeded));
        let result = adjust(&mut cart, 1, 1).unwrap();
        assert_eq!(result.messages.len(), 2);
        assert!(result.messages[1].content.contains("not saved"));
        assert_eq!(cart.entry(1).unwrap().quantity, 3);
    }

    #[test]
    fn overflowing_quantity_is_refused() {
        let mut cart = CartStore::load(MemStorage::new());
        let snapshot = Snapshot {
            id: 7,
            name: "Mr. Poopybutthole".into(),
            image: String::new(),
            price: u64::MAX / 2,
        };
        let _ = cart.add(7, snapshot, u64::MAX / 2, 1);

        let result = set(&mut cart, 7, 3).unwrap();
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
        assert!(result.messages[0].content.contains("Cart not changed"));
        assert_eq!(cart.entry(7).unwrap().quantity, 1);
        assert_eq!(result.summary.unwrap().total_price, u64::MAX / 2);
    }
}
