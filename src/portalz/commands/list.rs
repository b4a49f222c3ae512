use crate::cart::CartStore;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::KeyValueStore;

/// The cart page: active lines plus the totals.
pub fn run<S: KeyValueStore>(cart: &CartStore<S>) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    result.cart_lines = cart.lines().into_iter().cloned().collect();
    if result.cart_lines.is_empty() {
        result.add_message(CmdMessage::info("Your cart is empty."));
    }
    Ok(result.with_summary(cart.summary()))
}

/// Just the badge.
pub fn summary<S: KeyValueStore>(cart: &CartStore<S>) -> Result<CmdResult> {
    Ok(CmdResult::default().with_summary(cart.summary()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Snapshot;
    use crate::store::memory::MemStorage;

    #[test]
    fn lists_only_active_lines() {
        let mut cart = CartStore::load(MemStorage::new());
        for (id, price) in [(1, 234), (2, 216), (3, 80)] {
            let snapshot = Snapshot {
                id,
                name: format!("Character {}", id),
                image: String::new(),
                price,
            };
            let _ = cart.add(id, snapshot, price, 1);
        }
        let _ = cart.remove(2);

        let result = run(&cart).unwrap();
        let ids: Vec<u32> = result.cart_lines.iter().map(|e| e.snapshot.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(result.summary.unwrap().total_price, 314);
        assert!(result.messages.is_empty());
    }

    #[test]
    fn empty_cart_says_so() {
        let cart = CartStore::load(MemStorage::new());
        let result = run(&cart).unwrap();
        assert_eq!(result.messages[0].content, "Your cart is empty.");
        assert_eq!(summary(&cart).unwrap().summary.unwrap().total_items, 0);
    }
}
