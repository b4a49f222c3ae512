//! # Cart Store
//!
//! The cart maps a character id to a [`CartEntry`] (quantity, line total,
//! snapshot) and keeps two denormalized totals next to it: item count and
//! price. Durable storage is the source of truth across runs; a [`CartStore`]
//! is a per-run cache of it:
//!
//! 1. [`CartStore::load`] rehydrates from storage at start-up.
//! 2. Every mutation updates the entry *and* both totals in the same call.
//! 3. Every mutation writes the whole cart back before returning.
//!
//! ## Invariants
//!
//! After every operation:
//! - `entry.line_total == entry.quantity * entry.snapshot.price`
//! - `total_items == Σ entry.quantity`
//! - `total_price == Σ entry.line_total`
//!
//! Money is integer currency units, so these hold exactly.
//!
//! Entries that drop to zero are kept, snapshot included. Only [`CartStore::lines`]
//! filters them out.
//!
//! ## Failure Policy
//!
//! Nothing here is fatal. A stored value that does not parse, or whose amounts
//! overflow, resets the cart to empty and leaves a load notice. A change that
//! would overflow an amount is refused with [`Persistence::Rejected`]. A
//! failed write keeps the in-memory state and reports [`Persistence::Unsaved`];
//! the caller shows it as a warning.

use crate::error::{PortalError, Result};
use crate::model::{CartEntry, Character, Snapshot};
use crate::store::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// The single storage key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// The persisted form of the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    pub entries: BTreeMap<u32, CartEntry>,
    pub total_items: u64,
    pub total_price: u64,
}

impl CartState {
    /// Recompute every cache from the entries. Returns true if anything changed.
    ///
    /// Fails with [`PortalError::StorageCorrupt`] if the entries cannot be
    /// totalled without overflowing.
    fn reconcile(&mut self) -> Result<bool> {
        let mut changed = false;
        let mut items = 0u64;
        let mut price = 0u64;
        for (id, entry) in self.entries.iter_mut() {
            let overflow = || PortalError::StorageCorrupt(format!("entry {} overflows", id));
            let expected =
                line_total(entry.quantity, entry.snapshot.price).ok_or_else(overflow)?;
            if entry.line_total != expected {
                entry.line_total = expected;
                changed = true;
            }
            items = items
                .checked_add(u64::from(entry.quantity))
                .ok_or_else(overflow)?;
            price = price.checked_add(expected).ok_or_else(overflow)?;
        }
        if self.total_items != items || self.total_price != price {
            self.total_items = items;
            self.total_price = price;
            changed = true;
        }
        Ok(changed)
    }
}

fn line_total(quantity: u32, unit_price: u64) -> Option<u64> {
    u64::from(quantity).checked_mul(unit_price)
}

/// Badge numbers: how many items, for how much.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_items: u64,
    pub total_price: u64,
}

/// Outcome of the write-through that follows a mutation.
#[must_use]
#[derive(Debug)]
pub enum Persistence {
    /// The cart was written to storage.
    Saved,
    /// Nothing changed, nothing was written.
    Unchanged,
    /// The in-memory cart changed but storage did not take it.
    Unsaved(PortalError),
    /// The change was refused and the cart is as it was.
    Rejected(PortalError),
}

impl Persistence {
    pub fn is_saved(&self) -> bool {
        matches!(self, Persistence::Saved)
    }

    /// A user-facing warning, if the write failed.
    pub fn warning(&self) -> Option<String> {
        match self {
            Persistence::Unsaved(e) => Some(format!("Cart changed but was not saved: {}", e)),
            Persistence::Rejected(e) => Some(format!("Cart not changed: {}", e)),
            _ => None,
        }
    }
}

/// What an add-to-cart action did, for the caller to report.
#[derive(Debug)]
pub struct Added {
    pub id: u32,
    pub name: String,
    pub quantity: u32,
    pub subtotal: u64,
    pub persistence: Persistence,
}

pub struct CartStore<S: KeyValueStore> {
    storage: S,
    state: CartState,
    load_notice: Option<String>,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Rehydrate from storage. Never fails; see the module docs.
    pub fn load(storage: S) -> Self {
        let mut load_notice = None;
        let state = match storage.get(CART_KEY) {
            Ok(None) => {
                debug!("no stored cart, starting empty");
                CartState::default()
            }
            Ok(Some(raw)) => {
                let parsed = serde_json::from_str::<CartState>(&raw)
                    .map_err(|e| PortalError::StorageCorrupt(e.to_string()))
                    .and_then(|mut state| state.reconcile().map(|changed| (state, changed)));
                match parsed {
                    Ok((state, changed)) => {
                        if changed {
                            warn!("stored cart totals disagreed with its entries, recomputed");
                        }
                        debug!(
                            entries = state.entries.len(),
                            total_items = state.total_items,
                            "cart loaded"
                        );
                        state
                    }
                    Err(err) => {
                        warn!(error = %err, "resetting cart");
                        load_notice = Some(format!("{}. The cart was reset.", err));
                        CartState::default()
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "could not read stored cart, starting empty");
                load_notice = Some(format!("Could not read the stored cart: {}", e));
                CartState::default()
            }
        };

        Self {
            storage,
            state,
            load_notice,
        }
    }

    /// Add `quantity` units at `unit_price`. Creates the entry if needed and
    /// refreshes its snapshot.
    pub fn add(
        &mut self,
        id: u32,
        snapshot: Snapshot,
        unit_price: u64,
        quantity: u32,
    ) -> Persistence {
        if quantity == 0 {
            return Persistence::Unchanged;
        }

        let (old_quantity, old_line) = self
            .state
            .entries
            .get(&id)
            .map_or((0, 0), |e| (e.quantity, e.line_total));
        let new_quantity = old_quantity.saturating_add(quantity);
        let Some(new_line) = line_total(new_quantity, unit_price) else {
            return self.reject(id, new_quantity, unit_price);
        };
        let Some(totals) = self.retotaled(old_quantity, old_line, new_quantity, new_line) else {
            return self.reject(id, new_quantity, unit_price);
        };

        let snapshot = Snapshot {
            price: unit_price,
            ..snapshot
        };
        let entry = self
            .state
            .entries
            .entry(id)
            .or_insert_with(|| CartEntry::empty(snapshot.clone()));
        entry.snapshot = snapshot;
        entry.quantity = new_quantity;
        entry.line_total = new_line;
        self.set_totals(totals);

        debug!(id, quantity = new_quantity - old_quantity, unit_price, "added to cart");
        self.save()
    }

    pub fn add_one(&mut self, id: u32, snapshot: Snapshot, unit_price: u64) -> Persistence {
        self.add(id, snapshot, unit_price, 1)
    }

    /// Add a fetched character, snapshotting it at `unit_price`.
    pub fn add_character(
        &mut self,
        character: &Character,
        unit_price: u64,
        quantity: u32,
    ) -> Added {
        let before = self.entry(character.id).map_or(0, |e| e.quantity);
        let persistence = self.add(
            character.id,
            character.snapshot(unit_price),
            unit_price,
            quantity,
        );
        let added = self.entry(character.id).map_or(0, |e| e.quantity) - before;
        Added {
            id: character.id,
            name: character.display_name().to_string(),
            quantity: added,
            subtotal: u64::from(added).saturating_mul(unit_price),
            persistence,
        }
    }

    /// Set an entry's quantity. Unknown ids are a no-op.
    pub fn set_quantity(&mut self, id: u32, new_quantity: u32) -> Persistence {
        let Some(entry) = self.state.entries.get(&id) else {
            debug!(id, "set_quantity on an id not in the cart, ignoring");
            return Persistence::Unchanged;
        };
        if entry.quantity == new_quantity {
            return Persistence::Unchanged;
        }

        let old_quantity = entry.quantity;
        let old_line = entry.line_total;
        let unit_price = entry.unit_price();
        let Some(new_line) = line_total(new_quantity, unit_price) else {
            return self.reject(id, new_quantity, unit_price);
        };
        let Some(totals) = self.retotaled(old_quantity, old_line, new_quantity, new_line) else {
            return self.reject(id, new_quantity, unit_price);
        };

        if let Some(entry) = self.state.entries.get_mut(&id) {
            entry.quantity = new_quantity;
            entry.line_total = new_line;
        }
        self.set_totals(totals);

        debug!(id, old_quantity, new_quantity, "cart quantity set");
        self.save()
    }

    /// Step an entry's quantity by `delta`, stopping at zero.
    pub fn adjust(&mut self, id: u32, delta: i64) -> Persistence {
        let Some(current) = self.state.entries.get(&id).map(|e| e.quantity) else {
            return Persistence::Unchanged;
        };
        let target = (i64::from(current) + delta).clamp(0, i64::from(u32::MAX));
        self.set_quantity(id, target as u32)
    }

    /// Drop an entry to zero, keeping its snapshot.
    pub fn remove(&mut self, id: u32) -> Persistence {
        self.set_quantity(id, 0)
    }

    /// Zero every entry and both totals. Callers confirm with the user first.
    pub fn clear(&mut self) -> Persistence {
        for entry in self.state.entries.values_mut() {
            entry.quantity = 0;
            entry.line_total = 0;
        }
        self.state.total_items = 0;
        self.state.total_price = 0;
        debug!("cart cleared");
        self.save()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total_items: self.state.total_items,
            total_price: self.state.total_price,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.state.total_items == 0
    }

    /// Entries with a positive quantity, in id order.
    pub fn lines(&self) -> Vec<&CartEntry> {
        self.state
            .entries
            .values()
            .filter(|e| e.is_active())
            .collect()
    }

    pub fn entry(&self, id: u32) -> Option<&CartEntry> {
        self.state.entries.get(&id)
    }

    pub fn state(&self) -> &CartState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The warning left by `load`, if the stored cart had to be discarded.
    pub fn take_load_notice(&mut self) -> Option<String> {
        self.load_notice.take()
    }

    /// Write the whole cart through to storage.
    pub fn save(&self) -> Persistence {
        match self.write() {
            Ok(()) => Persistence::Saved,
            Err(e) => {
                warn!(error = %e, "cart not saved, keeping in-memory state");
                Persistence::Unsaved(e)
            }
        }
    }

    fn write(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.state)?;
        self.storage.set(CART_KEY, &raw)
    }

    /// Both totals after one entry moves from the old line to the new one.
    fn retotaled(
        &self,
        old_quantity: u32,
        old_line: u64,
        new_quantity: u32,
        new_line: u64,
    ) -> Option<(u64, u64)> {
        let items = self
            .state
            .total_items
            .checked_sub(u64::from(old_quantity))?
            .checked_add(u64::from(new_quantity))?;
        let price = self
            .state
            .total_price
            .checked_sub(old_line)?
            .checked_add(new_line)?;
        Some((items, price))
    }

    fn set_totals(&mut self, (items, price): (u64, u64)) {
        self.state.total_items = items;
        self.state.total_price = price;
    }

    fn reject(&self, id: u32, quantity: u32, unit_price: u64) -> Persistence {
        warn!(id, quantity, unit_price, "cart amount overflows, change refused");
        Persistence::Rejected(PortalError::CartOverflow { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{MemStorage, WriteFailure};

    fn snap(id: u32, name: &str) -> Snapshot {
        Snapshot {
            id,
            name: name.to_string(),
            image: format!("https://rickandmortyapi.com/api/character/avatar/{}.jpeg", id),
            price: 0,
        }
    }

    fn assert_consistent<S: KeyValueStore>(cart: &CartStore<S>) {
        let state = cart.state();
        let items: u64 = state.entries.values().map(|e| u64::from(e.quantity)).sum();
        let price: u64 = state.entries.values().map(|e| e.line_total).sum();
        assert_eq!(state.total_items, items);
        assert_eq!(state.total_price, price);
        for e in state.entries.values() {
            assert_eq!(e.line_total, u64::from(e.quantity) * e.snapshot.price);
        }
    }

    #[test]
    fn add_one_to_empty_cart() {
        let mut cart = CartStore::load(MemStorage::new());
        assert!(cart.add_one(1, snap(1, "Rick"), 100).is_saved());
        assert_eq!(
            cart.summary(),
            Summary {
                total_items: 1,
                total_price: 100
            }
        );
    }

    #[test]
    fn set_quantity_scales_by_unit_price() {
        let mut cart = CartStore::load(MemStorage::new());
        let _ = cart.add(1, snap(1, "Rick"), 100, 2);
        assert_eq!(cart.entry(1).unwrap().line_total, 200);

        assert!(cart.set_quantity(1, 5).is_saved());
        let entry = cart.entry(1).unwrap();
        assert_eq!(entry.quantity, 5);
        assert_eq!(entry.line_total, 500);
        assert_eq!(cart.summary().total_items, 5);
        assert_eq!(cart.summary().total_price, 500);
    }

    #[test]
    fn clear_keeps_snapshots() {
        let mut cart = CartStore::load(MemStorage::new());
        let _ = cart.add(1, snap(1, "Rick"), 100, 2);
        let _ = cart.add(2, snap(2, "Morty"), 50, 3);
        assert_eq!(cart.summary().total_items, 5);

        assert!(cart.clear().is_saved());
        assert_eq!(cart.summary(), Summary::default());
        assert_eq!(cart.entry(1).unwrap().snapshot.name, "Rick");
        assert_eq!(cart.entry(2).unwrap().quantity, 0);
        assert_eq!(cart.entry(2).unwrap().snapshot.price, 50);
        assert!(cart.lines().is_empty());
    }

    #[test]
    fn set_quantity_on_unknown_id_is_noop() {
        let storage = MemStorage::new();
        let mut cart = CartStore::load(&storage);
        assert!(matches!(cart.set_quantity(99, 0), Persistence::Unchanged));
        assert!(matches!(cart.set_quantity(99, 3), Persistence::Unchanged));
        assert_eq!(storage.write_count(), 0);
        assert!(cart.entry(99).is_none());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut cart = CartStore::load(MemStorage::new());
        let _ = cart.add(1, snap(1, "Rick"), 100, 2);
        let _ = cart.add(2, snap(2, "Morty"), 50, 1);

        let _ = cart.remove(1);
        let once = cart.state().clone();
        assert!(matches!(cart.remove(1), Persistence::Unchanged));
        assert_eq!(cart.state(), &once);
        assert_eq!(cart.entry(1).unwrap().quantity, 0);
        assert_eq!(cart.summary().total_price, 50);
    }

    #[test]
    fn zero_quantity_entry_can_be_revived() {
        let mut cart = CartStore::load(MemStorage::new());
        let _ = cart.add(1, snap(1, "Rick"), 100, 2);
        let _ = cart.remove(1);
        // Unit price survives on the snapshot, no division by a zero quantity
        let _ = cart.set_quantity(1, 3);
        assert_eq!(cart.entry(1).unwrap().line_total, 300);
        assert_consistent(&cart);
    }

    #[test]
    fn re_adding_at_new_price_reprices_the_line() {
        let mut cart = CartStore::load(MemStorage::new());
        let _ = cart.add(1, snap(1, "Rick"), 100, 2);
        let _ = cart.add(1, snap(1, "Rick"), 120, 1);
        assert_eq!(cart.entry(1).unwrap().line_total, 360);
        assert_eq!(cart.summary().total_price, 360);
        assert_consistent(&cart);
    }

    #[test]
    fn adjust_clamps_at_zero() {
        let mut cart = CartStore::load(MemStorage::new());
        let _ = cart.add(1, snap(1, "Rick"), 100, 2);
        let _ = cart.adjust(1, 1);
        assert_eq!(cart.entry(1).unwrap().quantity, 3);
        let _ = cart.adjust(1, -10);
        assert_eq!(cart.entry(1).unwrap().quantity, 0);
        assert!(matches!(cart.adjust(42, 1), Persistence::Unchanged));
        assert_consistent(&cart);
    }

    #[test]
    fn totals_match_entries_over_operation_sequence() {
        let mut cart = CartStore::load(MemStorage::new());
        let mut seed: u64 = 0x5eed;
        let mut next = move || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            seed >> 33
        };

        for _ in 0..500 {
            let id = (next() % 6) as u32 + 1;
            let _ = match next() % 5 {
                0 | 1 => cart.add(id, snap(id, "X"), 10 * u64::from(id), (next() % 4) as u32),
                2 => cart.set_quantity(id, (next() % 7) as u32),
                3 => cart.adjust(id, (next() % 5) as i64 - 2),
                _ => cart.remove(id),
            };
            assert_consistent(&cart);
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let storage = MemStorage::new();
        let mut cart = CartStore::load(&storage);
        let _ = cart.add(1, snap(1, "Rick"), 234, 2);
        let _ = cart.add(7, snap(7, "Abradolf Lincler"), 80, 1);
        let _ = cart.remove(7);
        let before = cart.state().clone();

        let reloaded = CartStore::load(&storage);
        assert_eq!(reloaded.state(), &before);
        assert_eq!(reloaded.summary(), cart.summary());
    }

    #[test]
    fn corrupt_storage_resets_softly() {
        let storage = MemStorage::new().with_value(CART_KEY, "{not json");
        let mut cart = CartStore::load(storage);
        assert!(cart.is_empty());
        assert!(cart.state().entries.is_empty());
        let notice = cart.take_load_notice().unwrap();
        assert!(notice.contains("corrupt"));
        assert!(cart.take_load_notice().is_none());

        // Still usable afterwards
        assert!(cart.add_one(1, snap(1, "Rick"), 100).is_saved());
    }

    #[test]
    fn drifted_totals_are_recomputed_on_load() {
        let raw = r#"{
            "entries": {
                "1": {"quantity": 2, "line_total": 999, "snapshot": {"id": 1, "name": "Rick", "image": "", "price": 100}}
            },
            "total_items": 7,
            "total_price": 3
        }"#;
        let cart = CartStore::load(MemStorage::new().with_value(CART_KEY, raw));
        assert_eq!(cart.entry(1).unwrap().line_total, 200);
        assert_eq!(
            cart.summary(),
            Summary {
                total_items: 2,
                total_price: 200
            }
        );
    }

    #[test]
    fn failed_write_keeps_memory_state() {
        let storage = MemStorage::new();
        let mut cart = CartStore::load(&storage);
        let _ = cart.add_one(1, snap(1, "Rick"), 100);

        storage.set_simulate_write_error(Some(WriteFailure::QuotaExceeded));
        let outcome = cart.add_one(1, snap(1, "Rick"), 100);
        assert!(matches!(
            outcome,
            Persistence::Unsaved(PortalError::StorageQuotaExceeded { .. })
        ));
        assert!(outcome.warning().unwrap().contains("not saved"));
        assert_eq!(cart.summary().total_items, 2);

        // Storage still has the last good write
        storage.set_simulate_write_error(None);
        let reloaded = CartStore::load(&storage);
        assert_eq!(reloaded.summary().total_items, 1);
    }

    #[test]
    fn add_character_snapshots_display_fields() {
        let mut cart = CartStore::load(MemStorage::new());
        let character = Character {
            id: 3,
            name: "  ".into(),
            image: "https://example.test/3.jpeg".into(),
            ..Default::default()
        };
        let added = cart.add_character(&character, 90, 2);
        assert_eq!(added.subtotal, 180);
        assert_eq!(added.name, "Unnamed character");
        assert!(added.persistence.is_saved());

        let entry = cart.entry(3).unwrap();
        assert_eq!(entry.snapshot.name, "Unnamed character");
        assert_eq!(entry.snapshot.price, 90);
        assert_eq!(entry.snapshot.image, "https://example.test/3.jpeg");
    }

    #[test]
    fn adding_zero_does_nothing() {
        let storage = MemStorage::new();
        let mut cart = CartStore::load(&storage);
        assert!(matches!(
            cart.add(1, snap(1, "Rick"), 100, 0),
            Persistence::Unchanged
        ));
        assert!(cart.entry(1).is_none());
        assert_eq!(storage.write_count(), 0);
    }

    #[test]
    fn overflowing_stored_amounts_reset_softly() {
        let raw = r#"{
            "entries": {
                "1": {"quantity": 3, "line_total": 0, "snapshot": {"id": 1, "name": "Rick", "image": "", "price": 9223372036854775807}}
            },
            "total_items": 3,
            "total_price": 0
        }"#;
        let mut cart = CartStore::load(MemStorage::new().with_value(CART_KEY, raw));
        assert!(cart.is_empty());
        assert!(cart.state().entries.is_empty());
        assert!(cart.take_load_notice().unwrap().contains("corrupt"));
    }

    #[test]
    fn overflowing_stored_total_resets_softly() {
        let big = u64::MAX / 2 + 1;
        let raw = format!(
            r#"{{"entries": {{
                "1": {{"quantity": 1, "line_total": {big}, "snapshot": {{"id": 1, "name": "Rick", "image": "", "price": {big}}}}},
                "2": {{"quantity": 1, "line_total": {big}, "snapshot": {{"id": 2, "name": "Morty", "image": "", "price": {big}}}}}
            }}, "total_items": 2, "total_price": 0}}"#
        );
        let mut cart = CartStore::load(MemStorage::new().with_value(CART_KEY, &raw));
        assert!(cart.is_empty());
        assert!(cart.take_load_notice().is_some());
    }

    #[test]
    fn overflowing_add_is_rejected() {
        let storage = MemStorage::new();
        let mut cart = CartStore::load(&storage);
        let _ = cart.add(1, snap(1, "Rick"), u64::MAX / 2, 1);
        let before = cart.state().clone();
        let writes = storage.write_count();

        let outcome = cart.add(1, snap(1, "Rick"), u64::MAX / 2, 2);
        assert!(matches!(
            outcome,
            Persistence::Rejected(PortalError::CartOverflow { id: 1 })
        ));
        assert!(outcome.warning().unwrap().contains("not changed"));
        assert_eq!(cart.state(), &before);
        assert_eq!(storage.write_count(), writes);

        // A second line that would overflow the cart total is refused too
        assert!(matches!(
            cart.add(2, snap(2, "Morty"), u64::MAX / 2 + 2, 1),
            Persistence::Rejected(_)
        ));
        assert!(cart.entry(2).is_none());
        assert_consistent(&cart);
    }

    #[test]
    fn add_character_reports_quantity_actually_added() {
        let mut cart = CartStore::load(MemStorage::new());
        let character = Character {
            id: 4,
            name: "Beth Smith".into(),
            ..Default::default()
        };
        let _ = cart.add(4, snap(4, "Beth Smith"), 1, u32::MAX - 1);

        let added = cart.add_character(&character, 1, 5);
        assert_eq!(added.quantity, 1);
        assert_eq!(added.subtotal, 1);
        assert_eq!(cart.entry(4).unwrap().quantity, u32::MAX);

        let added = cart.add_character(&character, 1, 5);
        assert_eq!(added.quantity, 0);
        assert_eq!(added.subtotal, 0);
    }
}
