use portalz::cart::{CartStore, Persistence, CART_KEY};
use portalz::model::Snapshot;
use portalz::store::fs::FileStorage;
use portalz::store::KeyValueStore;
use std::fs;
use tempfile::TempDir;

fn snapshot(id: u32, name: &str, price: u64) -> Snapshot {
    Snapshot {
        id,
        name: name.to_string(),
        image: format!("https://rickandmortyapi.com/api/character/avatar/{}.jpeg", id),
        price,
    }
}

fn setup() -> (TempDir, FileStorage) {
    let dir = TempDir::new().unwrap();
    let storage = FileStorage::new(dir.path().to_path_buf());
    (dir, storage)
}

#[test]
fn test_cart_survives_reload() {
    let (dir, storage) = setup();
    {
        let mut cart = CartStore::load(storage);
        assert!(cart.add(1, snapshot(1, "Rick Sanchez", 234), 234, 2).is_saved());
        assert!(cart.add(3, snapshot(3, "Summer Smith", 80), 80, 1).is_saved());
        assert!(cart.set_quantity(3, 4).is_saved());
    }

    let reloaded = CartStore::load(FileStorage::new(dir.path().to_path_buf()));
    let summary = reloaded.summary();
    assert_eq!(summary.total_items, 6);
    assert_eq!(summary.total_price, 2 * 234 + 4 * 80);
    assert_eq!(reloaded.entry(1).unwrap().snapshot.name, "Rick Sanchez");
    assert_eq!(reloaded.lines().len(), 2);
}

#[test]
fn test_removed_entry_keeps_snapshot_on_disk() {
    let (dir, storage) = setup();
    let mut cart = CartStore::load(storage);
    let _ = cart.add(1, snapshot(1, "Rick Sanchez", 234), 234, 1);
    let _ = cart.remove(1);

    let raw = fs::read_to_string(dir.path().join("cart.json")).unwrap();
    assert!(raw.contains("Rick Sanchez"));

    let reloaded = CartStore::load(FileStorage::new(dir.path().to_path_buf()));
    assert_eq!(reloaded.entry(1).unwrap().quantity, 0);
    assert!(reloaded.lines().is_empty());
    assert_eq!(reloaded.summary().total_price, 0);
}

#[test]
fn test_corrupt_file_resets_cart() {
    let (dir, storage) = setup();
    fs::write(dir.path().join("cart.json"), "{\"entries\": [oops").unwrap();

    let mut cart = CartStore::load(storage);
    assert!(cart.is_empty());
    let notice = cart.take_load_notice().unwrap();
    assert!(notice.contains("corrupt"));

    // the next mutation overwrites the bad value
    assert!(cart.add(2, snapshot(2, "Morty Smith", 216), 216, 1).is_saved());
    let raw = cart.storage().get(CART_KEY).unwrap().unwrap();
    assert!(raw.contains("Morty Smith"));
}

#[test]
fn test_quota_exceeded_keeps_memory_state() {
    let (dir, _) = setup();
    let storage = FileStorage::new(dir.path().to_path_buf()).with_quota(64);
    let mut cart = CartStore::load(storage);

    let persistence = cart.add(1, snapshot(1, "Rick Sanchez", 234), 234, 1);
    assert!(matches!(persistence, Persistence::Unsaved(_)));
    assert!(persistence.warning().unwrap().contains("quota"));
    assert_eq!(cart.summary().total_items, 1);
    assert!(!dir.path().join("cart.json").exists());
}

#[test]
fn test_no_temp_files_left_behind() {
    let (dir, storage) = setup();
    let mut cart = CartStore::load(storage);
    for qty in 1..=5 {
        let _ = cart.add(1, snapshot(1, "Rick Sanchez", 234), 234, qty);
    }

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["cart.json".to_string()]);
}
