use tempfile::TempDir;

use confboard::{
    core::store::EntryStore,
    entry::{EntryForm, EntryPatch},
    persist::{
        self, ENTRIES_KEY, PersistError, SETTINGS_KEY, SlotStore, sqlite::SqliteSlots,
    },
    settings::ConferenceSettings,
};

#[test]
fn sqlite_reload_round_trips_entries_and_order() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("board.db");

    let mut store = EntryStore::new();
    let mut slots = SqliteSlots::open(&db_path).expect("open sqlite");

    let (a, _) = store.add(&EntryForm::new("Alice", "MIT", "500", "10")).expect("add a");
    let (b, _) = store.add(&EntryForm::new("Bob", "CMU", "900", "20")).expect("add b");
    store.add(&EntryForm::new("Carol", "ETH", "900", "5")).expect("add c");
    store.update(
        &a.id,
        EntryPatch {
            organization: Some("Stanford".to_string()),
            ..EntryPatch::default()
        },
    );
    store.delete(&b.id);

    persist::save_entries(&mut slots, store.list()).expect("save");
    slots.flush().expect("flush");
    drop(slots);

    let reopened = SqliteSlots::open(&db_path).expect("reopen");
    let reloaded = persist::load_store(&reopened).expect("reload");
    assert_eq!(reloaded.list(), store.list());
    assert!(reopened.get(ENTRIES_KEY).expect("raw").is_some());
}

#[test]
fn settings_default_until_saved() {
    let tmp = TempDir::new().expect("tmp");
    let mut slots = SqliteSlots::open(tmp.path().join("board.db")).expect("open");

    assert_eq!(
        persist::load_settings(&slots).expect("defaults"),
        ConferenceSettings::default()
    );

    let custom = ConferenceSettings {
        conference_name: "DEF CON 33".to_string(),
        village_name: "Malware Village".to_string(),
        conference_date: "August 2025".to_string(),
        conference_url: "https://defcon.org".to_string(),
    };
    persist::save_settings(&mut slots, &custom).expect("save");
    assert_eq!(persist::load_settings(&slots).expect("load"), custom);
}

#[test]
fn corrupt_payloads_surface_instead_of_emptying() {
    let mut slots = SqliteSlots::open_in_memory().expect("open");
    slots.put(ENTRIES_KEY, b"{not json").expect("put");
    slots.put(SETTINGS_KEY, b"[1,2,3]").expect("put");

    let err = persist::load_entries(&slots).expect_err("corrupt entries");
    assert!(matches!(err, PersistError::Corrupt { ref key, .. } if key == ENTRIES_KEY));

    let err = persist::load_settings(&slots).expect_err("corrupt settings");
    assert!(matches!(err, PersistError::Corrupt { ref key, .. } if key == SETTINGS_KEY));
}

#[test]
fn duplicate_ids_in_storage_are_corrupt() {
    let mut slots = SqliteSlots::open_in_memory().expect("open");
    let json = br#"[
        {"id":"1","name":"A","organization":"X","score":1,"time":1,"timestamp":1},
        {"id":"1","name":"B","organization":"Y","score":2,"time":2,"timestamp":2}
    ]"#;
    slots.put(ENTRIES_KEY, json).expect("put");

    let err = persist::load_store(&slots).expect_err("duplicate");
    assert!(matches!(err, PersistError::Corrupt { .. }));
}
