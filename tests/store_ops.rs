use confboard::{
    core::store::{EntryStore, StoreError},
    entry::{EntryForm, EntryPatch, InvalidField},
    op::Mutation,
    types::now_ms,
};

#[test]
fn add_appends_exactly_one_record_with_generated_fields() {
    let mut store = EntryStore::new();
    let before = now_ms();
    let (entry, applied) = store
        .add(&EntryForm::new("Alice", "MIT", "100", "60"))
        .expect("add");

    assert_eq!(store.len(), 1);
    let stored = &store.list()[0];
    assert_eq!(stored, &entry);
    assert_eq!(stored.name, "Alice");
    assert_eq!(stored.organization, "MIT");
    assert_eq!(stored.score, 100);
    assert_eq!(stored.time, 60);
    assert!(!stored.id.is_empty());
    assert!(stored.timestamp >= before);
    assert_eq!(applied.revision, 1);
    assert!(matches!(applied.mutation, Mutation::Added { .. }));
}

#[test]
fn invalid_form_leaves_store_untouched() {
    let mut store = EntryStore::new();
    let err = store
        .add(&EntryForm::new("  ", "MIT", "-5", "abc"))
        .expect_err("invalid");
    let v = match err {
        StoreError::Validation(v) => v,
        other => panic!("expected validation error, got {other:?}"),
    };
    assert_eq!(
        v.fields,
        vec![InvalidField::Name, InvalidField::Score, InvalidField::Time]
    );
    assert!(store.is_empty());
    assert_eq!(store.revision(), 0);
    assert!(store.drain_pending().is_empty());
}

#[test]
fn ids_are_unique_across_adds() {
    let mut store = EntryStore::new();
    for i in 0..50 {
        store
            .add(&EntryForm::new(format!("P{i}"), "Org", "1", "1"))
            .expect("add");
    }
    let mut ids: Vec<_> = store.list().iter().map(|e| e.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 50);
}

#[test]
fn update_patches_fields_but_not_identity() {
    let mut store = EntryStore::new();
    let (entry, _) = store
        .add(&EntryForm::new("Alice", "MIT", "500", "10"))
        .expect("add");

    let applied = store
        .update(
            &entry.id,
            EntryPatch {
                score: Some(750),
                ..EntryPatch::default()
            },
        )
        .expect("known id");
    assert_eq!(applied.revision, 2);

    let updated = store.get(&entry.id).expect("present");
    assert_eq!(updated.score, 750);
    assert_eq!(updated.name, "Alice");
    assert_eq!(updated.timestamp, entry.timestamp);

    assert!(store.update("missing", EntryPatch { score: Some(1), ..EntryPatch::default() }).is_none());
    assert!(store.update(&entry.id, EntryPatch::default()).is_none());
    assert_eq!(store.revision(), 2);
}

#[test]
fn delete_is_idempotent_and_keeps_order() {
    let mut store = EntryStore::new();
    let ids: Vec<_> = ["A", "B", "C"]
        .iter()
        .map(|n| store.add(&EntryForm::new(*n, "Org", "1", "1")).expect("add").0.id)
        .collect();

    assert!(store.delete(&ids[1]).is_some());
    assert!(store.delete(&ids[1]).is_none());
    assert!(store.delete("never-existed").is_none());

    let names: Vec<_> = store.list().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["A", "C"]);
    assert_eq!(store.get(&ids[2]).map(|e| e.name.as_str()), Some("C"));
}

#[test]
fn drain_pending_returns_each_mutation_once() {
    let mut store = EntryStore::new();
    let (entry, _) = store.add(&EntryForm::new("A", "Org", "1", "1")).expect("add");
    store.delete(&entry.id);

    let drained = store.drain_pending();
    assert_eq!(drained.len(), 2);
    assert!(matches!(drained[1].mutation, Mutation::Deleted { .. }));
    assert!(store.drain_pending().is_empty());
}
