use notifyhub_core::db::open_db_in_memory;
use notifyhub_core::{Draft, DraftStore, InMemoryDraftStore, SqliteDraftStore};
use rusqlite::Connection;

fn for_each_store(scenario: impl Fn(&dyn DraftStore)) {
    let conn: Connection = open_db_in_memory().unwrap();
    scenario(&SqliteDraftStore::new(&conn));
    scenario(&InMemoryDraftStore::new());
}

#[test]
fn absent_keys_read_as_empty_draft() {
    for_each_store(|store| {
        assert_eq!(store.load_draft().unwrap(), Draft::default());
    });
}

#[test]
fn subject_and_body_are_saved_independently() {
    for_each_store(|store| {
        store.save_subject("Outage").unwrap();
        assert_eq!(
            store.load_draft().unwrap(),
            Draft {
                subject: "Outage".to_string(),
                body: String::new(),
            }
        );

        store.save_body("<p>details</p>").unwrap();
        store.save_subject("Outage resolved").unwrap();
        let draft = store.load_draft().unwrap();
        assert_eq!(draft.subject, "Outage resolved");
        assert_eq!(draft.body, "<p>details</p>");
    });
}

#[test]
fn clear_removes_both_keys() {
    for_each_store(|store| {
        store.save_subject("s").unwrap();
        store.save_body("b").unwrap();
        store.clear_draft().unwrap();
        assert!(store.load_draft().unwrap().is_empty());
    });
}
