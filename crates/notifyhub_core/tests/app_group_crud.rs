use notifyhub_core::db::open_db_in_memory;
use notifyhub_core::{
    AppGroupFields, AppGroupPatch, AppGroupRepository, EmailCategory, InMemoryAppGroupRepository,
    RepoError, SqliteAppGroupRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn core_fields() -> AppGroupFields {
    AppGroupFields::new("Core")
        .with_emails(EmailCategory::LeadPoc, ["a@x.com"])
        .with_emails(EmailCategory::TeamMember, ["b@x.com"])
        .with_emails(EmailCategory::GroupDl, ["a@x.com"])
        .with_emails(EmailCategory::DependentGroupDl, ["dep@x.com"])
}

/// Runs one scenario against both repository backings.
fn for_each_repo(scenario: impl Fn(&dyn AppGroupRepository)) {
    let conn: Connection = open_db_in_memory().unwrap();
    scenario(&SqliteAppGroupRepository::new(&conn));
    scenario(&InMemoryAppGroupRepository::new());
}

#[test]
fn create_then_list_contains_exactly_the_returned_record() {
    for_each_repo(|repo| {
        let existing = repo.create_group(AppGroupFields::new("Payments")).unwrap();
        let created = repo.create_group(core_fields()).unwrap();

        let listed = repo.list_groups().unwrap();
        assert_eq!(listed, vec![existing, created.clone()]);
        assert_eq!(repo.get_group(created.id).unwrap(), Some(created));
    });
}

#[test]
fn duplicate_name_is_rejected_case_insensitively() {
    for_each_repo(|repo| {
        repo.create_group(AppGroupFields::new("CORE")).unwrap();

        let err = repo.create_group(AppGroupFields::new("Core")).unwrap_err();
        assert!(matches!(err, RepoError::DuplicateName(ref name) if name == "Core"));
        assert_eq!(err.to_string(), "App Group Name \"Core\" already exists.");
        assert_eq!(repo.list_groups().unwrap().len(), 1);
    });
}

#[test]
fn names_are_trimmed_before_storage_and_uniqueness() {
    for_each_repo(|repo| {
        let created = repo.create_group(AppGroupFields::new("  Core ")).unwrap();
        assert_eq!(created.name(), "Core");
        assert_eq!(repo.list_groups().unwrap()[0].name(), "Core");

        let err = repo.create_group(AppGroupFields::new(" core")).unwrap_err();
        assert!(matches!(err, RepoError::DuplicateName(ref name) if name == "core"));

        let other = repo.create_group(AppGroupFields::new("Search")).unwrap();
        let err = repo
            .update_group(other.id, &AppGroupPatch::rename("CORE  "))
            .unwrap_err();
        assert!(matches!(err, RepoError::DuplicateName(_)));

        let renamed = repo
            .update_group(other.id, &AppGroupPatch::rename("  Search Infra  "))
            .unwrap();
        assert_eq!(renamed.name(), "Search Infra");
    });
}

#[test]
fn update_merges_fields_and_keeps_identity_and_position() {
    for_each_repo(|repo| {
        let first = repo.create_group(core_fields()).unwrap();
        let second = repo.create_group(AppGroupFields::new("Search")).unwrap();

        let patch = AppGroupPatch::rename("Core Platform")
            .with_emails(EmailCategory::AdditionalGroupDl, ["extra@x.com"]);
        let updated = repo.update_group(first.id, &patch).unwrap();

        assert_eq!(updated.id, first.id);
        assert_eq!(updated.created_at, first.created_at);
        assert_eq!(updated.name(), "Core Platform");
        assert_eq!(updated.fields.lead_poc_emails, first.fields.lead_poc_emails);
        assert_eq!(
            updated.fields.additional_group_dl_emails,
            vec!["extra@x.com".to_string()]
        );

        let listed = repo.list_groups().unwrap();
        assert_eq!(listed, vec![updated, second]);
    });
}

#[test]
fn renaming_to_own_name_with_different_case_is_allowed() {
    for_each_repo(|repo| {
        let group = repo.create_group(AppGroupFields::new("Core")).unwrap();
        let updated = repo
            .update_group(group.id, &AppGroupPatch::rename("CORE"))
            .unwrap();
        assert_eq!(updated.name(), "CORE");
    });
}

#[test]
fn renaming_onto_another_group_fails_and_changes_nothing() {
    for_each_repo(|repo| {
        repo.create_group(AppGroupFields::new("Core")).unwrap();
        let other = repo.create_group(AppGroupFields::new("Search")).unwrap();

        let err = repo
            .update_group(other.id, &AppGroupPatch::rename("core"))
            .unwrap_err();
        assert!(matches!(err, RepoError::DuplicateName(_)));
        assert_eq!(repo.get_group(other.id).unwrap().unwrap().name(), "Search");
    });
}

#[test]
fn update_unknown_id_returns_not_found() {
    for_each_repo(|repo| {
        let id = Uuid::new_v4();
        let err = repo
            .update_group(id, &AppGroupPatch::rename("Ghost"))
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(missing) if missing == id));
        assert_eq!(err.to_string(), "Group not found");
    });
}

#[test]
fn invalid_content_is_rejected_on_create_and_update() {
    for_each_repo(|repo| {
        let err = repo.create_group(AppGroupFields::new("  ")).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));

        let group = repo.create_group(AppGroupFields::new("Core")).unwrap();
        let patch = AppGroupPatch::default().with_emails(EmailCategory::TeamMember, ["nope"]);
        let err = repo.update_group(group.id, &patch).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert!(repo.get_group(group.id).unwrap().unwrap().fields.team_member_emails.is_empty());
    });
}

#[test]
fn deleting_unknown_id_is_a_noop() {
    for_each_repo(|repo| {
        let kept = repo.create_group(core_fields()).unwrap();
        let before = repo.list_groups().unwrap();

        assert!(!repo.delete_group(Uuid::new_v4()).unwrap());
        assert_eq!(repo.list_groups().unwrap(), before);

        assert!(repo.delete_group(kept.id).unwrap());
        assert!(repo.list_groups().unwrap().is_empty());
    });
}

#[test]
fn ids_are_not_reused_after_delete() {
    for_each_repo(|repo| {
        let first = repo.create_group(AppGroupFields::new("Core")).unwrap();
        repo.delete_group(first.id).unwrap();
        let second = repo.create_group(AppGroupFields::new("Core")).unwrap();
        assert_ne!(first.id, second.id);
    });
}

#[test]
fn corrupted_email_column_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAppGroupRepository::new(&conn);
    let group = repo.create_group(core_fields()).unwrap();

    conn.execute(
        "UPDATE app_groups SET team_member_emails = 'not json' WHERE id = ?1;",
        [group.id.to_string()],
    )
    .unwrap();

    let err = repo.list_groups().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("team_member_emails")));
}

#[test]
fn groups_survive_reopening_a_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notifyhub.sqlite3");

    let created = {
        let conn = notifyhub_core::db::open_db(&path).unwrap();
        let repo = SqliteAppGroupRepository::new(&conn);
        let group = repo.create_group(core_fields()).unwrap();
        group
    };

    let conn = notifyhub_core::db::open_db(&path).unwrap();
    let listed = SqliteAppGroupRepository::new(&conn).list_groups().unwrap();
    assert_eq!(listed, vec![created]);
}
