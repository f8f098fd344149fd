use notifyhub_core::{
    AppGroupFields, AppGroupRepository, Clipboard, EmailCategory, EmailInputError,
    InMemoryAppGroupRepository, InventoryError, InventoryService, RepoError,
};
use std::cell::RefCell;
use std::time::{Duration, Instant};
use uuid::Uuid;

#[derive(Default)]
struct RecordingClipboard {
    writes: RefCell<Vec<String>>,
}

impl Clipboard for RecordingClipboard {
    fn write_text(&self, text: &str) -> Result<(), String> {
        self.writes.borrow_mut().push(text.to_string());
        Ok(())
    }
}

struct BrokenClipboard;

impl Clipboard for BrokenClipboard {
    fn write_text(&self, _text: &str) -> Result<(), String> {
        Err("no clipboard".to_string())
    }
}

fn seeded_repo() -> InMemoryAppGroupRepository {
    let repo = InMemoryAppGroupRepository::new();
    repo.create_group(
        AppGroupFields::new("Core")
            .with_emails(EmailCategory::LeadPoc, ["a@x.com"])
            .with_emails(EmailCategory::TeamMember, ["b@x.com"])
            .with_emails(EmailCategory::DependentGroupDl, ["a@x.com", "dep@x.com"]),
    )
    .unwrap();
    repo.create_group(
        AppGroupFields::new("Payments")
            .with_emails(EmailCategory::GroupDl, ["pay-dl@corp.com"])
            .with_emails(EmailCategory::AdditionalGroupDl, ["b@x.com"]),
    )
    .unwrap();
    repo
}

#[test]
fn search_matches_name_or_any_address_ignoring_case() {
    let clipboard = RecordingClipboard::default();
    let mut inventory = InventoryService::new(seeded_repo(), &clipboard).unwrap();

    assert_eq!(inventory.filtered_groups().len(), 2);

    inventory.set_query("PAY");
    let names: Vec<_> = inventory.filtered_groups().iter().map(|g| g.name().to_string()).collect();
    assert_eq!(names, vec!["Payments"]);

    inventory.set_query("DEP@X");
    let names: Vec<_> = inventory.filtered_groups().iter().map(|g| g.name().to_string()).collect();
    assert_eq!(names, vec!["Core"]);

    inventory.set_query("b@x.com");
    assert_eq!(inventory.filtered_groups().len(), 2);

    inventory.set_query("nobody");
    assert!(inventory.filtered_groups().is_empty());
}

#[test]
fn create_form_saves_refreshes_and_closes() {
    let clipboard = RecordingClipboard::default();
    let mut inventory = InventoryService::new(InMemoryAppGroupRepository::new(), &clipboard).unwrap();

    let form = inventory.open_create();
    assert!(!form.is_edit());
    form.set_name("Search");
    form.add_email(EmailCategory::LeadPoc, "lead@x.com").unwrap();
    form.add_emails(EmailCategory::TeamMember, "t1@x.com; t2@x.com").unwrap();

    let saved = inventory.save().unwrap();
    assert!(inventory.form().is_none());
    assert_eq!(inventory.groups(), &[saved.clone()]);
    assert_eq!(saved.fields.team_member_emails, vec!["t1@x.com", "t2@x.com"]);
}

#[test]
fn blank_name_keeps_form_open_with_message() {
    let clipboard = RecordingClipboard::default();
    let mut inventory = InventoryService::new(InMemoryAppGroupRepository::new(), &clipboard).unwrap();

    inventory.open_create().set_name("   ");
    let err = inventory.save().unwrap_err();
    assert!(matches!(err, InventoryError::Validation(_)));

    let form = inventory.form().expect("form stays open");
    assert_eq!(form.error.as_deref(), Some("App Group Name is required"));
    assert!(inventory.groups().is_empty());
}

#[test]
fn duplicate_name_surfaces_store_message_without_closing() {
    let clipboard = RecordingClipboard::default();
    let mut inventory = InventoryService::new(seeded_repo(), &clipboard).unwrap();

    inventory.open_create().set_name("core");
    let err = inventory.save().unwrap_err();
    assert!(matches!(err, InventoryError::Repo(RepoError::DuplicateName(_))));
    assert_eq!(
        inventory.form().and_then(|form| form.error.as_deref()),
        Some("App Group Name \"core\" already exists.")
    );
    assert_eq!(inventory.groups().len(), 2);
}

#[test]
fn reopening_a_form_clears_previous_error() {
    let clipboard = RecordingClipboard::default();
    let mut inventory = InventoryService::new(seeded_repo(), &clipboard).unwrap();

    inventory.open_create();
    inventory.save().unwrap_err();
    assert!(inventory.form().unwrap().error.is_some());

    assert!(inventory.open_create().error.is_none());
}

#[test]
fn edit_form_is_seeded_and_updates_in_place() {
    let clipboard = RecordingClipboard::default();
    let mut inventory = InventoryService::new(seeded_repo(), &clipboard).unwrap();
    let core_id = inventory.groups()[0].id;

    let form = inventory.open_edit(core_id).unwrap();
    assert!(form.is_edit());
    assert_eq!(form.fields.app_group_name, "Core");
    assert_eq!(form.fields.lead_poc_emails, vec!["a@x.com"]);

    form.set_name("Core Platform");
    assert_eq!(form.pop_email(EmailCategory::LeadPoc).as_deref(), Some("a@x.com"));
    let err = form.add_email(EmailCategory::TeamMember, "b@x.com").unwrap_err();
    assert!(matches!(err, EmailInputError::AlreadyPresent(_)));

    let updated = inventory.save().unwrap();
    assert_eq!(updated.id, core_id);
    assert_eq!(inventory.groups()[0].name(), "Core Platform");
    assert!(inventory.groups()[0].fields.lead_poc_emails.is_empty());
}

#[test]
fn edit_of_stale_id_is_not_found() {
    let clipboard = RecordingClipboard::default();
    let mut inventory = InventoryService::new(seeded_repo(), &clipboard).unwrap();
    let err = inventory.open_edit(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, InventoryError::Repo(RepoError::NotFound(_))));
}

#[test]
fn save_without_form_is_rejected() {
    let clipboard = RecordingClipboard::default();
    let mut inventory = InventoryService::new(seeded_repo(), &clipboard).unwrap();
    assert!(matches!(inventory.save(), Err(InventoryError::NoOpenForm)));
}

#[test]
fn remove_requires_confirmation() {
    let clipboard = RecordingClipboard::default();
    let mut inventory = InventoryService::new(seeded_repo(), &clipboard).unwrap();
    let core_id = inventory.groups()[0].id;

    assert!(!inventory.remove(core_id, &|_: &str| false).unwrap());
    assert_eq!(inventory.groups().len(), 2);

    assert!(inventory.remove(core_id, &|_: &str| true).unwrap());
    assert_eq!(inventory.groups().len(), 1);
    assert!(inventory.find_group(core_id).is_none());

    assert!(inventory.remove(Uuid::new_v4(), &|_: &str| true).unwrap());
    assert_eq!(inventory.groups().len(), 1);
}

#[test]
fn copy_group_writes_semicolon_joined_union_and_shows_notice() {
    let clipboard = RecordingClipboard::default();
    let mut inventory = InventoryService::new(seeded_repo(), &clipboard)
        .unwrap()
        .with_notice_ttl(Duration::from_millis(2000));
    let core_id = inventory.groups()[0].id;

    let copied = inventory.copy_group(core_id).unwrap();
    assert_eq!(copied, "a@x.com;b@x.com;dep@x.com");
    assert_eq!(*clipboard.writes.borrow(), vec![copied]);

    let now = Instant::now();
    assert_eq!(inventory.notice_at(now), Some("email id's copied"));
    assert_eq!(inventory.notice_at(now + Duration::from_secs(3)), None);
}

#[test]
fn copy_visible_unions_only_filtered_groups() {
    let clipboard = RecordingClipboard::default();
    let mut inventory = InventoryService::new(seeded_repo(), &clipboard).unwrap();

    assert_eq!(
        inventory.copy_visible().unwrap(),
        "a@x.com;b@x.com;dep@x.com;pay-dl@corp.com"
    );

    inventory.set_query("payments");
    assert_eq!(inventory.copy_visible().unwrap(), "pay-dl@corp.com;b@x.com");
}

#[test]
fn clipboard_failure_is_reported_without_notice() {
    let mut inventory = InventoryService::new(seeded_repo(), BrokenClipboard).unwrap();
    let core_id = inventory.groups()[0].id;

    let err = inventory.copy_group(core_id).unwrap_err();
    assert!(matches!(err, InventoryError::Clipboard(_)));
    assert_eq!(inventory.notice(), None);
}

#[test]
fn refresh_picks_up_writes_made_elsewhere() {
    let repo = seeded_repo();
    let clipboard = RecordingClipboard::default();
    let mut inventory = InventoryService::new(&repo, &clipboard).unwrap();

    repo.create_group(AppGroupFields::new("Late")).unwrap();
    assert_eq!(inventory.groups().len(), 2);
    assert_eq!(inventory.refresh().unwrap().len(), 3);
}
