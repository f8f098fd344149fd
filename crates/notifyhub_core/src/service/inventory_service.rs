//! Inventory view-model: group list, search, edit form and copy actions.
//!
//! # Responsibility
//! - Keep a cached group list in sync with the repository after mutations.
//! - Own the create/edit form buffer and surface its validation errors.
//! - Export deduplicated addresses to the clipboard with a transient notice.
//!
//! # Invariants
//! - A failed save keeps the form open with the error message set.
//! - A successful save or delete refreshes the cached list.
//! - Deletion only happens after explicit confirmation.

use crate::model::app_group::{AppGroup, AppGroupFields, AppGroupId, AppGroupPatch, EmailCategory};
use crate::model::email::{add_email, add_emails, pop_email, remove_email, EmailInputError};
use crate::repo::app_group_repo::{AppGroupRepository, RepoError, RepoResult};
use crate::resolve::recipients::{join_addresses, union_all_emails, CLIPBOARD_DELIMITER};
use crate::service::host::{Clipboard, Confirm, Notice};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

const NAME_REQUIRED_MESSAGE: &str = "App Group Name is required";
const COPIED_MESSAGE: &str = "email id's copied";
const DELETE_PROMPT: &str = "Are you sure you want to delete this group?";
const DEFAULT_NOTICE_TTL: Duration = Duration::from_millis(2000);

/// Inventory use-case errors.
#[derive(Debug)]
pub enum InventoryError {
    /// Client-side form validation failure.
    Validation(String),
    /// Save/edit requested while no form is open.
    NoOpenForm,
    Clipboard(String),
    Repo(RepoError),
}

impl Display for InventoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::NoOpenForm => write!(f, "no group form is open"),
            Self::Clipboard(message) => write!(f, "failed to copy to clipboard: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for InventoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for InventoryError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Create/edit form buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupForm {
    /// `Some` when editing an existing group.
    pub editing: Option<AppGroupId>,
    pub fields: AppGroupFields,
    /// Last save error, shown next to the form.
    pub error: Option<String>,
}

impl GroupForm {
    fn create() -> Self {
        Self {
            editing: None,
            fields: AppGroupFields::default(),
            error: None,
        }
    }

    fn edit(group: &AppGroup) -> Self {
        Self {
            editing: Some(group.id),
            fields: group.fields.clone(),
            error: None,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.fields.app_group_name = name.into();
    }

    /// Adds one address to `category`; see [`add_email`].
    pub fn add_email(
        &mut self,
        category: EmailCategory,
        input: &str,
    ) -> Result<bool, EmailInputError> {
        add_email(self.fields.emails_mut(category), input)
    }

    /// Adds a pasted address list to `category`; see [`add_emails`].
    pub fn add_emails(
        &mut self,
        category: EmailCategory,
        input: &str,
    ) -> Result<usize, EmailInputError> {
        add_emails(self.fields.emails_mut(category), input)
    }

    pub fn remove_email(&mut self, category: EmailCategory, index: usize) -> Option<String> {
        remove_email(self.fields.emails_mut(category), index)
    }

    pub fn pop_email(&mut self, category: EmailCategory) -> Option<String> {
        pop_email(self.fields.emails_mut(category))
    }

    pub fn clear_category(&mut self, category: EmailCategory) {
        self.fields.emails_mut(category).clear();
    }
}

/// Inventory view-model over a group repository.
pub struct InventoryService<R: AppGroupRepository, C: Clipboard> {
    repo: R,
    clipboard: C,
    groups: Vec<AppGroup>,
    query: String,
    form: Option<GroupForm>,
    notice: Option<Notice>,
    notice_ttl: Duration,
}

impl<R: AppGroupRepository, C: Clipboard> InventoryService<R, C> {
    /// Creates the view-model and loads the current group list.
    pub fn new(repo: R, clipboard: C) -> RepoResult<Self> {
        let groups = repo.list_groups()?;
        Ok(Self {
            repo,
            clipboard,
            groups,
            query: String::new(),
            form: None,
            notice: None,
            notice_ttl: DEFAULT_NOTICE_TTL,
        })
    }

    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }

    /// Reloads the cached list from the repository.
    pub fn refresh(&mut self) -> RepoResult<&[AppGroup]> {
        self.groups = self.repo.list_groups()?;
        Ok(&self.groups)
    }

    /// All groups in insertion order, regardless of the search query.
    pub fn groups(&self) -> &[AppGroup] {
        &self.groups
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Groups whose name or any address contains the query, ignoring case.
    pub fn filtered_groups(&self) -> Vec<&AppGroup> {
        let needle = self.query.to_lowercase();
        self.groups
            .iter()
            .filter(|group| group.matches_query(&needle))
            .collect()
    }

    pub fn find_group(&self, id: AppGroupId) -> Option<&AppGroup> {
        self.groups.iter().find(|group| group.id == id)
    }

    /// Opens an empty create form, discarding any open form.
    pub fn open_create(&mut self) -> &mut GroupForm {
        self.form.insert(GroupForm::create())
    }

    /// Opens an edit form seeded from the cached group.
    pub fn open_edit(&mut self, id: AppGroupId) -> Result<&mut GroupForm, InventoryError> {
        let group = self
            .groups
            .iter()
            .find(|group| group.id == id)
            .ok_or(RepoError::NotFound(id))?;
        Ok(self.form.insert(GroupForm::edit(group)))
    }

    pub fn form(&self) -> Option<&GroupForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut GroupForm> {
        self.form.as_mut()
    }

    /// Closes the form without saving.
    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Validates and persists the open form.
    ///
    /// On success the list is refreshed and the form closed. On failure the
    /// form stays open with `error` set to the returned error's message.
    pub fn save(&mut self) -> Result<AppGroup, InventoryError> {
        let form = self.form.as_mut().ok_or(InventoryError::NoOpenForm)?;
        if form.fields.app_group_name.trim().is_empty() {
            form.error = Some(NAME_REQUIRED_MESSAGE.to_string());
            return Err(InventoryError::Validation(NAME_REQUIRED_MESSAGE.to_string()));
        }

        let result = match form.editing {
            Some(id) => self
                .repo
                .update_group(id, &AppGroupPatch::from(form.fields.clone())),
            None => self.repo.create_group(form.fields.clone()),
        };

        match result {
            Ok(group) => {
                self.form = None;
                self.refresh()?;
                info!(
                    "event=group_save module=inventory status=ok group_id={}",
                    group.id
                );
                Ok(group)
            }
            Err(err) => {
                warn!(
                    "event=group_save module=inventory status=error error_code={}",
                    repo_error_code(&err)
                );
                form.error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Deletes a group after confirmation.
    ///
    /// Returns `false` when the user declined. Unknown ids are a no-op.
    pub fn remove(&mut self, id: AppGroupId, confirm: &dyn Confirm) -> Result<bool, InventoryError> {
        if !confirm.confirm(DELETE_PROMPT) {
            info!("event=group_delete module=inventory status=cancelled group_id={id}");
            return Ok(false);
        }

        self.repo.delete_group(id)?;
        self.refresh()?;
        Ok(true)
    }

    /// Copies the deduplicated addresses of one group (all five categories).
    pub fn copy_group(&mut self, id: AppGroupId) -> Result<String, InventoryError> {
        let group = self.find_group(id).ok_or(RepoError::NotFound(id))?;
        let joined = join_addresses(&union_all_emails([group]), CLIPBOARD_DELIMITER);
        self.write_clipboard(joined)
    }

    /// Copies the deduplicated addresses of every group matching the query.
    pub fn copy_visible(&mut self) -> Result<String, InventoryError> {
        let joined = join_addresses(
            &union_all_emails(self.filtered_groups()),
            CLIPBOARD_DELIMITER,
        );
        self.write_clipboard(joined)
    }

    /// Currently visible acknowledgment, if any.
    pub fn notice_at(&self, now: Instant) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|notice| notice.is_visible_at(now))
            .map(|notice| notice.message.as_str())
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice_at(Instant::now())
    }

    fn write_clipboard(&mut self, text: String) -> Result<String, InventoryError> {
        self.clipboard
            .write_text(&text)
            .map_err(InventoryError::Clipboard)?;
        self.notice = Some(Notice::new(COPIED_MESSAGE, Instant::now(), self.notice_ttl));
        info!(
            "event=emails_copy module=inventory status=ok address_count={}",
            text.split(CLIPBOARD_DELIMITER).filter(|s| !s.is_empty()).count()
        );
        Ok(text)
    }
}

fn repo_error_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::Validation(_) => "validation",
        RepoError::DuplicateName(_) => "duplicate_name",
        RepoError::NotFound(_) => "not_found",
        RepoError::InvalidData(_) => "invalid_data",
        RepoError::Db(_) => "db",
    }
}
