//! In-memory repository implementations.
//!
//! Backed by `RefCell`, so they follow the same single-writer, synchronous
//! model as the SQLite repositories and are not `Sync`.

use crate::model::app_group::{AppGroup, AppGroupFields, AppGroupId, AppGroupPatch};
use crate::model::draft::Draft;
use crate::repo::app_group_repo::{
    ensure_unique_name, AppGroupRepository, RepoError, RepoResult,
};
use crate::repo::draft_repo::DraftStore;
use std::cell::RefCell;

/// Vec-backed group repository preserving insertion order.
#[derive(Debug, Default)]
pub struct InMemoryAppGroupRepository {
    groups: RefCell<Vec<AppGroup>>,
}

impl InMemoryAppGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the repository with already-identified groups (import paths).
    pub fn with_groups(groups: Vec<AppGroup>) -> Self {
        Self {
            groups: RefCell::new(groups),
        }
    }
}

impl AppGroupRepository for InMemoryAppGroupRepository {
    fn list_groups(&self) -> RepoResult<Vec<AppGroup>> {
        Ok(self.groups.borrow().clone())
    }

    fn get_group(&self, id: AppGroupId) -> RepoResult<Option<AppGroup>> {
        Ok(self
            .groups
            .borrow()
            .iter()
            .find(|group| group.id == id)
            .cloned())
    }

    fn create_group(&self, mut fields: AppGroupFields) -> RepoResult<AppGroup> {
        fields.trim_name();
        fields.validate()?;
        let mut groups = self.groups.borrow_mut();
        ensure_unique_name(groups.iter(), &fields.app_group_name, None)?;

        let group = AppGroup::new(fields);
        groups.push(group.clone());
        Ok(group)
    }

    fn update_group(&self, id: AppGroupId, patch: &AppGroupPatch) -> RepoResult<AppGroup> {
        let mut groups = self.groups.borrow_mut();
        let index = groups
            .iter()
            .position(|group| group.id == id)
            .ok_or(RepoError::NotFound(id))?;

        let mut updated = groups[index].clone();
        patch.apply_to(&mut updated.fields);
        updated.fields.trim_name();
        updated.validate()?;
        ensure_unique_name(groups.iter(), updated.name(), Some(id))?;

        groups[index] = updated.clone();
        Ok(updated)
    }

    fn delete_group(&self, id: AppGroupId) -> RepoResult<bool> {
        let mut groups = self.groups.borrow_mut();
        let before = groups.len();
        groups.retain(|group| group.id != id);
        Ok(groups.len() != before)
    }
}

/// Draft store kept for the lifetime of the value.
#[derive(Debug, Default)]
pub struct InMemoryDraftStore {
    draft: RefCell<Draft>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_draft(draft: Draft) -> Self {
        Self {
            draft: RefCell::new(draft),
        }
    }
}

impl DraftStore for InMemoryDraftStore {
    fn load_draft(&self) -> RepoResult<Draft> {
        Ok(self.draft.borrow().clone())
    }

    fn save_subject(&self, subject: &str) -> RepoResult<()> {
        self.draft.borrow_mut().subject = subject.to_string();
        Ok(())
    }

    fn save_body(&self, body: &str) -> RepoResult<()> {
        self.draft.borrow_mut().body = body.to_string();
        Ok(())
    }

    fn clear_draft(&self) -> RepoResult<()> {
        *self.draft.borrow_mut() = Draft::default();
        Ok(())
    }
}
