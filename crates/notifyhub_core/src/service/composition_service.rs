//! Composition view-model: group selection, draft and dispatch.
//!
//! # Responsibility
//! - Persist subject/body on every change; keep selection transient.
//! - Recompute To/Cc from the selection while leaving them hand-editable.
//! - Validate send preconditions and turn the dispatch result into a status.
//!
//! # Invariants
//! - To/Cc are overwritten only when the selection or group list changes.
//! - A successful send never clears subject or body.
//! - At most one send is in flight.

use crate::dispatch::{
    DispatchError, DispatchOutcome, NotificationDispatcher, SendNotificationRequest,
};
use crate::model::app_group::{AppGroup, AppGroupId};
use crate::model::draft::Draft;
use crate::repo::app_group_repo::{AppGroupRepository, RepoError, RepoResult};
use crate::repo::draft_repo::DraftStore;
use crate::resolve::recipients::{
    join_addresses, resolve_recipients, split_addresses, HEADER_DELIMITER,
};
use crate::service::host::Confirm;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const RECIPIENT_REQUIRED_MESSAGE: &str = "At least one recipient (To or CC) is required.";
const SUBJECT_REQUIRED_MESSAGE: &str = "Email subject is required.";
const SENT_MESSAGE: &str = "Notification sent successfully!";
const RESET_PROMPT: &str = "Are you sure you want to clear the subject and body?";

/// Composition use-case errors.
#[derive(Debug)]
pub enum CompositionError {
    /// A send precondition failed; nothing was dispatched.
    Validation(String),
    SendInFlight,
    Dispatch(DispatchError),
    Repo(RepoError),
}

impl Display for CompositionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::SendInFlight => write!(f, "a notification is already being sent"),
            Self::Dispatch(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CompositionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Dispatch(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Validation(_) | Self::SendInFlight => None,
        }
    }
}

impl From<RepoError> for CompositionError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DispatchError> for CompositionError {
    fn from(value: DispatchError) -> Self {
        Self::Dispatch(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// Outcome banner shown until dismissed or replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub message: String,
}

impl StatusMessage {
    fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }
}

/// Notification composer over a draft store and a dispatcher.
pub struct CompositionService<D: DraftStore, N: NotificationDispatcher> {
    drafts: D,
    dispatcher: N,
    groups: Vec<AppGroup>,
    selected: Vec<AppGroupId>,
    to_field: String,
    cc_field: String,
    subject: String,
    body: String,
    status: Option<StatusMessage>,
    is_sending: bool,
}

impl<D: DraftStore, N: NotificationDispatcher> CompositionService<D, N> {
    /// Creates the composer, restoring the persisted draft.
    pub fn new(drafts: D, dispatcher: N) -> RepoResult<Self> {
        let Draft { subject, body } = drafts.load_draft()?;
        Ok(Self {
            drafts,
            dispatcher,
            groups: Vec::new(),
            selected: Vec::new(),
            to_field: String::new(),
            cc_field: String::new(),
            subject,
            body,
            status: None,
            is_sending: false,
        })
    }

    /// Replaces the known group list and recomputes recipients.
    ///
    /// Selected ids that no longer name a group are dropped.
    pub fn set_groups(&mut self, groups: Vec<AppGroup>) {
        self.groups = groups;
        let groups = &self.groups;
        self.selected
            .retain(|id| groups.iter().any(|group| group.id == *id));
        self.recompute_recipients();
    }

    /// Reloads groups from `repo` and recomputes recipients.
    pub fn refresh_groups<R: AppGroupRepository>(&mut self, repo: &R) -> RepoResult<()> {
        self.set_groups(repo.list_groups()?);
        Ok(())
    }

    pub fn groups(&self) -> &[AppGroup] {
        &self.groups
    }

    /// Selected ids in the order they were picked.
    pub fn selected_ids(&self) -> &[AppGroupId] {
        &self.selected
    }

    pub fn is_selected(&self, id: AppGroupId) -> bool {
        self.selected.contains(&id)
    }

    /// Adds `id` to the selection, or removes it when already selected.
    pub fn toggle_group(&mut self, id: AppGroupId) {
        if let Some(index) = self.selected.iter().position(|selected| *selected == id) {
            self.selected.remove(index);
        } else {
            self.selected.push(id);
        }
        self.recompute_recipients();
    }

    /// Replaces the selection, dropping repeated ids.
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = AppGroupId>) {
        self.selected.clear();
        for id in ids {
            if !self.selected.contains(&id) {
                self.selected.push(id);
            }
        }
        self.recompute_recipients();
    }

    pub fn select_all(&mut self) {
        let ids: Vec<AppGroupId> = self.groups.iter().map(|group| group.id).collect();
        self.set_selection(ids);
    }

    pub fn deselect_all(&mut self) {
        self.set_selection(Vec::new());
    }

    /// Clears the selection when every group is selected, else selects all.
    pub fn toggle_select_all(&mut self) {
        if self.selected.len() == self.groups.len() {
            self.deselect_all();
        } else {
            self.select_all();
        }
    }

    pub fn to_field(&self) -> &str {
        &self.to_field
    }

    pub fn cc_field(&self) -> &str {
        &self.cc_field
    }

    /// Hand-edits the To line; kept until the selection changes.
    pub fn set_to_field(&mut self, value: impl Into<String>) {
        self.to_field = value.into();
    }

    /// Hand-edits the Cc line; kept until the selection changes.
    pub fn set_cc_field(&mut self, value: impl Into<String>) {
        self.cc_field = value.into();
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) -> RepoResult<()> {
        self.subject = subject.into();
        self.drafts.save_subject(&self.subject)
    }

    pub fn set_body(&mut self, body: impl Into<String>) -> RepoResult<()> {
        self.body = body.into();
        self.drafts.save_body(&self.body)
    }

    /// Clears subject, body and status after confirmation.
    ///
    /// Selection is kept. Returns `false` when the user declined.
    pub fn reset(&mut self, confirm: &dyn Confirm) -> RepoResult<bool> {
        if !confirm.confirm(RESET_PROMPT) {
            return Ok(false);
        }

        self.drafts.clear_draft()?;
        self.subject.clear();
        self.body.clear();
        self.status = None;
        info!("event=draft_reset module=composition status=ok");
        Ok(true)
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn dismiss_status(&mut self) {
        self.status = None;
    }

    /// Whether a dispatch is in progress; hosts disable the send action.
    pub fn is_sending(&self) -> bool {
        self.is_sending
    }

    /// Validates and dispatches the current composition in one step.
    ///
    /// The result is also reflected in [`Self::status`].
    pub fn send(&mut self) -> Result<DispatchOutcome, CompositionError> {
        let request = self.begin_send()?;
        let result = self.dispatcher.send(&request);
        self.complete_send(&request, result)
    }

    /// Validates preconditions and marks a send as in flight.
    ///
    /// Hosts that dispatch off the UI turn call this, run the returned
    /// request through the dispatcher, then call [`Self::complete_send`].
    /// A second call before completion fails with `SendInFlight`.
    pub fn begin_send(&mut self) -> Result<SendNotificationRequest, CompositionError> {
        if self.is_sending {
            return Err(CompositionError::SendInFlight);
        }

        let to = split_addresses(&self.to_field);
        let cc = split_addresses(&self.cc_field);
        if to.is_empty() && cc.is_empty() {
            return Err(self.reject(RECIPIENT_REQUIRED_MESSAGE));
        }
        if self.subject.trim().is_empty() {
            return Err(self.reject(SUBJECT_REQUIRED_MESSAGE));
        }

        self.is_sending = true;
        self.status = None;
        Ok(SendNotificationRequest {
            to,
            cc,
            subject: self.subject.clone(),
            body: self.body.clone(),
            selected_group_ids: self.selected.clone(),
        })
    }

    /// Clears the in-flight flag and turns the dispatch result into a status.
    pub fn complete_send(
        &mut self,
        request: &SendNotificationRequest,
        result: Result<DispatchOutcome, DispatchError>,
    ) -> Result<DispatchOutcome, CompositionError> {
        self.is_sending = false;
        match result {
            Ok(outcome) => {
                self.status = Some(StatusMessage::success(SENT_MESSAGE));
                info!(
                    "event=notification_send module=composition status=ok group_count={}",
                    request.selected_group_ids.len()
                );
                Ok(outcome)
            }
            Err(err) => {
                self.status = Some(StatusMessage::error(err.to_string()));
                warn!("event=notification_send module=composition status=error");
                Err(err.into())
            }
        }
    }

    fn reject(&mut self, message: &str) -> CompositionError {
        self.status = Some(StatusMessage::error(message));
        CompositionError::Validation(message.to_string())
    }

    fn recompute_recipients(&mut self) {
        let resolved = resolve_recipients(&self.selected, &self.groups);
        self.to_field = join_addresses(&resolved.to, HEADER_DELIMITER);
        self.cc_field = join_addresses(&resolved.cc, HEADER_DELIMITER);
    }
}
