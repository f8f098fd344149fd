//! Notification dispatch strategies.
//!
//! # Responsibility
//! - Define the request payload and the single-method dispatcher seam.
//! - Provide the local mail-client handoff and the simulated remote service.
//! - Build exactly one active strategy from configuration.
//!
//! # Invariants
//! - Dispatchers never mutate draft or selection state.
//! - Recipient/subject preconditions are checked by the caller, not here.

use crate::config::{DispatchConfig, DispatchStrategy};
use crate::model::app_group::AppGroupId;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub mod mailto;
pub mod plain_text;
pub mod simulated;

pub use mailto::{build_mailto_uri, MailLauncher, MailtoDispatcher, SystemMailLauncher};
pub use plain_text::html_to_plain_text;
pub use simulated::SimulatedRemoteDispatcher;

/// Payload handed to a dispatcher; also the remote wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    /// Rich-text (HTML) body as composed.
    pub body: String,
    pub selected_group_ids: Vec<AppGroupId>,
}

/// What a successful dispatch actually guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The platform mail handler was invoked; delivery is not observable.
    HandedToMailClient,
    /// The delivery service accepted the request.
    AcceptedByService,
}

/// Send-time failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Transient backend failure; the user may retry.
    ServiceUnavailable(String),
    /// The platform refused to open the mail handler.
    Launch(String),
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ServiceUnavailable(message) => write!(f, "{message}"),
            Self::Launch(message) => write!(f, "failed to open mail client: {message}"),
        }
    }
}

impl Error for DispatchError {}

/// Delivery capability used by the composer.
pub trait NotificationDispatcher {
    fn send(&self, request: &SendNotificationRequest) -> Result<DispatchOutcome, DispatchError>;
}

impl<T: NotificationDispatcher + ?Sized> NotificationDispatcher for Box<T> {
    fn send(&self, request: &SendNotificationRequest) -> Result<DispatchOutcome, DispatchError> {
        (**self).send(request)
    }
}

impl<T: NotificationDispatcher + ?Sized> NotificationDispatcher for &T {
    fn send(&self, request: &SendNotificationRequest) -> Result<DispatchOutcome, DispatchError> {
        (**self).send(request)
    }
}

/// Builds the configured strategy.
pub fn build_dispatcher(config: &DispatchConfig) -> Box<dyn NotificationDispatcher> {
    match config.strategy {
        DispatchStrategy::Mailto => Box::new(MailtoDispatcher::new(SystemMailLauncher)),
        DispatchStrategy::Simulated => Box::new(SimulatedRemoteDispatcher::new(
            Duration::from_millis(config.simulated_delay_ms),
            config.simulated_failure_rate,
        )),
    }
}
