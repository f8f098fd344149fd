//! Core domain logic for NotifyHub.
//! This crate is the single source of truth for registry invariants and
//! recipient resolution; hosts only supply clipboard, confirmation and
//! mail-handler capabilities.

pub mod config;
pub mod db;
pub mod dispatch;
pub mod logging;
pub mod model;
pub mod repo;
pub mod resolve;
pub mod service;

pub use config::{load_config, ConfigError, DispatchConfig, DispatchStrategy, NotifyHubConfig};
pub use dispatch::{
    build_dispatcher, build_mailto_uri, html_to_plain_text, DispatchError, DispatchOutcome,
    MailLauncher, MailtoDispatcher, NotificationDispatcher, SendNotificationRequest,
    SimulatedRemoteDispatcher, SystemMailLauncher,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::app_group::{
    AppGroup, AppGroupFields, AppGroupId, AppGroupPatch, AppGroupValidationError, EmailCategory,
};
pub use model::draft::Draft;
pub use model::email::{is_valid_email, EmailInputError};
pub use repo::app_group_repo::{
    AppGroupRepository, RepoError, RepoResult, SqliteAppGroupRepository,
};
pub use repo::draft_repo::{DraftStore, SqliteDraftStore};
pub use repo::memory::{InMemoryAppGroupRepository, InMemoryDraftStore};
pub use resolve::recipients::{resolve_recipients, union_all_emails, ResolvedRecipients};
pub use service::composition_service::{
    CompositionError, CompositionService, StatusKind, StatusMessage,
};
pub use service::host::{Clipboard, Confirm, Notice};
pub use service::inventory_service::{GroupForm, InventoryError, InventoryService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
