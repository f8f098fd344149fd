//! Domain model for application groups and notification drafts.
//!
//! # Responsibility
//! - Define the records the registry stores and the composer reads.
//! - Own input-time validation rules for names and email entries.
//!
//! # Invariants
//! - Every group is identified by a stable `AppGroupId` that is never reused.
//! - Group names are unique case-insensitively (enforced by repositories).
//! - No email category holds the same address twice.

pub mod app_group;
pub mod draft;
pub mod email;
