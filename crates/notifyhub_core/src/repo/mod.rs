//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for groups and drafts.
//! - Isolate SQLite query details from service orchestration.
//! - Provide in-memory backings with identical semantics for tests.
//!
//! # Invariants
//! - Group writes enforce `AppGroupFields::validate()` and name uniqueness
//!   before persistence.
//! - Repository APIs return semantic errors (`DuplicateName`, `NotFound`) in
//!   addition to DB transport errors.

pub mod app_group_repo;
pub mod draft_repo;
pub mod memory;
