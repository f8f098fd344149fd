//! View-model services driving the two views.
//!
//! # Responsibility
//! - `InventoryService`: list/search/create/edit/delete/copy over groups.
//! - `CompositionService`: selection, draft, recipient fields and send.
//! - Keep hosts (CLI, GUI shells) decoupled from storage and dispatch.
//!
//! # Invariants
//! - Every failure is recoverable; services stay usable after any error.
//! - Services call repositories and dispatchers only through their traits.

pub mod composition_service;
pub mod host;
pub mod inventory_service;
