//! Recipient resolution from selected groups.
//!
//! # Responsibility
//! - Derive deduplicated To/Cc address lists from a group selection.
//! - Provide the shared union/dedup/join helpers used by copy and send flows.
//!
//! # Invariants
//! - Resolution is pure: same selection and groups always yield the same
//!   output.
//! - Deduplication keeps the first occurrence and its position.

pub mod recipients;
