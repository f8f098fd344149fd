//! Draft persistence over the `kv_store` table.
//!
//! # Invariants
//! - Subject and body live under independent keys and are written
//!   independently on every change.
//! - Absent keys read as empty strings.

use crate::model::draft::Draft;
use crate::repo::app_group_repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension};

pub const DRAFT_SUBJECT_KEY: &str = "draft_subject";
pub const DRAFT_BODY_KEY: &str = "draft_body";

/// Durable storage for the in-progress notification draft.
pub trait DraftStore {
    fn load_draft(&self) -> RepoResult<Draft>;
    fn save_subject(&self, subject: &str) -> RepoResult<()>;
    fn save_body(&self, body: &str) -> RepoResult<()>;
    /// Removes both keys.
    fn clear_draft(&self) -> RepoResult<()>;
}

impl<T: DraftStore + ?Sized> DraftStore for &T {
    fn load_draft(&self) -> RepoResult<Draft> {
        (**self).load_draft()
    }

    fn save_subject(&self, subject: &str) -> RepoResult<()> {
        (**self).save_subject(subject)
    }

    fn save_body(&self, body: &str) -> RepoResult<()> {
        (**self).save_body(body)
    }

    fn clear_draft(&self) -> RepoResult<()> {
        (**self).clear_draft()
    }
}

/// SQLite-backed draft store.
pub struct SqliteDraftStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDraftStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn read_key(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_key(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }
}

impl DraftStore for SqliteDraftStore<'_> {
    fn load_draft(&self) -> RepoResult<Draft> {
        Ok(Draft {
            subject: self.read_key(DRAFT_SUBJECT_KEY)?.unwrap_or_default(),
            body: self.read_key(DRAFT_BODY_KEY)?.unwrap_or_default(),
        })
    }

    fn save_subject(&self, subject: &str) -> RepoResult<()> {
        self.write_key(DRAFT_SUBJECT_KEY, subject)
    }

    fn save_body(&self, body: &str) -> RepoResult<()> {
        self.write_key(DRAFT_BODY_KEY, body)
    }

    fn clear_draft(&self) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM kv_store WHERE key IN (?1, ?2);",
            params![DRAFT_SUBJECT_KEY, DRAFT_BODY_KEY],
        )?;
        Ok(())
    }
}
