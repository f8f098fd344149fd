//! App group repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide list/create/update/delete over the `app_groups` table.
//! - Enforce case-insensitive name uniqueness and content validation on
//!   every write.
//!
//! # Invariants
//! - Writes call `AppGroupFields::validate()` before SQL mutations.
//! - `list_groups` returns insertion order; updates keep position.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::DbError;
use crate::model::app_group::{
    name_key, AppGroup, AppGroupFields, AppGroupId, AppGroupPatch, AppGroupValidationError,
    EmailCategory,
};
use log::{info, warn};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const GROUP_SELECT_SQL: &str = "SELECT
    id,
    app_group_name,
    lead_poc_emails,
    team_member_emails,
    group_dl_emails,
    dependent_group_dl_emails,
    additional_group_dl_emails,
    created_at
FROM app_groups";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for group and draft persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(AppGroupValidationError),
    /// Another group already uses this name (case-insensitive).
    DuplicateName(String),
    NotFound(AppGroupId),
    InvalidData(String),
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateName(name) => write!(f, "App Group Name \"{name}\" already exists."),
            Self::NotFound(_) => write!(f, "Group not found"),
            Self::InvalidData(message) => write!(f, "invalid persisted group data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::DuplicateName(_) | Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<AppGroupValidationError> for RepoError {
    fn from(value: AppGroupValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for app group records.
///
/// Mutations return the stored record so callers never need a separate
/// re-list to observe the result.
pub trait AppGroupRepository {
    /// Returns all groups in insertion order.
    fn list_groups(&self) -> RepoResult<Vec<AppGroup>>;
    fn get_group(&self, id: AppGroupId) -> RepoResult<Option<AppGroup>>;
    /// Assigns id and `created_at`, then stores the group.
    fn create_group(&self, fields: AppGroupFields) -> RepoResult<AppGroup>;
    /// Merges `patch` into the stored group.
    fn update_group(&self, id: AppGroupId, patch: &AppGroupPatch) -> RepoResult<AppGroup>;
    /// Removes the group. Returns `false` when the id was absent.
    fn delete_group(&self, id: AppGroupId) -> RepoResult<bool>;
}

impl<T: AppGroupRepository + ?Sized> AppGroupRepository for &T {
    fn list_groups(&self) -> RepoResult<Vec<AppGroup>> {
        (**self).list_groups()
    }

    fn get_group(&self, id: AppGroupId) -> RepoResult<Option<AppGroup>> {
        (**self).get_group(id)
    }

    fn create_group(&self, fields: AppGroupFields) -> RepoResult<AppGroup> {
        (**self).create_group(fields)
    }

    fn update_group(&self, id: AppGroupId, patch: &AppGroupPatch) -> RepoResult<AppGroup> {
        (**self).update_group(id, patch)
    }

    fn delete_group(&self, id: AppGroupId) -> RepoResult<bool> {
        (**self).delete_group(id)
    }
}

/// Fails with `DuplicateName` when any group other than `exclude` already
/// uses `name` case-insensitively.
pub fn ensure_unique_name<'a>(
    groups: impl IntoIterator<Item = &'a AppGroup>,
    name: &str,
    exclude: Option<AppGroupId>,
) -> RepoResult<()> {
    let key = name_key(name);
    let collides = groups
        .into_iter()
        .filter(|group| Some(group.id) != exclude)
        .any(|group| name_key(group.name()) == key);
    if collides {
        return Err(RepoError::DuplicateName(name.to_string()));
    }
    Ok(())
}

/// SQLite-backed app group repository.
pub struct SqliteAppGroupRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAppGroupRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn name_taken(&self, name: &str, exclude: Option<AppGroupId>) -> RepoResult<bool> {
        let exclude = exclude.map(|id| id.to_string()).unwrap_or_default();
        let taken = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM app_groups WHERE name_key = ?1 AND id != ?2
            );",
            params![name_key(name), exclude],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(taken == 1)
    }
}

impl AppGroupRepository for SqliteAppGroupRepository<'_> {
    fn list_groups(&self) -> RepoResult<Vec<AppGroup>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GROUP_SELECT_SQL} ORDER BY seq ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut groups = Vec::new();

        while let Some(row) = rows.next()? {
            groups.push(parse_group_row(row)?);
        }

        Ok(groups)
    }

    fn get_group(&self, id: AppGroupId) -> RepoResult<Option<AppGroup>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GROUP_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_group_row(row)?));
        }

        Ok(None)
    }

    fn create_group(&self, mut fields: AppGroupFields) -> RepoResult<AppGroup> {
        fields.trim_name();
        fields.validate()?;
        if self.name_taken(&fields.app_group_name, None)? {
            warn!("event=group_create module=repo status=error error_code=duplicate_name");
            return Err(RepoError::DuplicateName(fields.app_group_name));
        }

        let group = AppGroup::new(fields);
        let inserted = self.conn.execute(
            "INSERT INTO app_groups (
                id,
                app_group_name,
                name_key,
                lead_poc_emails,
                team_member_emails,
                group_dl_emails,
                dependent_group_dl_emails,
                additional_group_dl_emails,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                group.id.to_string(),
                group.fields.app_group_name.as_str(),
                group.fields.name_key(),
                emails_to_db(&group.fields, EmailCategory::LeadPoc)?,
                emails_to_db(&group.fields, EmailCategory::TeamMember)?,
                emails_to_db(&group.fields, EmailCategory::GroupDl)?,
                emails_to_db(&group.fields, EmailCategory::DependentGroupDl)?,
                emails_to_db(&group.fields, EmailCategory::AdditionalGroupDl)?,
                group.created_at,
            ],
        );
        map_unique_violation(inserted, &group.fields.app_group_name)?;

        info!(
            "event=group_create module=repo status=ok group_id={}",
            group.id
        );
        Ok(group)
    }

    fn update_group(&self, id: AppGroupId, patch: &AppGroupPatch) -> RepoResult<AppGroup> {
        let mut group = self.get_group(id)?.ok_or(RepoError::NotFound(id))?;
        patch.apply_to(&mut group.fields);
        group.fields.trim_name();
        group.validate()?;
        if self.name_taken(&group.fields.app_group_name, Some(id))? {
            warn!(
                "event=group_update module=repo status=error group_id={} error_code=duplicate_name",
                id
            );
            return Err(RepoError::DuplicateName(group.fields.app_group_name));
        }

        let changed = self.conn.execute(
            "UPDATE app_groups
             SET
                app_group_name = ?1,
                name_key = ?2,
                lead_poc_emails = ?3,
                team_member_emails = ?4,
                group_dl_emails = ?5,
                dependent_group_dl_emails = ?6,
                additional_group_dl_emails = ?7
             WHERE id = ?8;",
            params![
                group.fields.app_group_name.as_str(),
                group.fields.name_key(),
                emails_to_db(&group.fields, EmailCategory::LeadPoc)?,
                emails_to_db(&group.fields, EmailCategory::TeamMember)?,
                emails_to_db(&group.fields, EmailCategory::GroupDl)?,
                emails_to_db(&group.fields, EmailCategory::DependentGroupDl)?,
                emails_to_db(&group.fields, EmailCategory::AdditionalGroupDl)?,
                id.to_string(),
            ],
        );
        if map_unique_violation(changed, &group.fields.app_group_name)? == 0 {
            return Err(RepoError::NotFound(id));
        }

        info!("event=group_update module=repo status=ok group_id={id}");
        Ok(group)
    }

    fn delete_group(&self, id: AppGroupId) -> RepoResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM app_groups WHERE id = ?1;", [id.to_string()])?;
        info!(
            "event=group_delete module=repo status=ok group_id={} removed={}",
            id,
            removed > 0
        );
        Ok(removed > 0)
    }
}

fn map_unique_violation(result: rusqlite::Result<usize>, name: &str) -> RepoResult<usize> {
    match result {
        Ok(changed) => Ok(changed),
        Err(rusqlite::Error::SqliteFailure(err, Some(message)))
            if err.code == rusqlite::ErrorCode::ConstraintViolation
                && message.contains("app_groups.name_key") =>
        {
            Err(RepoError::DuplicateName(name.to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

fn emails_to_db(fields: &AppGroupFields, category: EmailCategory) -> RepoResult<String> {
    serde_json::to_string(fields.emails(category)).map_err(|err| {
        RepoError::InvalidData(format!(
            "failed to encode {} emails: {err}",
            category.as_str()
        ))
    })
}

fn emails_from_db(row: &Row<'_>, column: &str) -> RepoResult<Vec<String>> {
    let raw: String = row.get(column)?;
    serde_json::from_str(&raw).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid email list in app_groups.{column}: {err}"
        ))
    })
}

fn parse_group_row(row: &Row<'_>) -> RepoResult<AppGroup> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in app_groups.id"))
    })?;

    let fields = AppGroupFields {
        app_group_name: row.get("app_group_name")?,
        lead_poc_emails: emails_from_db(row, "lead_poc_emails")?,
        team_member_emails: emails_from_db(row, "team_member_emails")?,
        group_dl_emails: emails_from_db(row, "group_dl_emails")?,
        dependent_group_dl_emails: emails_from_db(row, "dependent_group_dl_emails")?,
        additional_group_dl_emails: emails_from_db(row, "additional_group_dl_emails")?,
    };

    Ok(AppGroup::with_id(id, fields, row.get("created_at")?))
}
