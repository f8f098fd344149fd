//! Application group domain model.
//!
//! # Responsibility
//! - Define the canonical record bundling five email categories under a name.
//! - Provide partial-update (patch) and validation helpers used by repositories.
//!
//! # Invariants
//! - `id` and `created_at` are assigned once at creation and never change.
//! - `app_group_name` is non-blank; uniqueness is enforced by repositories
//!   through `name_key`.
//! - Lead POC, team member and group DL categories route to "To"; dependent
//!   and additional DL categories route to "Cc".

use crate::model::email::is_valid_email;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier of one application group.
pub type AppGroupId = Uuid;

/// One of the five email categories stored per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailCategory {
    LeadPoc,
    TeamMember,
    GroupDl,
    DependentGroupDl,
    AdditionalGroupDl,
}

impl EmailCategory {
    /// Every category in display and union order.
    pub const ALL: [EmailCategory; 5] = [
        EmailCategory::LeadPoc,
        EmailCategory::TeamMember,
        EmailCategory::GroupDl,
        EmailCategory::DependentGroupDl,
        EmailCategory::AdditionalGroupDl,
    ];

    /// Categories that resolve into the "To" line.
    pub const PRIMARY: [EmailCategory; 3] = [
        EmailCategory::LeadPoc,
        EmailCategory::TeamMember,
        EmailCategory::GroupDl,
    ];

    /// Categories that resolve into the "Cc" line.
    pub const SECONDARY: [EmailCategory; 2] = [
        EmailCategory::DependentGroupDl,
        EmailCategory::AdditionalGroupDl,
    ];

    /// Returns whether this category resolves into the "To" line.
    pub fn is_primary(self) -> bool {
        matches!(self, Self::LeadPoc | Self::TeamMember | Self::GroupDl)
    }

    /// Stable snake_case id used in storage and CLI flags.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LeadPoc => "lead_poc",
            Self::TeamMember => "team_member",
            Self::GroupDl => "group_dl",
            Self::DependentGroupDl => "dependent_group_dl",
            Self::AdditionalGroupDl => "additional_group_dl",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::LeadPoc => "Lead POC",
            Self::TeamMember => "Team Members",
            Self::GroupDl => "Group DL",
            Self::DependentGroupDl => "Dependent Group DL",
            Self::AdditionalGroupDl => "Additional Group DL",
        }
    }
}

/// Validation failures for group content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppGroupValidationError {
    BlankName,
    InvalidEmail {
        category: EmailCategory,
        email: String,
    },
    DuplicateEmail {
        category: EmailCategory,
        email: String,
    },
}

impl Display for AppGroupValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "App Group Name is required"),
            Self::InvalidEmail { category, email } => {
                write!(f, "invalid email `{email}` in {}", category.label())
            }
            Self::DuplicateEmail { category, email } => {
                write!(f, "email `{email}` appears twice in {}", category.label())
            }
        }
    }
}

impl Error for AppGroupValidationError {}

/// Every user-editable field of a group.
///
/// Serialized with the camelCase names used by exported group collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppGroupFields {
    pub app_group_name: String,
    pub lead_poc_emails: Vec<String>,
    pub team_member_emails: Vec<String>,
    pub group_dl_emails: Vec<String>,
    pub dependent_group_dl_emails: Vec<String>,
    pub additional_group_dl_emails: Vec<String>,
}

impl AppGroupFields {
    /// Creates fields with a name and empty email categories.
    pub fn new(app_group_name: impl Into<String>) -> Self {
        Self {
            app_group_name: app_group_name.into(),
            ..Self::default()
        }
    }

    /// Replaces one category and returns `self` for chained construction.
    pub fn with_emails<I, S>(mut self, category: EmailCategory, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.emails_mut(category) = emails.into_iter().map(Into::into).collect();
        self
    }

    pub fn emails(&self, category: EmailCategory) -> &[String] {
        match category {
            EmailCategory::LeadPoc => &self.lead_poc_emails,
            EmailCategory::TeamMember => &self.team_member_emails,
            EmailCategory::GroupDl => &self.group_dl_emails,
            EmailCategory::DependentGroupDl => &self.dependent_group_dl_emails,
            EmailCategory::AdditionalGroupDl => &self.additional_group_dl_emails,
        }
    }

    pub fn emails_mut(&mut self, category: EmailCategory) -> &mut Vec<String> {
        match category {
            EmailCategory::LeadPoc => &mut self.lead_poc_emails,
            EmailCategory::TeamMember => &mut self.team_member_emails,
            EmailCategory::GroupDl => &mut self.group_dl_emails,
            EmailCategory::DependentGroupDl => &mut self.dependent_group_dl_emails,
            EmailCategory::AdditionalGroupDl => &mut self.additional_group_dl_emails,
        }
    }

    /// Checks name presence, address format and per-category uniqueness.
    pub fn validate(&self) -> Result<(), AppGroupValidationError> {
        if self.app_group_name.trim().is_empty() {
            return Err(AppGroupValidationError::BlankName);
        }

        for category in EmailCategory::ALL {
            let emails = self.emails(category);
            for (index, email) in emails.iter().enumerate() {
                if !is_valid_email(email) {
                    return Err(AppGroupValidationError::InvalidEmail {
                        category,
                        email: email.clone(),
                    });
                }
                if emails[..index].contains(email) {
                    return Err(AppGroupValidationError::DuplicateEmail {
                        category,
                        email: email.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Drops surrounding whitespace from the name before it is stored.
    pub fn trim_name(&mut self) {
        let trimmed = self.app_group_name.trim();
        if trimmed.len() != self.app_group_name.len() {
            self.app_group_name = trimmed.to_string();
        }
    }

    /// Case-folded name used for uniqueness checks.
    pub fn name_key(&self) -> String {
        name_key(&self.app_group_name)
    }
}

/// Partial update for an existing group; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppGroupPatch {
    pub app_group_name: Option<String>,
    pub lead_poc_emails: Option<Vec<String>>,
    pub team_member_emails: Option<Vec<String>>,
    pub group_dl_emails: Option<Vec<String>>,
    pub dependent_group_dl_emails: Option<Vec<String>>,
    pub additional_group_dl_emails: Option<Vec<String>>,
}

impl AppGroupPatch {
    /// Patch that only renames the group.
    pub fn rename(app_group_name: impl Into<String>) -> Self {
        Self {
            app_group_name: Some(app_group_name.into()),
            ..Self::default()
        }
    }

    /// Sets one category replacement and returns `self`.
    pub fn with_emails<I, S>(mut self, category: EmailCategory, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let emails = Some(emails.into_iter().map(Into::into).collect());
        match category {
            EmailCategory::LeadPoc => self.lead_poc_emails = emails,
            EmailCategory::TeamMember => self.team_member_emails = emails,
            EmailCategory::GroupDl => self.group_dl_emails = emails,
            EmailCategory::DependentGroupDl => self.dependent_group_dl_emails = emails,
            EmailCategory::AdditionalGroupDl => self.additional_group_dl_emails = emails,
        }
        self
    }

    /// Returns whether applying this patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Merges this patch into `fields`.
    pub fn apply_to(&self, fields: &mut AppGroupFields) {
        if let Some(name) = &self.app_group_name {
            fields.app_group_name = name.clone();
        }
        let replacements = [
            (EmailCategory::LeadPoc, &self.lead_poc_emails),
            (EmailCategory::TeamMember, &self.team_member_emails),
            (EmailCategory::GroupDl, &self.group_dl_emails),
            (EmailCategory::DependentGroupDl, &self.dependent_group_dl_emails),
            (EmailCategory::AdditionalGroupDl, &self.additional_group_dl_emails),
        ];
        for (category, replacement) in replacements {
            if let Some(emails) = replacement {
                *fields.emails_mut(category) = emails.clone();
            }
        }
    }
}

impl From<AppGroupFields> for AppGroupPatch {
    fn from(value: AppGroupFields) -> Self {
        Self {
            app_group_name: Some(value.app_group_name),
            lead_poc_emails: Some(value.lead_poc_emails),
            team_member_emails: Some(value.team_member_emails),
            group_dl_emails: Some(value.group_dl_emails),
            dependent_group_dl_emails: Some(value.dependent_group_dl_emails),
            additional_group_dl_emails: Some(value.additional_group_dl_emails),
        }
    }
}

/// Stored application group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppGroup {
    pub id: AppGroupId,
    #[serde(flatten)]
    pub fields: AppGroupFields,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl AppGroup {
    /// Creates a group with a fresh id and the current timestamp.
    pub fn new(fields: AppGroupFields) -> Self {
        Self::with_id(Uuid::new_v4(), fields, now_epoch_ms())
    }

    /// Creates a group with caller-provided identity (storage read-back, import).
    pub fn with_id(id: AppGroupId, fields: AppGroupFields, created_at: i64) -> Self {
        Self {
            id,
            fields,
            created_at,
        }
    }

    pub fn name(&self) -> &str {
        &self.fields.app_group_name
    }

    pub fn emails(&self, category: EmailCategory) -> &[String] {
        self.fields.emails(category)
    }

    /// Iterates addresses of the given categories, category by category.
    pub fn emails_in<'a>(
        &'a self,
        categories: &'a [EmailCategory],
    ) -> impl Iterator<Item = &'a String> + 'a {
        categories
            .iter()
            .flat_map(move |category| self.emails(*category).iter())
    }

    /// Returns whether any address of any category contains `needle`.
    ///
    /// `needle` must already be lowercase.
    pub fn matches_query(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.name().to_lowercase().contains(needle)
            || self
                .emails_in(&EmailCategory::ALL)
                .any(|email| email.to_lowercase().contains(needle))
    }

    pub fn validate(&self) -> Result<(), AppGroupValidationError> {
        self.fields.validate()
    }
}

/// Trims and case-folds a group name for uniqueness comparison.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{AppGroup, AppGroupFields, AppGroupPatch, AppGroupValidationError, EmailCategory};

    fn core_fields() -> AppGroupFields {
        AppGroupFields::new("Core")
            .with_emails(EmailCategory::LeadPoc, ["lead@x.com"])
            .with_emails(EmailCategory::DependentGroupDl, ["deps@x.com"])
    }

    #[test]
    fn category_routing_splits_to_and_cc() {
        let primary: Vec<_> = EmailCategory::ALL
            .into_iter()
            .filter(|category| category.is_primary())
            .collect();
        assert_eq!(primary, EmailCategory::PRIMARY.to_vec());
        assert!(EmailCategory::SECONDARY
            .iter()
            .all(|category| !category.is_primary()));
    }

    #[test]
    fn validate_rejects_blank_name_and_bad_entries() {
        assert_eq!(
            AppGroupFields::new("   ").validate(),
            Err(AppGroupValidationError::BlankName)
        );

        let bad = core_fields().with_emails(EmailCategory::GroupDl, ["not-an-email"]);
        assert!(matches!(
            bad.validate(),
            Err(AppGroupValidationError::InvalidEmail {
                category: EmailCategory::GroupDl,
                ..
            })
        ));

        let dup = core_fields().with_emails(EmailCategory::TeamMember, ["a@x.com", "a@x.com"]);
        assert!(matches!(
            dup.validate(),
            Err(AppGroupValidationError::DuplicateEmail { .. })
        ));
    }

    #[test]
    fn same_address_in_two_categories_is_allowed() {
        let fields = core_fields().with_emails(EmailCategory::GroupDl, ["lead@x.com"]);
        assert!(fields.validate().is_ok());
    }

    #[test]
    fn patch_only_touches_provided_fields() {
        let mut fields = core_fields();
        AppGroupPatch::rename("Platform")
            .with_emails(EmailCategory::TeamMember, ["t@x.com"])
            .apply_to(&mut fields);

        assert_eq!(fields.app_group_name, "Platform");
        assert_eq!(fields.lead_poc_emails, vec!["lead@x.com".to_string()]);
        assert_eq!(fields.team_member_emails, vec!["t@x.com".to_string()]);
        assert_eq!(fields.dependent_group_dl_emails, vec!["deps@x.com".to_string()]);
        assert!(AppGroupPatch::default().is_empty());
    }

    #[test]
    fn name_key_ignores_case_and_surrounding_whitespace() {
        let mut fields = AppGroupFields::new("  Core Platform ");
        assert_eq!(fields.name_key(), "core platform");
        fields.trim_name();
        assert_eq!(fields.app_group_name, "Core Platform");
        assert_eq!(super::name_key("CORE platform"), fields.name_key());
    }

    #[test]
    fn query_matches_name_and_any_address_case_insensitively() {
        let group = AppGroup::new(core_fields());
        assert!(group.matches_query(""));
        assert!(group.matches_query("cor"));
        assert!(group.matches_query("deps@"));
        assert!(!group.matches_query("payments"));
    }

    #[test]
    fn serializes_with_flat_camel_case_shape() {
        let group = AppGroup::new(core_fields());
        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(json["appGroupName"], "Core");
        assert_eq!(json["leadPocEmails"][0], "lead@x.com");
        assert!(json["createdAt"].is_i64());
    }
}
