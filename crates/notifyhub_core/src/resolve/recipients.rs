//! To/Cc resolution and address-line helpers.

use crate::model::app_group::{AppGroup, AppGroupId, EmailCategory};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Delimiter used when addresses are exported to the clipboard.
pub const CLIPBOARD_DELIMITER: &str = ";";
/// Delimiter used in composed email header lines.
pub const HEADER_DELIMITER: &str = ",";

static ADDRESS_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;]").expect("valid address split regex"));

/// Deduplicated recipient lists for one selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedRecipients {
    pub to: Vec<String>,
    pub cc: Vec<String>,
}

impl ResolvedRecipients {
    pub fn is_empty(&self) -> bool {
        self.to.is_empty() && self.cc.is_empty()
    }
}

/// Resolves To/Cc for the groups whose id is in `selected_ids`.
///
/// Groups contribute in `groups` order, not selection order. Lead POC, team
/// and group DL addresses go to `to`; dependent and additional DL addresses
/// go to `cc`. Unknown ids are ignored.
pub fn resolve_recipients(selected_ids: &[AppGroupId], groups: &[AppGroup]) -> ResolvedRecipients {
    if selected_ids.is_empty() {
        return ResolvedRecipients::default();
    }

    let selected: HashSet<AppGroupId> = selected_ids.iter().copied().collect();
    let chosen: Vec<&AppGroup> = groups
        .iter()
        .filter(|group| selected.contains(&group.id))
        .collect();

    ResolvedRecipients {
        to: dedup_preserving_order(
            chosen
                .iter()
                .copied()
                .flat_map(|group| group.emails_in(&EmailCategory::PRIMARY)),
        ),
        cc: dedup_preserving_order(
            chosen
                .iter()
                .copied()
                .flat_map(|group| group.emails_in(&EmailCategory::SECONDARY)),
        ),
    }
}

/// Unions every category of every group, in category then group order.
pub fn union_all_emails<'a>(groups: impl IntoIterator<Item = &'a AppGroup>) -> Vec<String> {
    dedup_preserving_order(
        groups
            .into_iter()
            .flat_map(|group| group.emails_in(&EmailCategory::ALL)),
    )
}

/// Removes repeated entries, keeping the first occurrence of each.
pub fn dedup_preserving_order<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for item in items {
        let item = item.as_ref();
        if seen.insert(item.to_string()) {
            unique.push(item.to_string());
        }
    }
    unique
}

pub fn join_addresses(addresses: &[String], delimiter: &str) -> String {
    addresses.join(delimiter)
}

/// Splits a hand-edited address line on `,` or `;`, trimming entries and
/// dropping blanks.
pub fn split_addresses(line: &str) -> Vec<String> {
    ADDRESS_SPLIT_RE
        .split(line)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
