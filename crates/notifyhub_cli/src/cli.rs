//! Command-line schema for the `notifyhub` binary.

use clap::{Args, Parser, Subcommand};
use notifyhub_core::{AppGroupId, EmailCategory};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "notifyhub")]
#[command(about = "App-group email registry and notification composer")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQLite database file, overriding `database_path` from config
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage app groups
    Groups {
        #[command(subcommand)]
        command: GroupsCommand,
    },
    /// Print the To/Cc lines resolved from selected groups
    Recipients(SelectionArgs),
    /// Inspect or edit the persisted subject/body draft
    Draft {
        #[command(subcommand)]
        command: DraftCommand,
    },
    /// Send the current draft to the selected groups
    Send(SendArgs),
}

#[derive(Subcommand, Debug)]
pub enum GroupsCommand {
    /// List groups, optionally filtered by name or address
    List {
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Create a group
    Add {
        #[arg(short, long)]
        name: String,
        #[command(flatten)]
        emails: EmailArgs,
    },
    /// Edit a group; given categories replace their current addresses
    Edit {
        id: AppGroupId,
        #[arg(short, long)]
        name: Option<String>,
        #[command(flatten)]
        emails: EmailArgs,
    },
    /// Delete a group
    Remove {
        id: AppGroupId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Print every address of one group, `;` delimited
    Copy { id: AppGroupId },
    /// Print every address of the groups matching the query
    CopyVisible {
        #[arg(short, long)]
        query: Option<String>,
    },
}

/// Per-category address lists, comma or semicolon delimited.
#[derive(Args, Debug, Default)]
pub struct EmailArgs {
    #[arg(long, value_name = "EMAILS")]
    pub lead: Option<String>,
    #[arg(long, value_name = "EMAILS")]
    pub team: Option<String>,
    #[arg(long, value_name = "EMAILS")]
    pub dl: Option<String>,
    #[arg(long, value_name = "EMAILS")]
    pub dependent: Option<String>,
    #[arg(long, value_name = "EMAILS")]
    pub additional: Option<String>,
}

impl EmailArgs {
    /// Categories given on the command line, in display order.
    pub fn provided(&self) -> Vec<(EmailCategory, &str)> {
        [
            (EmailCategory::LeadPoc, &self.lead),
            (EmailCategory::TeamMember, &self.team),
            (EmailCategory::GroupDl, &self.dl),
            (EmailCategory::DependentGroupDl, &self.dependent),
            (EmailCategory::AdditionalGroupDl, &self.additional),
        ]
        .into_iter()
        .filter_map(|(category, value)| value.as_deref().map(|value| (category, value)))
        .collect()
    }
}

#[derive(Args, Debug)]
pub struct SelectionArgs {
    /// Group id to select; repeatable
    #[arg(short, long = "group", value_name = "ID")]
    pub groups: Vec<AppGroupId>,
    /// Select every group
    #[arg(long, conflicts_with = "groups")]
    pub all: bool,
}

#[derive(Subcommand, Debug)]
pub enum DraftCommand {
    Show,
    /// Update subject and/or body
    Set {
        #[arg(short, long)]
        subject: Option<String>,
        /// Rich-text (HTML) body
        #[arg(short, long)]
        body: Option<String>,
    },
    /// Clear subject and body
    Reset {
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,
    /// Replace the resolved To line
    #[arg(long, value_name = "EMAILS")]
    pub to: Option<String>,
    /// Replace the resolved Cc line
    #[arg(long, value_name = "EMAILS")]
    pub cc: Option<String>,
}
