//! `notifyhub` command-line host.
//!
//! # Responsibility
//! - Wire config, logging and storage to the core view-models.
//! - Supply terminal implementations of the clipboard and confirmation
//!   capabilities.
//!
//! Failures are printed to stderr and exit with status 1.

mod cli;

use clap::Parser;
use cli::{Cli, Command, DraftCommand, EmailArgs, GroupsCommand, SelectionArgs, SendArgs};
use log::info;
use notifyhub_core::db::open_db;
use notifyhub_core::{
    build_dispatcher, init_logging, load_config, resolve_recipients, AppGroup,
    AppGroupId, AppGroupRepository, Clipboard, CompositionService, Confirm, DraftStore,
    EmailCategory, GroupForm, InventoryService, NotifyHubConfig, SqliteAppGroupRepository,
    SqliteDraftStore,
};
use rusqlite::Connection;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

type CliResult = Result<(), Box<dyn Error>>;

/// Writes copied addresses to stdout so they can be piped elsewhere.
struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn write_text(&self, text: &str) -> Result<(), String> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{text}").map_err(|err| err.to_string())
    }
}

/// y/N prompt on stderr; `assume_yes` skips it.
struct PromptConfirm {
    assume_yes: bool,
}

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }

    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let conn = open_db(&config.database_path)?;
    match cli.command {
        Command::Groups { command } => run_groups(command, &conn, &config),
        Command::Recipients(selection) => run_recipients(&selection, &conn),
        Command::Draft { command } => run_draft(command, &conn, &config),
        Command::Send(args) => run_send(args, &conn, &config),
    }
}

fn run_groups(command: GroupsCommand, conn: &Connection, config: &NotifyHubConfig) -> CliResult {
    let repo = SqliteAppGroupRepository::new(conn);
    let mut inventory =
        InventoryService::new(&repo, StdoutClipboard)?.with_notice_ttl(config.notice_ttl());

    match command {
        GroupsCommand::List { query } => {
            inventory.set_query(query.unwrap_or_default());
            let visible = inventory.filtered_groups();
            if visible.is_empty() {
                eprintln!("no app groups found");
            }
            for group in visible {
                print_group(group);
            }
        }
        GroupsCommand::Add { name, emails } => {
            let form = inventory.open_create();
            form.set_name(name);
            fill_form(form, &emails)?;
            let group = inventory.save()?;
            println!("{}", group.id);
        }
        GroupsCommand::Edit { id, name, emails } => {
            let form = inventory.open_edit(id)?;
            if let Some(name) = name {
                form.set_name(name);
            }
            fill_form(form, &emails)?;
            let group = inventory.save()?;
            print_group(&group);
        }
        GroupsCommand::Remove { id, yes } => {
            if !inventory.remove(id, &PromptConfirm { assume_yes: yes })? {
                eprintln!("cancelled");
            }
        }
        GroupsCommand::Copy { id } => {
            inventory.copy_group(id)?;
            print_notice(&inventory);
        }
        GroupsCommand::CopyVisible { query } => {
            inventory.set_query(query.unwrap_or_default());
            inventory.copy_visible()?;
            print_notice(&inventory);
        }
    }
    Ok(())
}

/// Replaces each provided category with the parsed addresses.
fn fill_form(form: &mut GroupForm, emails: &EmailArgs) -> CliResult {
    for (category, raw) in emails.provided() {
        form.clear_category(category);
        form.add_emails(category, raw)
            .map_err(|err| format!("{}: {err}", category.label()))?;
    }
    Ok(())
}

fn run_recipients(selection: &SelectionArgs, conn: &Connection) -> CliResult {
    let groups = SqliteAppGroupRepository::new(conn).list_groups()?;
    let ids = selected_ids(selection, &groups);
    let resolved = resolve_recipients(&ids, &groups);
    println!("To: {}", resolved.to.join(","));
    println!("Cc: {}", resolved.cc.join(","));
    Ok(())
}

fn run_draft(command: DraftCommand, conn: &Connection, config: &NotifyHubConfig) -> CliResult {
    let drafts = SqliteDraftStore::new(conn);
    match command {
        DraftCommand::Show => {
            let draft = drafts.load_draft()?;
            println!("Subject: {}", draft.subject);
            println!();
            println!("{}", draft.body);
        }
        DraftCommand::Set { subject, body } => {
            if let Some(subject) = subject {
                drafts.save_subject(&subject)?;
            }
            if let Some(body) = body {
                drafts.save_body(&body)?;
            }
        }
        DraftCommand::Reset { yes } => {
            let mut composer =
                CompositionService::new(drafts, build_dispatcher(&config.dispatch))?;
            if !composer.reset(&PromptConfirm { assume_yes: yes })? {
                eprintln!("cancelled");
            }
        }
    }
    Ok(())
}

fn run_send(args: SendArgs, conn: &Connection, config: &NotifyHubConfig) -> CliResult {
    let repo = SqliteAppGroupRepository::new(conn);
    let mut composer =
        CompositionService::new(SqliteDraftStore::new(conn), build_dispatcher(&config.dispatch))?;
    composer.refresh_groups(&repo)?;

    let ids = selected_ids(&args.selection, composer.groups());
    composer.set_selection(ids);
    if let Some(to) = args.to {
        composer.set_to_field(to);
    }
    if let Some(cc) = args.cc {
        composer.set_cc_field(cc);
    }

    info!(
        "event=cli_send module=cli status=start strategy={:?}",
        config.dispatch.strategy
    );
    let result = composer.send();
    if let Some(status) = composer.status() {
        eprintln!("{}", status.message);
    }
    result?;
    Ok(())
}

fn selected_ids(selection: &SelectionArgs, groups: &[AppGroup]) -> Vec<AppGroupId> {
    if selection.all {
        groups.iter().map(|group| group.id).collect()
    } else {
        selection.groups.clone()
    }
}

fn print_group(group: &AppGroup) {
    println!("{}\t{}", group.id, group.name());
    for category in EmailCategory::ALL {
        let emails = group.emails(category);
        if !emails.is_empty() {
            println!("  {}: {}", category.label(), emails.join(", "));
        }
    }
}

fn print_notice<R: AppGroupRepository, C: Clipboard>(inventory: &InventoryService<R, C>) {
    if let Some(notice) = inventory.notice() {
        eprintln!("{notice}");
    }
}
