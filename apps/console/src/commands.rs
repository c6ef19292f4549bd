//! Line commands accepted by the console and their effect on the shell.

use std::time::Duration;

use client_core::{DeleteOutcome, Shell, SubmitOutcome};
use thiserror::Error;
use tracing::debug;

const REFRESH_WAIT: Duration = Duration::from_secs(5);

pub const HELP: &str = "\
commands:
  add <name>      create a project
  name <text>     set the form's project name
  submit          submit the form
  edit <row>      load a project into the form
  cancel          leave edit mode
  delete <row>    delete a project
  refresh         reload the project list
  count           remount the dashboard to re-read the count
  show            redraw everything
  help            this text
  quit            exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Name(String),
    Submit,
    Edit(usize),
    Cancel,
    Delete(usize),
    Refresh,
    Count,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("'{0}' needs a row number")]
    MissingRow(&'static str),
    #[error("'{0}' is not a row number")]
    InvalidRow(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = match trimmed.split_once(' ') {
            Some((verb, rest)) => (verb, rest),
            None => (trimmed, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "add" => Self::Add(rest.to_string()),
            "name" => Self::Name(rest.to_string()),
            "submit" => Self::Submit,
            "edit" => Self::Edit(parse_row("edit", rest)?),
            "cancel" => Self::Cancel,
            "delete" | "rm" => Self::Delete(parse_row("delete", rest)?),
            "refresh" => Self::Refresh,
            "count" => Self::Count,
            "show" | "ls" => Self::Show,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn parse_row(verb: &'static str, rest: &str) -> Result<usize, CommandError> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(CommandError::MissingRow(verb));
    }
    match rest.parse::<usize>() {
        Ok(row) if row > 0 => Ok(row),
        _ => Err(CommandError::InvalidRow(rest.to_string())),
    }
}

pub enum Flow {
    Continue(Option<String>),
    Quit,
}

pub async fn execute(shell: &mut Shell, command: Command) -> Flow {
    debug!(?command, "console: executing command");
    let note = match command {
        Command::Add(name) => {
            shell.form().cancel();
            shell.form().set_name(name);
            submit(shell).await
        }
        Command::Name(name) => {
            shell.form().set_name(name);
            None
        }
        Command::Submit => submit(shell).await,
        Command::Edit(row) => match shell.list().projects().get(row - 1) {
            Some(project) => {
                shell.list().edit(project);
                None
            }
            None => Some(format!("no project in row {row}")),
        },
        Command::Cancel => {
            shell.form().cancel();
            None
        }
        Command::Delete(row) => {
            let Some(project) = shell.list().projects().get(row - 1).cloned() else {
                return Flow::Continue(Some(format!("no project in row {row}")));
            };
            match shell.list().delete(&project.id).await {
                DeleteOutcome::Declined => Some("delete cancelled".to_string()),
                DeleteOutcome::Deleted | DeleteOutcome::Failed => None,
            }
        }
        Command::Refresh => {
            shell.list().fetch_projects().await;
            None
        }
        Command::Count => {
            shell.remount_dashboard().await;
            None
        }
        Command::Show => None,
        Command::Help => return Flow::Continue(Some(HELP.to_string())),
        Command::Quit => return Flow::Quit,
    };
    Flow::Continue(note)
}

/// Submits the form and, on success, waits for the list refetch it triggers.
async fn submit(shell: &Shell) -> Option<String> {
    let generation = shell.list().state().generation;
    let outcome = shell.form().submit().await;
    if matches!(outcome, SubmitOutcome::Created | SubmitOutcome::Updated) {
        let mut rx = shell.list().subscribe();
        if tokio::time::timeout(REFRESH_WAIT, rx.wait_for(|state| state.generation > generation))
            .await
            .is_err()
        {
            return Some("project list is still refreshing".to_string());
        }
    }
    None
}
