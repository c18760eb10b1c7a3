// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use crate::application::auth::stored_access_token;
use crate::application::{
    filter_notes, AuthService, AutosaveTimer, NoteDeleter, NoteEditor, NoteLister, NoteViewer,
};
use crate::cli::args::{Args, Command};
use crate::constants::AUTOSAVE_INTERVAL_SECS;
use crate::domain::{
    DomainError, LoginCredentials, NoteDraft, NotePatch, ProfileUpdate, Registration,
};
use crate::infrastructure::{Config, ExternalEditor, FileSessionStore, HttpApi};
use crate::ports::TerminalPresenter;
use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub fn run(args: Args) -> Result<()> {
    debug!(server = ?args.server, config = ?args.config, "Starting notesync");

    // Initialize infrastructure
    let config = load_config(args.config.as_deref())?;
    let base_url = args.server.unwrap_or(config.server.base_url.clone());
    let session_path = match config.session.custom_path() {
        Some(path) => path,
        None => FileSessionStore::default_path()?,
    };
    debug!(?session_path, "Using session store");
    let mut store = FileSessionStore::new(session_path);
    let token = stored_access_token(&store);
    let mut api = HttpApi::new(base_url, config.server.timeout()).with_access_token(token);
    let external_editor = ExternalEditor::resolve(config.editor.custom_command());

    // Initialize presentation
    let presenter = TerminalPresenter::new();
    let now = Local::now();

    let mut auth = AuthService::new(&mut api, &mut store);
    if args.command.needs_session() {
        auth.require_session()?;
    }

    match args.command {
        Command::Register {
            email,
            username,
            password,
            password2,
            first_name,
            last_name,
        } => {
            let password = password_or_prompt(password, "Password")?;
            let password2 = match password2 {
                Some(confirmation) => confirmation,
                None => password.clone(),
            };
            let registration = Registration {
                email,
                username,
                password,
                password2,
                first_name,
                last_name,
            };
            let response = auth.register(&registration)?;
            println!("Welcome, {}!", response.user.display_name());
        }
        Command::Login { email, password } => {
            let credentials = LoginCredentials {
                email,
                password: password_or_prompt(password, "Password")?,
            };
            let response = auth.login(&credentials)?;
            println!("Signed in as {}", response.user.display_name());
        }
        Command::Logout => {
            auth.logout();
            println!("Signed out.");
        }
        Command::Whoami => match auth.current_user() {
            Some(user) => println!("{}", presenter.render_user(&user)),
            None => println!("Not signed in."),
        },
        Command::Profile {
            email,
            username,
            first_name,
            last_name,
            json,
        } => {
            let update = ProfileUpdate {
                email,
                username,
                first_name,
                last_name,
            };
            let user = if update.is_empty() {
                auth.profile()?
            } else {
                auth.update_profile(&update)?
            };
            if json {
                print_json(&user)?;
            } else {
                println!("{}", presenter.render_user(&user));
            }
        }
        Command::List { search, page, json } => {
            let mut lister = NoteLister::new(&mut api);
            match page {
                Some(number) => {
                    let mut page = lister.list_page(number)?;
                    page.results = filter_notes(page.results, search.as_deref());
                    if json {
                        print_json(&page)?;
                    } else {
                        println!("{}", presenter.render_page(&page, number, &now));
                    }
                }
                None => {
                    let notes = lister.list_notes(search.as_deref())?;
                    if json {
                        print_json(&notes)?;
                    } else {
                        println!("{}", presenter.render_list(&notes, &now));
                    }
                }
            }
        }
        Command::Show { note_id, json } => {
            info!(note_id, "Viewing note");
            let note = NoteViewer::new(&mut api).view_note(note_id)?;
            if json {
                print_json(&note)?;
            } else {
                println!("{}", presenter.render_note(&note, &now));
            }
        }
        Command::New { title, content } => {
            let draft = if title.is_none() && content.is_none() {
                let mut timer = autosave_timer();
                external_editor
                    .edit(&NoteDraft::default(), &mut timer)?
                    .ok_or(DomainError::EmptyNote)?
            } else {
                NoteDraft::new(title.unwrap_or_default(), content.unwrap_or_default())
            };
            let note = NoteEditor::new(&mut api).save(None, draft)?;
            println!("Note saved successfully! (id {})", note.id);
        }
        Command::Edit {
            note_id,
            title,
            content,
        } => {
            let mut editor = NoteEditor::new(&mut api);
            let saved = if title.is_none() && content.is_none() {
                let existing = editor.open(note_id)?;
                let updated = existing.updated_at.with_timezone(&Local);
                let mut timer = autosave_timer().with_label(application::format_clock(&updated));
                match external_editor.edit(&NoteDraft::from(&existing), &mut timer)? {
                    Some(draft) => Some(editor.save(Some(note_id), draft)?),
                    None => None,
                }
            } else {
                Some(editor.patch(note_id, NotePatch { title, content })?)
            };
            match saved {
                Some(note) => println!("Note saved successfully! (id {})", note.id),
                None => println!("No changes."),
            }
        }
        Command::Delete { note_id } => {
            NoteDeleter::new(&mut api).delete_note(note_id)?;
            println!("Note {note_id} deleted.");
        }
    }

    Ok(())
}

/// Explicit path must exist; the default location falls back to defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            debug!(?path, "Using provided config file");
            Config::load(path)
        }
        None => Config::load_or_default(Config::default_path()?),
    }
}

fn autosave_timer() -> AutosaveTimer {
    AutosaveTimer::new(Duration::from_secs(AUTOSAVE_INTERVAL_SECS), Instant::now())
}

fn password_or_prompt(password: Option<String>, label: &str) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => {
            let stdin = std::io::stdin();
            prompt(&mut stdin.lock(), &mut std::io::stderr(), label)
        }
    }
}

/// Print `label: ` and read one line, without its line ending
pub fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<String> {
    write!(output, "{label}: ").context("Failed to write prompt")?;
    output.flush().context("Failed to flush prompt")?;

    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read input")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
