// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Backend base URL, overrides the config file
    #[arg(short, long, value_name = "URL", global = true)]
    pub server: Option<String>,

    /// Path to config file (optional)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,

        #[arg(long)]
        username: String,

        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,

        /// Password confirmation, defaults to the password
        #[arg(long = "confirm-password")]
        password2: Option<String>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,
    },

    /// Sign in and store the session locally
    Login {
        #[arg(long)]
        email: String,

        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Remove the stored session
    Logout,

    /// Show the signed-in user from the stored session
    Whoami,

    /// Fetch the profile from the server, or update it when fields are given
    Profile {
        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List notes, optionally filtered by title or content
    List {
        /// Case-insensitive search term
        #[arg(value_name = "SEARCH")]
        search: Option<String>,

        /// Fetch a single page instead of every note
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        page: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one note
    Show {
        #[arg(value_name = "NOTE_ID")]
        note_id: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a note; opens $EDITOR unless --title or --content is given
    New {
        #[arg(short, long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,
    },

    /// Edit a note; opens $EDITOR unless --title or --content is given
    Edit {
        #[arg(value_name = "NOTE_ID")]
        note_id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,
    },

    /// Delete a note
    Delete {
        #[arg(value_name = "NOTE_ID")]
        note_id: i64,
    },
}

impl Command {
    /// Everything except the account commands acts on a signed-in account
    pub fn needs_session(&self) -> bool {
        !matches!(
            self,
            Command::Register { .. } | Command::Login { .. } | Command::Logout | Command::Whoami
        )
    }
}
