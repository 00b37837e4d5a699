//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Role-gated issue tracker backend (`SQLite`)
#[derive(Parser, Debug)]
#[command(name = "tkr", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: .tracker/tracker.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Acting username for authorization
    #[arg(long, global = true, env = "TKR_ACTOR")]
    pub actor: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// `SQLite` busy timeout in ms
    #[arg(long, global = true)]
    pub lock_timeout: Option<u64>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a tracker workspace
    Init {
        /// Bootstrap a superuser with this username
        #[arg(long)]
        admin: Option<String>,

        /// Overwrite existing DB
        #[arg(long)]
        force: bool,
    },

    /// Create a new issue
    Create(IssueFieldArgs),

    /// List issues (newest first)
    List,

    /// Show issue details
    Show {
        /// Issue id
        id: i64,
    },

    /// Update an issue (absent flags keep persisted values)
    Update(UpdateArgs),

    /// Delete an issue
    Delete {
        /// Issue id
        id: i64,
    },

    /// Manage identities
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage lifecycle states
    State {
        #[command(subcommand)]
        command: StateCommands,
    },

    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Issue field flags shared by create and update.
#[derive(Args, Debug, Clone, Default)]
pub struct IssueFieldArgs {
    /// Issue title
    #[arg(long)]
    pub name: Option<String>,

    /// Detailed description
    #[arg(long)]
    pub description: Option<String>,

    /// Creator user id (must be a superuser)
    #[arg(long, allow_negative_numbers = true)]
    pub creator: Option<i64>,

    /// Responsible person user id
    #[arg(long, allow_negative_numbers = true)]
    pub responsible: Option<i64>,

    /// State id
    #[arg(long, allow_negative_numbers = true)]
    pub state: Option<i64>,

    /// Category id
    #[arg(long, allow_negative_numbers = true)]
    pub category: Option<i64>,

    /// Creation timestamp (default: now)
    #[arg(long)]
    pub created_at: Option<String>,

    /// Completion timestamp (derived from the state when omitted)
    #[arg(long)]
    pub finished_at: Option<String>,
}

/// Arguments for the update command.
#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Issue id
    pub id: i64,

    #[command(flatten)]
    pub fields: IssueFieldArgs,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create an identity
    Add {
        /// Username (unique)
        username: String,

        /// Grant the superuser flag
        #[arg(long)]
        superuser: bool,

        /// Grant the staff flag
        #[arg(long)]
        staff: bool,

        /// Create the identity deactivated
        #[arg(long)]
        inactive: bool,
    },

    /// List identities
    List,
}

#[derive(Subcommand, Debug)]
pub enum StateCommands {
    /// Create a state
    Add {
        /// State name (unique)
        name: String,

        /// Issues in this state carry a finished timestamp
        #[arg(long)]
        marks_finished: bool,
    },

    /// List states
    List,

    /// Rename a state
    Rename {
        /// State id
        id: i64,

        /// New name
        name: String,
    },

    /// Delete a state (rejected while issues reference it)
    Rm {
        /// State id
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// Create a category
    Add {
        /// Category name (unique)
        name: String,
    },

    /// List categories
    List,

    /// Rename a category
    Rename {
        /// Category id
        id: i64,

        /// New name
        name: String,
    },

    /// Delete a category (rejected while issues reference it)
    Rm {
        /// Category id
        id: i64,
    },
}

/// Arguments for the completions command.
#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}
