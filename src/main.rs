use clap::Parser;
use std::io::{self, IsTerminal};
use tracker_rust::cli::commands;
use tracker_rust::cli::{Cli, Commands};
use tracker_rust::config;
use tracker_rust::logging::init_logging;
use tracker_rust::{StructuredError, TrackerError};

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if let Err(e) = init_logging(cli.verbose, cli.quiet, None) {
        eprintln!("Failed to initialize logging: {e}");
        // Don't exit, just continue without logging
    }

    let overrides = build_cli_overrides(&cli);

    let result = match cli.command {
        Commands::Init { ref admin, force } => {
            commands::init::execute(admin.as_deref(), force, None)
        }
        Commands::Create(ref args) => commands::create::execute(args, &overrides),
        Commands::List => commands::list::execute(&overrides),
        Commands::Show { id } => commands::show::execute(id, &overrides),
        Commands::Update(ref args) => commands::update::execute(args, &overrides),
        Commands::Delete { id } => commands::delete::execute(id, &overrides),
        Commands::User { ref command } => commands::user::execute(command, &overrides),
        Commands::State { ref command } => commands::state::execute(command, &overrides),
        Commands::Category { ref command } => commands::category::execute(command, &overrides),
        Commands::Version => commands::version::execute(cli.json),
        Commands::Completions(ref args) => commands::completions::execute(args),
    };

    if let Err(e) = result {
        handle_error(&e, cli.json);
    }
}

/// Handle errors with structured output support.
///
/// When --json is set or stdout is not a TTY, outputs structured JSON to
/// stderr. Otherwise, outputs human-readable error with optional color.
fn handle_error(err: &TrackerError, json_mode: bool) -> ! {
    let structured = StructuredError::from_error(err);
    let exit_code = structured.code.exit_code();

    let use_json = json_mode || !io::stdout().is_terminal();

    if use_json {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        let use_color = io::stderr().is_terminal();
        eprintln!("{}", structured.to_human(use_color));
    }

    std::process::exit(exit_code);
}

fn build_cli_overrides(cli: &Cli) -> config::CliOverrides {
    config::CliOverrides {
        db: cli.db.clone(),
        actor: cli.actor.clone(),
        json: Some(cli.json),
        lock_timeout: cli.lock_timeout,
    }
}
