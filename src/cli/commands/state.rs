use super::{json_enabled, open_workspace, resolve_actor_user};
use crate::api;
use crate::cli::StateCommands;
use crate::config;
use crate::error::Result;

/// Execute a state subcommand.
///
/// # Errors
///
/// Returns an error if authorization is denied or the operation fails.
pub fn execute(command: &StateCommands, cli: &config::CliOverrides) -> Result<()> {
    match command {
        StateCommands::Add {
            name,
            marks_finished,
        } => {
            let (mut storage, layer) = open_workspace(cli)?;
            let actor = resolve_actor_user(&storage, &layer)?;
            let state = api::create_state(&mut storage, &actor, name, *marks_finished)?;
            if json_enabled(&layer) {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                println!("Created state '{}' (id {})", state.name, state.id);
            }
        }
        StateCommands::List => {
            let (storage, layer) = open_workspace(cli)?;
            let actor = resolve_actor_user(&storage, &layer)?;
            let states = api::list_states(&storage, &actor)?;
            if json_enabled(&layer) {
                println!("{}", serde_json::to_string_pretty(&states)?);
            } else {
                for state in &states {
                    let marker = if state.marks_finished {
                        "  [marks finished]"
                    } else {
                        ""
                    };
                    println!("#{:<4} {}{}", state.id, state.name, marker);
                }
                println!("{} state(s)", states.len());
            }
        }
        StateCommands::Rename { id, name } => {
            let (mut storage, layer) = open_workspace(cli)?;
            let actor = resolve_actor_user(&storage, &layer)?;
            let state = api::rename_state(&mut storage, &actor, *id, name)?;
            println!("Renamed state #{} to '{}'", state.id, state.name);
        }
        StateCommands::Rm { id } => {
            let (mut storage, layer) = open_workspace(cli)?;
            let actor = resolve_actor_user(&storage, &layer)?;
            api::delete_state(&mut storage, &actor, *id)?;
            println!("Deleted state #{id}");
        }
    }
    Ok(())
}
