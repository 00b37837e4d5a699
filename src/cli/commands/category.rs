use super::{json_enabled, open_workspace, resolve_actor_user};
use crate::api;
use crate::cli::CategoryCommands;
use crate::config;
use crate::error::Result;

/// Execute a category subcommand.
///
/// # Errors
///
/// Returns an error if authorization is denied or the operation fails.
pub fn execute(command: &CategoryCommands, cli: &config::CliOverrides) -> Result<()> {
    match command {
        CategoryCommands::Add { name } => {
            let (mut storage, layer) = open_workspace(cli)?;
            let actor = resolve_actor_user(&storage, &layer)?;
            let category = api::create_category(&mut storage, &actor, name)?;
            if json_enabled(&layer) {
                println!("{}", serde_json::to_string_pretty(&category)?);
            } else {
                println!("Created category '{}' (id {})", category.name, category.id);
            }
        }
        CategoryCommands::List => {
            let (storage, layer) = open_workspace(cli)?;
            let actor = resolve_actor_user(&storage, &layer)?;
            let categories = api::list_categories(&storage, &actor)?;
            if json_enabled(&layer) {
                println!("{}", serde_json::to_string_pretty(&categories)?);
            } else {
                for category in &categories {
                    println!("#{:<4} {}", category.id, category.name);
                }
                println!("{} category(ies)", categories.len());
            }
        }
        CategoryCommands::Rename { id, name } => {
            let (mut storage, layer) = open_workspace(cli)?;
            let actor = resolve_actor_user(&storage, &layer)?;
            let category = api::rename_category(&mut storage, &actor, *id, name)?;
            println!("Renamed category #{} to '{}'", category.id, category.name);
        }
        CategoryCommands::Rm { id } => {
            let (mut storage, layer) = open_workspace(cli)?;
            let actor = resolve_actor_user(&storage, &layer)?;
            api::delete_category(&mut storage, &actor, *id)?;
            println!("Deleted category #{id}");
        }
    }
    Ok(())
}
