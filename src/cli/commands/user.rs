use super::{json_enabled, open_workspace, resolve_actor_user};
use crate::api;
use crate::cli::UserCommands;
use crate::config;
use crate::error::Result;

/// Execute a user subcommand.
///
/// # Errors
///
/// Returns an error if authorization is denied or the operation fails.
pub fn execute(command: &UserCommands, cli: &config::CliOverrides) -> Result<()> {
    match command {
        UserCommands::Add {
            username,
            superuser,
            staff,
            inactive,
        } => {
            let (mut storage, layer) = open_workspace(cli)?;
            let actor = resolve_actor_user(&storage, &layer)?;
            let user = api::create_user(
                &mut storage,
                &actor,
                username,
                *superuser,
                *staff,
                !*inactive,
            )?;
            if json_enabled(&layer) {
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else {
                println!("Created user '{}' (id {})", user.username, user.id);
            }
        }
        UserCommands::List => {
            let (storage, layer) = open_workspace(cli)?;
            let actor = resolve_actor_user(&storage, &layer)?;
            let users = api::list_users(&storage, &actor)?;
            if json_enabled(&layer) {
                println!("{}", serde_json::to_string_pretty(&users)?);
            } else {
                for user in &users {
                    let mut flags = Vec::new();
                    if user.is_superuser {
                        flags.push("superuser");
                    }
                    if user.is_staff {
                        flags.push("staff");
                    }
                    if !user.is_active {
                        flags.push("inactive");
                    }
                    println!("#{:<4} {}  [{}]", user.id, user.username, flags.join(", "));
                }
                println!("{} user(s)", users.len());
            }
        }
    }
    Ok(())
}
