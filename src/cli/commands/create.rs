use super::{json_enabled, open_workspace, payload_from_args, resolve_actor_user};
use crate::api;
use crate::cli::IssueFieldArgs;
use crate::config;
use crate::error::Result;

/// Execute the create command.
///
/// # Errors
///
/// Returns an error if authorization is denied, validation fails, or the
/// issue cannot be persisted.
pub fn execute(args: &IssueFieldArgs, cli: &config::CliOverrides) -> Result<()> {
    let (mut storage, layer) = open_workspace(cli)?;
    let actor = resolve_actor_user(&storage, &layer)?;
    let payload = payload_from_args(args)?;

    let issue = api::create_issue(&mut storage, &actor, &payload)?;

    if json_enabled(&layer) {
        println!("{}", serde_json::to_string_pretty(&issue)?);
    } else {
        println!("Created issue #{}: {}", issue.id, issue.name);
    }
    Ok(())
}
