use super::{json_enabled, open_workspace, payload_from_args, resolve_actor_user};
use crate::api;
use crate::cli::UpdateArgs;
use crate::config;
use crate::error::Result;

/// Execute the update command.
///
/// Absent flags keep the persisted values; validation runs on the merged
/// record.
///
/// # Errors
///
/// Returns an error if authorization is denied, the issue is absent, or
/// validation fails.
pub fn execute(args: &UpdateArgs, cli: &config::CliOverrides) -> Result<()> {
    let (mut storage, layer) = open_workspace(cli)?;
    let actor = resolve_actor_user(&storage, &layer)?;
    let payload = payload_from_args(&args.fields)?;

    let issue = api::update_issue(&mut storage, &actor, args.id, &payload)?;

    if json_enabled(&layer) {
        println!("{}", serde_json::to_string_pretty(&issue)?);
    } else {
        println!("Updated issue #{}: {}", issue.id, issue.name);
    }
    Ok(())
}
