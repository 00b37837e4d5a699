use super::{json_enabled, open_workspace, resolve_actor_user};
use crate::api;
use crate::config;
use crate::error::Result;

/// Execute the delete command.
///
/// # Errors
///
/// Returns an error if authorization is denied or the issue is absent.
pub fn execute(id: i64, cli: &config::CliOverrides) -> Result<()> {
    let (mut storage, layer) = open_workspace(cli)?;
    let actor = resolve_actor_user(&storage, &layer)?;

    api::delete_issue(&mut storage, &actor, id)?;

    if json_enabled(&layer) {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted issue #{id}");
    }
    Ok(())
}
