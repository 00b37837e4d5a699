use super::{json_enabled, open_workspace, resolve_actor_user};
use crate::api;
use crate::config;
use crate::error::Result;

/// Execute the show command.
///
/// # Errors
///
/// Returns an error if authorization is denied or the issue is absent.
pub fn execute(id: i64, cli: &config::CliOverrides) -> Result<()> {
    let (storage, layer) = open_workspace(cli)?;
    let actor = resolve_actor_user(&storage, &layer)?;

    let issue = api::get_issue(&storage, &actor, id)?;

    if json_enabled(&layer) {
        println!("{}", serde_json::to_string_pretty(&issue)?);
        return Ok(());
    }

    println!("Issue #{}", issue.id);
    println!("  name:        {}", issue.name);
    println!("  description: {}", issue.description);
    println!("  creator:     {}", issue.creator_id);
    println!("  responsible: {}", issue.responsible_person_id);
    println!("  state:       {}", issue.state_id);
    println!("  category:    {}", issue.category_id);
    println!(
        "  created_at:  {}",
        issue.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    match issue.finished_at {
        Some(ts) => println!("  finished_at: {}", ts.format("%Y-%m-%d %H:%M:%S")),
        None => println!("  finished_at: -"),
    }
    Ok(())
}
