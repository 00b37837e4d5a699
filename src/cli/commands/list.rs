use super::{json_enabled, open_workspace, resolve_actor_user};
use crate::api;
use crate::config;
use crate::error::Result;
use crate::model::Issue;

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if authorization is denied or the query fails.
pub fn execute(cli: &config::CliOverrides) -> Result<()> {
    let (storage, layer) = open_workspace(cli)?;
    let actor = resolve_actor_user(&storage, &layer)?;

    let issues = api::list_issues(&storage, &actor)?;

    if json_enabled(&layer) {
        println!("{}", serde_json::to_string_pretty(&issues)?);
        return Ok(());
    }

    if issues.is_empty() {
        println!("No issues found.");
        return Ok(());
    }

    for issue in &issues {
        println!("{}", format_line(issue));
    }
    println!("{} issue(s)", issues.len());
    Ok(())
}

fn format_line(issue: &Issue) -> String {
    let finished = issue.finished_at.map_or_else(String::new, |ts| {
        format!("  finished {}", ts.format("%Y-%m-%d %H:%M:%S"))
    });
    format!(
        "#{:<4} {}  {}  (state {}, category {}){}",
        issue.id,
        issue.created_at.format("%Y-%m-%d %H:%M:%S"),
        issue.name,
        issue.state_id,
        issue.category_id,
        finished
    )
}
