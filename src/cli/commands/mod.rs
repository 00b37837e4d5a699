//! Command implementations.

pub mod category;
pub mod completions;
pub mod create;
pub mod delete;
pub mod init;
pub mod list;
pub mod show;
pub mod state;
pub mod update;
pub mod user;
pub mod version;

use crate::cli::IssueFieldArgs;
use crate::config;
use crate::error::{Result, TrackerError};
use crate::model::User;
use crate::storage::SqliteStorage;
use crate::util::time::parse_flexible_timestamp;
use crate::validation::IssuePayload;

/// Discover the workspace and open storage with the merged config.
pub(crate) fn open_workspace(
    cli: &config::CliOverrides,
) -> Result<(SqliteStorage, config::ConfigLayer)> {
    let tracker_dir = config::discover_tracker_dir(None)?;
    config::open_storage(&tracker_dir, cli)
}

/// Resolve the acting identity to a user record.
///
/// An unknown username is a denial, not a lookup failure: no data may leak
/// to identities the store does not know.
pub(crate) fn resolve_actor_user(
    storage: &SqliteStorage,
    layer: &config::ConfigLayer,
) -> Result<User> {
    let username = config::resolve_actor(layer);
    storage
        .find_user_by_username(&username)?
        .ok_or_else(|| TrackerError::forbidden(username, "access the tracker (unknown identity)"))
}

/// Translate issue field flags into an engine payload.
pub(crate) fn payload_from_args(args: &IssueFieldArgs) -> Result<IssuePayload> {
    let created_at = match args.created_at.as_deref() {
        Some(value) => Some(parse_flexible_timestamp(value, "created_at")?),
        None => None,
    };
    let finished_at = match args.finished_at.as_deref() {
        Some(value) => Some(parse_flexible_timestamp(value, "finished_at")?),
        None => None,
    };

    Ok(IssuePayload {
        name: args.name.clone(),
        creator_id: args.creator,
        responsible_person_id: args.responsible,
        description: args.description.clone(),
        state_id: args.state,
        category_id: args.category,
        created_at,
        finished_at,
    })
}

pub(crate) fn json_enabled(layer: &config::ConfigLayer) -> bool {
    layer
        .get("json")
        .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}
