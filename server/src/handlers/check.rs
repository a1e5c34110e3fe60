//! Check-for-updates handler.

use pawsync_engine::{CheckUpdatesResponse, CheckpointRequest};

use crate::error::Result;
use crate::store::EntityStore;

/// Count the records of each kind changed after the checkpoint.
///
/// Unlike download, an event change does not count its animal.
pub async fn handle_check_updates(
    store: &dyn EntityStore,
    owner: &str,
    request: CheckpointRequest,
) -> Result<CheckUpdatesResponse> {
    let counts = store.change_counts(owner, request.last_synced_at).await?;
    tracing::debug!(owner = %owner, ?counts, "Checked for updates");
    Ok(counts.into())
}
