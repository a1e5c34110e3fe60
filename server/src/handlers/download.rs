//! Download handler - serves pets changed since a checkpoint.

use chrono::Utc;
use pawsync_engine::{normalize, CheckpointRequest, DownloadResponse};

use crate::error::Result;
use crate::store::EntityStore;

/// Collect the pets of `owner` whose subtree changed after the checkpoint.
pub async fn handle_download(
    store: &dyn EntityStore,
    owner: &str,
    request: CheckpointRequest,
) -> Result<DownloadResponse> {
    // Taken before the query so a write racing with it is seen again next time.
    let synced_at = normalize(Utc::now());

    let pets = store.changed_pets(owner, request.last_synced_at).await?;

    tracing::debug!(
        owner = %owner,
        since = ?request.last_synced_at,
        pets = pets.len(),
        "Download served"
    );

    Ok(DownloadResponse { pets, synced_at })
}
