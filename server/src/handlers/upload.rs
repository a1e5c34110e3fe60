//! Upload handler - reconciles a client batch into the store.

use pawsync_engine::{OwnerId, UploadRequest, UploadSummary, Validate};

use crate::error::Result;
use crate::store::EntityStore;

/// Reconcile an upload batch for `owner`.
///
/// The whole request is validated before anything is written. After that,
/// each pet is upserted and then each of its events and vaccines under it;
/// stale records are discarded without failing the request. Writes are not
/// rolled back if a later record fails.
pub async fn handle_upload(
    store: &dyn EntityStore,
    owner: &OwnerId,
    request: UploadRequest,
) -> Result<UploadSummary> {
    request.validate()?;

    let mut summary = UploadSummary::default();

    for pet in &request.pets {
        let animal = pet.to_animal(owner);
        summary.animals.record(store.upsert_animal(&animal).await?);

        for payload in &pet.events {
            let event = payload.to_event(animal.id);
            summary.events.record(store.upsert_event(owner, &event).await?);
        }

        for payload in &pet.vaccines {
            let vaccine = payload.to_vaccine(animal.id);
            summary
                .vaccines
                .record(store.upsert_vaccine(owner, &vaccine).await?);
        }
    }

    tracing::info!(
        owner = %owner,
        pets = request.pets.len(),
        written = summary.written(),
        discarded = summary.discarded(),
        "Upload reconciled: animals {:?}, events {:?}, vaccines {:?}",
        summary.animals,
        summary.events,
        summary.vaccines,
    );

    Ok(summary)
}
