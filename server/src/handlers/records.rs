//! Record handlers - direct CRUD on animals, events and vaccines.
//!
//! Every write stamps the record with the current server time, so a change
//! made here is picked up by the next download like any uploaded change.

use chrono::Utc;
use pawsync_engine::{
    Animal, AnimalInput, AnimalPatch, Error as EngineError, Event, EventInput, EventPatch,
    OwnerId, PetTree, RecordId, Vaccine, VaccineInput, VaccinePatch, Validate,
};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::store::EntityStore;

/// The body may repeat the path identifier but must not contradict it.
fn check_body_id(path_id: RecordId, body_id: Option<RecordId>) -> Result<()> {
    match body_id {
        Some(body_id) if body_id != path_id => Err(AppError::BadRequest(format!(
            "Body id {body_id} does not match path id {path_id}"
        ))),
        _ => Ok(()),
    }
}

// ============================================================================
// Animals
// ============================================================================

pub async fn list_pets(store: &dyn EntityStore, owner: &OwnerId) -> Result<Vec<PetTree>> {
    store.changed_pets(owner, None).await
}

pub async fn create_animal(
    store: &dyn EntityStore,
    owner: &OwnerId,
    input: AnimalInput,
) -> Result<Animal> {
    input.validate()?;
    let id = input.id.unwrap_or_else(Uuid::new_v4);
    let animal = input.into_animal(id, owner, Utc::now());
    store.insert_animal(&animal).await?;
    tracing::info!(owner = %owner, animal = %id, "Animal created");
    Ok(animal)
}

pub async fn get_pet(store: &dyn EntityStore, owner: &OwnerId, id: RecordId) -> Result<PetTree> {
    store
        .get_pet(owner, id)
        .await?
        .ok_or_else(|| EngineError::AnimalNotFound(id).into())
}

pub async fn update_animal(
    store: &dyn EntityStore,
    owner: &OwnerId,
    id: RecordId,
    input: AnimalInput,
) -> Result<Animal> {
    input.validate()?;
    check_body_id(id, input.id)?;
    let animal = input.into_animal(id, owner, Utc::now());
    store.replace_animal(&animal).await?;
    tracing::info!(owner = %owner, animal = %id, "Animal updated");
    Ok(animal)
}

/// Overlay the fields present in `patch` on the stored animal.
pub async fn patch_animal(
    store: &dyn EntityStore,
    owner: &OwnerId,
    id: RecordId,
    patch: AnimalPatch,
) -> Result<Animal> {
    patch.validate()?;
    check_body_id(id, patch.id)?;
    let stored = get_pet(store, owner, id).await?.animal;
    let animal = patch.apply_to(stored, Utc::now());
    store.replace_animal(&animal).await?;
    tracing::info!(owner = %owner, animal = %id, "Animal patched");
    Ok(animal)
}

pub async fn delete_animal(store: &dyn EntityStore, owner: &OwnerId, id: RecordId) -> Result<()> {
    store.delete_animal(owner, id).await?;
    tracing::info!(owner = %owner, animal = %id, "Animal deleted");
    Ok(())
}

// ============================================================================
// Events
// ============================================================================

pub async fn list_events(
    store: &dyn EntityStore,
    owner: &OwnerId,
    animal: RecordId,
) -> Result<Vec<Event>> {
    store.list_events(owner, animal).await
}

pub async fn create_event(
    store: &dyn EntityStore,
    owner: &OwnerId,
    animal: RecordId,
    input: EventInput,
) -> Result<Event> {
    input.validate()?;
    let id = input.id.unwrap_or_else(Uuid::new_v4);
    let event = input.into_event(id, animal, Utc::now());
    store.insert_event(owner, &event).await?;
    tracing::info!(owner = %owner, %animal, event = %id, "Event created");
    Ok(event)
}

pub async fn get_event(
    store: &dyn EntityStore,
    owner: &OwnerId,
    animal: RecordId,
    id: RecordId,
) -> Result<Event> {
    store
        .get_event(owner, animal, id)
        .await?
        .ok_or_else(|| EngineError::RecordNotFound(id).into())
}

pub async fn update_event(
    store: &dyn EntityStore,
    owner: &OwnerId,
    animal: RecordId,
    id: RecordId,
    input: EventInput,
) -> Result<Event> {
    input.validate()?;
    check_body_id(id, input.id)?;
    let event = input.into_event(id, animal, Utc::now());
    store.replace_event(owner, &event).await?;
    Ok(event)
}

pub async fn patch_event(
    store: &dyn EntityStore,
    owner: &OwnerId,
    animal: RecordId,
    id: RecordId,
    patch: EventPatch,
) -> Result<Event> {
    patch.validate()?;
    check_body_id(id, patch.id)?;
    let stored = get_event(store, owner, animal, id).await?;
    let event = patch.apply_to(stored, Utc::now());
    store.replace_event(owner, &event).await?;
    Ok(event)
}

pub async fn delete_event(
    store: &dyn EntityStore,
    owner: &OwnerId,
    animal: RecordId,
    id: RecordId,
) -> Result<()> {
    store.delete_event(owner, animal, id).await
}

// ============================================================================
// Vaccines
// ============================================================================

pub async fn list_vaccines(
    store: &dyn EntityStore,
    owner: &OwnerId,
    animal: RecordId,
) -> Result<Vec<Vaccine>> {
    store.list_vaccines(owner, animal).await
}

pub async fn create_vaccine(
    store: &dyn EntityStore,
    owner: &OwnerId,
    animal: RecordId,
    input: VaccineInput,
) -> Result<Vaccine> {
    input.validate()?;
    let id = input.id.unwrap_or_else(Uuid::new_v4);
    let vaccine = input.into_vaccine(id, animal, Utc::now());
    store.insert_vaccine(owner, &vaccine).await?;
    tracing::info!(owner = %owner, %animal, vaccine = %id, "Vaccine created");
    Ok(vaccine)
}

pub async fn get_vaccine(
    store: &dyn EntityStore,
    owner: &OwnerId,
    animal: RecordId,
    id: RecordId,
) -> Result<Vaccine> {
    store
        .get_vaccine(owner, animal, id)
        .await?
        .ok_or_else(|| EngineError::RecordNotFound(id).into())
}

pub async fn update_vaccine(
    store: &dyn EntityStore,
    owner: &OwnerId,
    animal: RecordId,
    id: RecordId,
    input: VaccineInput,
) -> Result<Vaccine> {
    input.validate()?;
    check_body_id(id, input.id)?;
    let vaccine = input.into_vaccine(id, animal, Utc::now());
    store.replace_vaccine(owner, &vaccine).await?;
    Ok(vaccine)
}

pub async fn patch_vaccine(
    store: &dyn EntityStore,
    owner: &OwnerId,
    animal: RecordId,
    id: RecordId,
    patch: VaccinePatch,
) -> Result<Vaccine> {
    patch.validate()?;
    check_body_id(id, patch.id)?;
    let stored = get_vaccine(store, owner, animal, id).await?;
    let vaccine = patch.apply_to(stored, Utc::now());
    store.replace_vaccine(owner, &vaccine).await?;
    Ok(vaccine)
}

pub async fn delete_vaccine(
    store: &dyn EntityStore,
    owner: &OwnerId,
    animal: RecordId,
    id: RecordId,
) -> Result<()> {
    store.delete_vaccine(owner, animal, id).await
}
