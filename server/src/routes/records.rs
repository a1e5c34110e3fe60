//! Record collection routes.

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use pawsync_engine::{
    Animal, AnimalInput, AnimalPatch, Event, EventInput, EventPatch, PetTree, RecordId, Vaccine,
    VaccineInput, VaccinePatch,
};

use crate::auth::AuthUser;
use crate::error::Result;
use crate::extract::{AppJson, AppPath};
use crate::handlers::records;
use crate::AppState;

/// Create record routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/animals", get(list_animals).post(create_animal))
        .route(
            "/animals/{id}",
            get(get_animal)
                .put(update_animal)
                .patch(patch_animal)
                .delete(delete_animal),
        )
        .route(
            "/animals/{animal_id}/events",
            get(list_events).post(create_event),
        )
        .route(
            "/animals/{animal_id}/events/{id}",
            get(get_event)
                .put(update_event)
                .patch(patch_event)
                .delete(delete_event),
        )
        .route(
            "/animals/{animal_id}/vaccines",
            get(list_vaccines).post(create_vaccine),
        )
        .route(
            "/animals/{animal_id}/vaccines/{id}",
            get(get_vaccine)
                .put(update_vaccine)
                .patch(patch_vaccine)
                .delete(delete_vaccine),
        )
}

// Animals

async fn list_animals(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<PetTree>>> {
    let pets = records::list_pets(state.store.as_ref(), &auth.owner_id).await?;
    Ok(Json(pets))
}

async fn create_animal(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<AnimalInput>,
) -> Result<(StatusCode, Json<Animal>)> {
    let animal = records::create_animal(state.store.as_ref(), &auth.owner_id, input).await?;
    Ok((StatusCode::CREATED, Json(animal)))
}

async fn get_animal(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<RecordId>,
) -> Result<Json<PetTree>> {
    let pet = records::get_pet(state.store.as_ref(), &auth.owner_id, id).await?;
    Ok(Json(pet))
}

async fn update_animal(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<RecordId>,
    AppJson(input): AppJson<AnimalInput>,
) -> Result<Json<Animal>> {
    let animal = records::update_animal(state.store.as_ref(), &auth.owner_id, id, input).await?;
    Ok(Json(animal))
}

async fn patch_animal(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<RecordId>,
    AppJson(patch): AppJson<AnimalPatch>,
) -> Result<Json<Animal>> {
    let animal = records::patch_animal(state.store.as_ref(), &auth.owner_id, id, patch).await?;
    Ok(Json(animal))
}

async fn delete_animal(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<RecordId>,
) -> Result<StatusCode> {
    records::delete_animal(state.store.as_ref(), &auth.owner_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Events

async fn list_events(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(animal): AppPath<RecordId>,
) -> Result<Json<Vec<Event>>> {
    let events = records::list_events(state.store.as_ref(), &auth.owner_id, animal).await?;
    Ok(Json(events))
}

async fn create_event(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(animal): AppPath<RecordId>,
    AppJson(input): AppJson<EventInput>,
) -> Result<(StatusCode, Json<Event>)> {
    let event =
        records::create_event(state.store.as_ref(), &auth.owner_id, animal, input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn get_event(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((animal, id)): AppPath<(RecordId, RecordId)>,
) -> Result<Json<Event>> {
    let event = records::get_event(state.store.as_ref(), &auth.owner_id, animal, id).await?;
    Ok(Json(event))
}

async fn update_event(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((animal, id)): AppPath<(RecordId, RecordId)>,
    AppJson(input): AppJson<EventInput>,
) -> Result<Json<Event>> {
    let event =
        records::update_event(state.store.as_ref(), &auth.owner_id, animal, id, input).await?;
    Ok(Json(event))
}

async fn patch_event(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((animal, id)): AppPath<(RecordId, RecordId)>,
    AppJson(patch): AppJson<EventPatch>,
) -> Result<Json<Event>> {
    let event =
        records::patch_event(state.store.as_ref(), &auth.owner_id, animal, id, patch).await?;
    Ok(Json(event))
}

async fn delete_event(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((animal, id)): AppPath<(RecordId, RecordId)>,
) -> Result<StatusCode> {
    records::delete_event(state.store.as_ref(), &auth.owner_id, animal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Vaccines

async fn list_vaccines(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(animal): AppPath<RecordId>,
) -> Result<Json<Vec<Vaccine>>> {
    let vaccines = records::list_vaccines(state.store.as_ref(), &auth.owner_id, animal).await?;
    Ok(Json(vaccines))
}

async fn create_vaccine(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(animal): AppPath<RecordId>,
    AppJson(input): AppJson<VaccineInput>,
) -> Result<(StatusCode, Json<Vaccine>)> {
    let vaccine =
        records::create_vaccine(state.store.as_ref(), &auth.owner_id, animal, input).await?;
    Ok((StatusCode::CREATED, Json(vaccine)))
}

async fn get_vaccine(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((animal, id)): AppPath<(RecordId, RecordId)>,
) -> Result<Json<Vaccine>> {
    let vaccine = records::get_vaccine(state.store.as_ref(), &auth.owner_id, animal, id).await?;
    Ok(Json(vaccine))
}

async fn update_vaccine(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((animal, id)): AppPath<(RecordId, RecordId)>,
    AppJson(input): AppJson<VaccineInput>,
) -> Result<Json<Vaccine>> {
    let vaccine =
        records::update_vaccine(state.store.as_ref(), &auth.owner_id, animal, id, input).await?;
    Ok(Json(vaccine))
}

async fn patch_vaccine(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((animal, id)): AppPath<(RecordId, RecordId)>,
    AppJson(patch): AppJson<VaccinePatch>,
) -> Result<Json<Vaccine>> {
    let vaccine =
        records::patch_vaccine(state.store.as_ref(), &auth.owner_id, animal, id, patch).await?;
    Ok(Json(vaccine))
}

async fn delete_vaccine(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((animal, id)): AppPath<(RecordId, RecordId)>,
) -> Result<StatusCode> {
    records::delete_vaccine(state.store.as_ref(), &auth.owner_id, animal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
