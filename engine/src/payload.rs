//! Wire shapes of the sync and record endpoints.
//!
//! Every request type maps its fields explicitly onto the record types and
//! rejects unknown fields, so a renamed or misspelled field fails at the
//! boundary instead of silently mutating something else.

use crate::{
    arbiter::normalize, error::Result, Animal, Error, Event, OwnerId, PetTree, RecordId,
    Timestamp, Vaccine,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Maximum length of short text labels (names, types, breeds).
pub const MAX_LABEL_LEN: usize = 100;

/// Semantic validation that runs after deserialization and before any
/// record is touched.
pub trait Validate {
    /// Validate with field paths prefixed by `path`.
    fn validate_at(&self, path: &str) -> Result<()>;

    /// Validate from the root of the request.
    fn validate(&self) -> Result<()> {
        self.validate_at("")
    }
}

fn field_path(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

/// Free text: any length, but no NUL characters, which text columns refuse.
fn check_text(path: &str, field: &str, value: &str) -> Result<()> {
    if value.contains('\0') {
        return Err(Error::invalid_field(
            field_path(path, field),
            "must not contain NUL characters",
        ));
    }
    Ok(())
}

fn check_label(path: &str, field: &str, value: &str) -> Result<()> {
    check_text(path, field, value)?;
    if value.trim().is_empty() {
        return Err(Error::invalid_field(
            field_path(path, field),
            "must not be blank",
        ));
    }
    if value.chars().count() > MAX_LABEL_LEN {
        return Err(Error::invalid_field(
            field_path(path, field),
            format!("must be at most {MAX_LABEL_LEN} characters"),
        ));
    }
    Ok(())
}

// ============================================================================
// Upload
// ============================================================================

/// Request body of the upload operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadRequest {
    pub pets: Vec<PetPayload>,
}

impl Validate for UploadRequest {
    fn validate_at(&self, path: &str) -> Result<()> {
        for (i, pet) in self.pets.iter().enumerate() {
            pet.validate_at(&field_path(path, &format!("pets[{i}]")))?;
        }
        Ok(())
    }
}

/// One pet of an upload batch with its nested children.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PetPayload {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub breed: String,
    pub date_of_birth: NaiveDate,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub events: Vec<EventPayload>,
    #[serde(default)]
    pub vaccines: Vec<VaccinePayload>,
}

impl PetPayload {
    /// Map this payload onto an animal owned by `owner`.
    pub fn to_animal(&self, owner: &OwnerId) -> Animal {
        Animal {
            id: self.id,
            owner_id: owner.clone(),
            name: self.name.clone(),
            kind: self.kind.clone(),
            breed: self.breed.clone(),
            date_of_birth: self.date_of_birth,
            updated_at: normalize(self.updated_at),
        }
    }
}

impl Validate for PetPayload {
    fn validate_at(&self, path: &str) -> Result<()> {
        check_label(path, "name", &self.name)?;
        check_label(path, "type", &self.kind)?;
        check_label(path, "breed", &self.breed)?;
        for (i, event) in self.events.iter().enumerate() {
            event.validate_at(&field_path(path, &format!("events[{i}]")))?;
        }
        for (i, vaccine) in self.vaccines.iter().enumerate() {
            vaccine.validate_at(&field_path(path, &format!("vaccines[{i}]")))?;
        }
        Ok(())
    }
}

/// An event nested in a pet payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventPayload {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub observation: Option<String>,
    pub updated_at: Timestamp,
}

impl EventPayload {
    /// Map this payload onto an event of the resolved animal.
    pub fn to_event(&self, animal: RecordId) -> Event {
        Event {
            id: self.id,
            animal,
            kind: self.kind.clone(),
            date: self.date,
            observation: self.observation.clone(),
            updated_at: normalize(self.updated_at),
        }
    }
}

impl Validate for EventPayload {
    fn validate_at(&self, path: &str) -> Result<()> {
        check_label(path, "type", &self.kind)?;
        match &self.observation {
            Some(observation) => check_text(path, "observation", observation),
            None => Ok(()),
        }
    }
}

/// A vaccine nested in a pet payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VaccinePayload {
    pub id: RecordId,
    pub name: String,
    pub application_date: NaiveDate,
    #[serde(default)]
    pub next_dose_date: Option<NaiveDate>,
    pub updated_at: Timestamp,
}

impl VaccinePayload {
    /// Map this payload onto a vaccine of the resolved animal.
    pub fn to_vaccine(&self, animal: RecordId) -> Vaccine {
        Vaccine {
            id: self.id,
            animal,
            name: self.name.clone(),
            application_date: self.application_date,
            next_dose_date: self.next_dose_date,
            updated_at: normalize(self.updated_at),
        }
    }
}

impl Validate for VaccinePayload {
    fn validate_at(&self, path: &str) -> Result<()> {
        check_label(path, "name", &self.name)
    }
}

// ============================================================================
// Download / check-for-updates
// ============================================================================

/// Request body of download and check-for-updates.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckpointRequest {
    /// Checkpoint from the previous download; absent on first sync
    #[serde(default)]
    pub last_synced_at: Option<Timestamp>,
}

/// Response body of download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadResponse {
    /// Pets whose subtree changed after the checkpoint, with all children
    pub pets: Vec<PetTree>,
    /// Checkpoint to send on the next download
    pub synced_at: Timestamp,
}

/// Per-kind number of records changed after a checkpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCounts {
    pub animals: u64,
    pub events: u64,
    pub vaccines: u64,
}

impl UpdateCounts {
    /// Whether any kind has changes.
    pub fn any(&self) -> bool {
        self.animals > 0 || self.events > 0 || self.vaccines > 0
    }
}

/// Response body of check-for-updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckUpdatesResponse {
    pub has_updates: bool,
    pub update_counts: UpdateCounts,
}

impl From<UpdateCounts> for CheckUpdatesResponse {
    fn from(counts: UpdateCounts) -> Self {
        Self {
            has_updates: counts.any(),
            update_counts: counts,
        }
    }
}

// ============================================================================
// Record endpoints
// ============================================================================

/// Body of animal create and update requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimalInput {
    /// Client-chosen identifier; generated when absent on create
    #[serde(default)]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub breed: String,
    pub date_of_birth: NaiveDate,
}

impl AnimalInput {
    /// Build the stored animal, stamped with `now` as its version.
    pub fn into_animal(self, id: RecordId, owner: &OwnerId, now: Timestamp) -> Animal {
        Animal {
            id,
            owner_id: owner.clone(),
            name: self.name,
            kind: self.kind,
            breed: self.breed,
            date_of_birth: self.date_of_birth,
            updated_at: normalize(now),
        }
    }
}

impl Validate for AnimalInput {
    fn validate_at(&self, path: &str) -> Result<()> {
        check_label(path, "name", &self.name)?;
        check_label(path, "type", &self.kind)?;
        check_label(path, "breed", &self.breed)
    }
}

/// Body of event create and update requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventInput {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub observation: Option<String>,
}

impl EventInput {
    /// Build the stored event, stamped with `now` as its version.
    pub fn into_event(self, id: RecordId, animal: RecordId, now: Timestamp) -> Event {
        Event {
            id,
            animal,
            kind: self.kind,
            date: self.date,
            observation: self.observation,
            updated_at: normalize(now),
        }
    }
}

impl Validate for EventInput {
    fn validate_at(&self, path: &str) -> Result<()> {
        check_label(path, "type", &self.kind)?;
        match &self.observation {
            Some(observation) => check_text(path, "observation", observation),
            None => Ok(()),
        }
    }
}

/// Body of vaccine create and update requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VaccineInput {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub name: String,
    pub application_date: NaiveDate,
    #[serde(default)]
    pub next_dose_date: Option<NaiveDate>,
}

impl VaccineInput {
    /// Build the stored vaccine, stamped with `now` as its version.
    pub fn into_vaccine(self, id: RecordId, animal: RecordId, now: Timestamp) -> Vaccine {
        Vaccine {
            id,
            animal,
            name: self.name,
            application_date: self.application_date,
            next_dose_date: self.next_dose_date,
            updated_at: normalize(now),
        }
    }
}

impl Validate for VaccineInput {
    fn validate_at(&self, path: &str) -> Result<()> {
        check_label(path, "name", &self.name)
    }
}

// ============================================================================
// Partial updates
// ============================================================================

/// Keeps `null` apart from an absent field: absent is `None`, `null` is
/// `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn check_optional_label(path: &str, field: &str, value: &Option<String>) -> Result<()> {
    match value {
        Some(value) => check_label(path, field, value),
        None => Ok(()),
    }
}

/// Body of an animal partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimalPatch {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

impl AnimalPatch {
    /// Overlay the present fields on `animal` and stamp it with `now`.
    pub fn apply_to(self, mut animal: Animal, now: Timestamp) -> Animal {
        if let Some(name) = self.name {
            animal.name = name;
        }
        if let Some(kind) = self.kind {
            animal.kind = kind;
        }
        if let Some(breed) = self.breed {
            animal.breed = breed;
        }
        if let Some(date_of_birth) = self.date_of_birth {
            animal.date_of_birth = date_of_birth;
        }
        animal.updated_at = normalize(now);
        animal
    }
}

impl Validate for AnimalPatch {
    fn validate_at(&self, path: &str) -> Result<()> {
        check_optional_label(path, "name", &self.name)?;
        check_optional_label(path, "type", &self.kind)?;
        check_optional_label(path, "breed", &self.breed)
    }
}

/// Body of an event partial update. `"observation": null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventPatch {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "present")]
    pub observation: Option<Option<String>>,
}

impl EventPatch {
    pub fn apply_to(self, mut event: Event, now: Timestamp) -> Event {
        if let Some(kind) = self.kind {
            event.kind = kind;
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(observation) = self.observation {
            event.observation = observation;
        }
        event.updated_at = normalize(now);
        event
    }
}

impl Validate for EventPatch {
    fn validate_at(&self, path: &str) -> Result<()> {
        check_optional_label(path, "type", &self.kind)?;
        match &self.observation {
            Some(Some(observation)) => check_text(path, "observation", observation),
            _ => Ok(()),
        }
    }
}

/// Body of a vaccine partial update. `"next_dose_date": null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VaccinePatch {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub application_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "present")]
    pub next_dose_date: Option<Option<NaiveDate>>,
}

impl VaccinePatch {
    pub fn apply_to(self, mut vaccine: Vaccine, now: Timestamp) -> Vaccine {
        if let Some(name) = self.name {
            vaccine.name = name;
        }
        if let Some(application_date) = self.application_date {
            vaccine.application_date = application_date;
        }
        if let Some(next_dose_date) = self.next_dose_date {
            vaccine.next_dose_date = next_dose_date;
        }
        vaccine.updated_at = normalize(now);
        vaccine
    }
}

impl Validate for VaccinePatch {
    fn validate_at(&self, path: &str) -> Result<()> {
        check_optional_label(path, "name", &self.name)
    }
}
