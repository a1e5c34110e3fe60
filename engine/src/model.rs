//! Record types for pets and their health history.

use crate::{OwnerId, RecordId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A pet owned by one principal.
///
/// The owner is never serialized; it comes from the authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animal {
    /// Client-assigned identifier, unique within the owner's scope
    pub id: RecordId,
    /// Principal that owns this animal
    #[serde(skip)]
    pub owner_id: OwnerId,
    pub name: String,
    /// Species label ("Dog", "Cat", ...)
    #[serde(rename = "type")]
    pub kind: String,
    pub breed: String,
    pub date_of_birth: NaiveDate,
    /// Reconciliation version marker
    pub updated_at: Timestamp,
}

/// A medical event (consultation, surgery, ...) of one animal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Client-assigned identifier, unique within the owning animal
    pub id: RecordId,
    /// Owning animal
    pub animal: RecordId,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: NaiveDate,
    pub observation: Option<String>,
    pub updated_at: Timestamp,
}

/// A vaccine application of one animal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vaccine {
    /// Client-assigned identifier, unique within the owning animal
    pub id: RecordId,
    /// Owning animal
    pub animal: RecordId,
    pub name: String,
    pub application_date: NaiveDate,
    pub next_dose_date: Option<NaiveDate>,
    pub updated_at: Timestamp,
}

/// An animal together with its complete current events and vaccines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetTree {
    #[serde(flatten)]
    pub animal: Animal,
    pub events: Vec<Event>,
    pub vaccines: Vec<Vaccine>,
}
