//! Principal-scoped entity storage.
//!
//! Handlers talk to storage only through [`EntityStore`]. Every method takes
//! the owner explicitly; no method resolves a record by identifier alone.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use pawsync_engine::{
    Animal, Decision, Event, PetTree, RecordId, Timestamp, UpdateCounts, Vaccine,
};

use crate::error::Result;

/// Storage backend for animals, events and vaccines.
///
/// The `upsert_*` methods are conditional writes: a single indivisible step
/// that inserts when the record is absent in scope, overwrites when the
/// incoming `updated_at` is strictly newer, and otherwise does nothing. They
/// report which of the three happened.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Short name of the backend, reported by the health endpoint.
    fn backend(&self) -> &'static str;

    /// Cheap round trip proving the backend can serve requests.
    async fn ping(&self) -> Result<()>;

    // Sync writes
    async fn upsert_animal(&self, animal: &Animal) -> Result<Decision>;
    async fn upsert_event(&self, owner: &str, event: &Event) -> Result<Decision>;
    async fn upsert_vaccine(&self, owner: &str, vaccine: &Vaccine) -> Result<Decision>;

    // Sync reads
    /// Pets whose subtree changed after `since`, with complete children.
    async fn changed_pets(&self, owner: &str, since: Option<Timestamp>) -> Result<Vec<PetTree>>;
    /// Per-kind counts of records changed after `since`.
    async fn change_counts(&self, owner: &str, since: Option<Timestamp>)
        -> Result<UpdateCounts>;

    // Animals
    async fn get_pet(&self, owner: &str, id: RecordId) -> Result<Option<PetTree>>;
    async fn insert_animal(&self, animal: &Animal) -> Result<()>;
    async fn replace_animal(&self, animal: &Animal) -> Result<()>;
    async fn delete_animal(&self, owner: &str, id: RecordId) -> Result<()>;

    // Events
    async fn list_events(&self, owner: &str, animal: RecordId) -> Result<Vec<Event>>;
    async fn get_event(&self, owner: &str, animal: RecordId, id: RecordId)
        -> Result<Option<Event>>;
    async fn insert_event(&self, owner: &str, event: &Event) -> Result<()>;
    async fn replace_event(&self, owner: &str, event: &Event) -> Result<()>;
    async fn delete_event(&self, owner: &str, animal: RecordId, id: RecordId) -> Result<()>;

    // Vaccines
    async fn list_vaccines(&self, owner: &str, animal: RecordId) -> Result<Vec<Vaccine>>;
    async fn get_vaccine(
        &self,
        owner: &str,
        animal: RecordId,
        id: RecordId,
    ) -> Result<Option<Vaccine>>;
    async fn insert_vaccine(&self, owner: &str, vaccine: &Vaccine) -> Result<()>;
    async fn replace_vaccine(&self, owner: &str, vaccine: &Vaccine) -> Result<()>;
    async fn delete_vaccine(&self, owner: &str, animal: RecordId, id: RecordId) -> Result<()>;
}
