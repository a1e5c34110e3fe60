//! In-memory backend.

use async_trait::async_trait;
use pawsync_engine::{
    Animal, Decision, Event, PetTree, RecordId, Store, Timestamp, UpdateCounts, Vaccine,
};
use tokio::sync::Mutex;

use super::EntityStore;
use crate::error::Result;

/// Entity store backed by the engine's in-memory [`Store`].
///
/// Each call holds the lock for its whole duration, so every conditional
/// upsert is atomic with respect to concurrent requests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Store>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert_animal(&self, animal: &Animal) -> Result<Decision> {
        Ok(self.inner.lock().await.upsert_animal(animal.clone()))
    }

    async fn upsert_event(&self, owner: &str, event: &Event) -> Result<Decision> {
        Ok(self.inner.lock().await.upsert_event(owner, event.clone())?)
    }

    async fn upsert_vaccine(&self, owner: &str, vaccine: &Vaccine) -> Result<Decision> {
        Ok(self.inner.lock().await.upsert_vaccine(owner, vaccine.clone())?)
    }

    async fn changed_pets(&self, owner: &str, since: Option<Timestamp>) -> Result<Vec<PetTree>> {
        Ok(self.inner.lock().await.changed_pets(owner, since))
    }

    async fn change_counts(
        &self,
        owner: &str,
        since: Option<Timestamp>,
    ) -> Result<UpdateCounts> {
        Ok(self.inner.lock().await.change_counts(owner, since))
    }

    async fn get_pet(&self, owner: &str, id: RecordId) -> Result<Option<PetTree>> {
        Ok(self.inner.lock().await.get_pet(owner, id))
    }

    async fn insert_animal(&self, animal: &Animal) -> Result<()> {
        Ok(self.inner.lock().await.insert_animal(animal.clone())?)
    }

    async fn replace_animal(&self, animal: &Animal) -> Result<()> {
        Ok(self.inner.lock().await.replace_animal(animal.clone())?)
    }

    async fn delete_animal(&self, owner: &str, id: RecordId) -> Result<()> {
        Ok(self.inner.lock().await.delete_animal(owner, id)?)
    }

    async fn list_events(&self, owner: &str, animal: RecordId) -> Result<Vec<Event>> {
        Ok(self.inner.lock().await.list_events(owner, animal)?)
    }

    async fn get_event(
        &self,
        owner: &str,
        animal: RecordId,
        id: RecordId,
    ) -> Result<Option<Event>> {
        Ok(self.inner.lock().await.get_event(owner, animal, id).cloned())
    }

    async fn insert_event(&self, owner: &str, event: &Event) -> Result<()> {
        Ok(self.inner.lock().await.insert_event(owner, event.clone())?)
    }

    async fn replace_event(&self, owner: &str, event: &Event) -> Result<()> {
        Ok(self.inner.lock().await.replace_event(owner, event.clone())?)
    }

    async fn delete_event(&self, owner: &str, animal: RecordId, id: RecordId) -> Result<()> {
        Ok(self.inner.lock().await.delete_event(owner, animal, id)?)
    }

    async fn list_vaccines(&self, owner: &str, animal: RecordId) -> Result<Vec<Vaccine>> {
        Ok(self.inner.lock().await.list_vaccines(owner, animal)?)
    }

    async fn get_vaccine(
        &self,
        owner: &str,
        animal: RecordId,
        id: RecordId,
    ) -> Result<Option<Vaccine>> {
        Ok(self.inner.lock().await.get_vaccine(owner, animal, id).cloned())
    }

    async fn insert_vaccine(&self, owner: &str, vaccine: &Vaccine) -> Result<()> {
        Ok(self.inner.lock().await.insert_vaccine(owner, vaccine.clone())?)
    }

    async fn replace_vaccine(&self, owner: &str, vaccine: &Vaccine) -> Result<()> {
        Ok(self.inner.lock().await.replace_vaccine(owner, vaccine.clone())?)
    }

    async fn delete_vaccine(&self, owner: &str, animal: RecordId, id: RecordId) -> Result<()> {
        Ok(self.inner.lock().await.delete_vaccine(owner, animal, id)?)
    }
}
