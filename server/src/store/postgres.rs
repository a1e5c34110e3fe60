//! PostgreSQL backend.

use async_trait::async_trait;
use pawsync_engine::{
    Animal, Decision, Error as EngineError, Event, PetTree, RecordId, Timestamp, UpdateCounts,
    Vaccine,
};

use sqlx::postgres::{PgPool, PgPoolOptions};

use super::EntityStore;
use crate::db::{self, is_foreign_key_violation, is_unique_violation};
use crate::error::{AppError, Result};

/// Entity store persisting to PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a pool of at most `max_connections` and bring the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> sqlx::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    async fn require_animal(&self, owner: &str, animal: RecordId) -> Result<()> {
        match db::get_animal(&self.pool, owner, animal).await? {
            Some(_) => Ok(()),
            None => Err(EngineError::AnimalNotFound(animal).into()),
        }
    }
}

/// Translate constraint violations on child writes into domain errors.
fn child_write_error(e: sqlx::Error, animal: RecordId, id: RecordId) -> AppError {
    if is_foreign_key_violation(&e) {
        EngineError::AnimalNotFound(animal).into()
    } else if is_unique_violation(&e) {
        EngineError::RecordAlreadyExists(id).into()
    } else {
        e.into()
    }
}

fn found_or(found: bool, err: EngineError) -> Result<()> {
    if found {
        Ok(())
    } else {
        Err(err.into())
    }
}

#[async_trait]
impl EntityStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn upsert_animal(&self, animal: &Animal) -> Result<Decision> {
        Ok(db::upsert_animal(&self.pool, animal).await?)
    }

    async fn upsert_event(&self, owner: &str, event: &Event) -> Result<Decision> {
        db::upsert_event(&self.pool, owner, event)
            .await
            .map_err(|e| child_write_error(e, event.animal, event.id))
    }

    async fn upsert_vaccine(&self, owner: &str, vaccine: &Vaccine) -> Result<Decision> {
        db::upsert_vaccine(&self.pool, owner, vaccine)
            .await
            .map_err(|e| child_write_error(e, vaccine.animal, vaccine.id))
    }

    async fn changed_pets(&self, owner: &str, since: Option<Timestamp>) -> Result<Vec<PetTree>> {
        let animals = db::changed_animals(&self.pool, owner, since).await?;
        Ok(db::load_trees(&self.pool, owner, animals).await?)
    }

    async fn change_counts(
        &self,
        owner: &str,
        since: Option<Timestamp>,
    ) -> Result<UpdateCounts> {
        Ok(db::change_counts(&self.pool, owner, since).await?)
    }

    async fn get_pet(&self, owner: &str, id: RecordId) -> Result<Option<PetTree>> {
        let Some(row) = db::get_animal(&self.pool, owner, id).await? else {
            return Ok(None);
        };
        let mut trees = db::load_trees(&self.pool, owner, vec![row]).await?;
        Ok(trees.pop())
    }

    async fn insert_animal(&self, animal: &Animal) -> Result<()> {
        db::insert_animal(&self.pool, animal).await.map_err(|e| {
            if is_unique_violation(&e) {
                EngineError::RecordAlreadyExists(animal.id).into()
            } else {
                AppError::from(e)
            }
        })
    }

    async fn replace_animal(&self, animal: &Animal) -> Result<()> {
        let found = db::update_animal(&self.pool, animal).await?;
        found_or(found, EngineError::AnimalNotFound(animal.id))
    }

    async fn delete_animal(&self, owner: &str, id: RecordId) -> Result<()> {
        let found = db::delete_animal(&self.pool, owner, id).await?;
        found_or(found, EngineError::AnimalNotFound(id))
    }

    async fn list_events(&self, owner: &str, animal: RecordId) -> Result<Vec<Event>> {
        self.require_animal(owner, animal).await?;
        let rows = db::list_events_for(&self.pool, owner, &[animal]).await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn get_event(
        &self,
        owner: &str,
        animal: RecordId,
        id: RecordId,
    ) -> Result<Option<Event>> {
        Ok(db::get_event(&self.pool, owner, animal, id)
            .await?
            .map(Event::from))
    }

    async fn insert_event(&self, owner: &str, event: &Event) -> Result<()> {
        db::insert_event(&self.pool, owner, event)
            .await
            .map_err(|e| child_write_error(e, event.animal, event.id))
    }

    async fn replace_event(&self, owner: &str, event: &Event) -> Result<()> {
        let found = db::update_event(&self.pool, owner, event).await?;
        found_or(found, EngineError::RecordNotFound(event.id))
    }

    async fn delete_event(&self, owner: &str, animal: RecordId, id: RecordId) -> Result<()> {
        let found = db::delete_event(&self.pool, owner, animal, id).await?;
        found_or(found, EngineError::RecordNotFound(id))
    }

    async fn list_vaccines(&self, owner: &str, animal: RecordId) -> Result<Vec<Vaccine>> {
        self.require_animal(owner, animal).await?;
        let rows = db::list_vaccines_for(&self.pool, owner, &[animal]).await?;
        Ok(rows.into_iter().map(Vaccine::from).collect())
    }

    async fn get_vaccine(
        &self,
        owner: &str,
        animal: RecordId,
        id: RecordId,
    ) -> Result<Option<Vaccine>> {
        Ok(db::get_vaccine(&self.pool, owner, animal, id)
            .await?
            .map(Vaccine::from))
    }

    async fn insert_vaccine(&self, owner: &str, vaccine: &Vaccine) -> Result<()> {
        db::insert_vaccine(&self.pool, owner, vaccine)
            .await
            .map_err(|e| child_write_error(e, vaccine.animal, vaccine.id))
    }

    async fn replace_vaccine(&self, owner: &str, vaccine: &Vaccine) -> Result<()> {
        let found = db::update_vaccine(&self.pool, owner, vaccine).await?;
        found_or(found, EngineError::RecordNotFound(vaccine.id))
    }

    async fn delete_vaccine(&self, owner: &str, animal: RecordId, id: RecordId) -> Result<()> {
        let found = db::delete_vaccine(&self.pool, owner, animal, id).await?;
        found_or(found, EngineError::RecordNotFound(id))
    }
}
