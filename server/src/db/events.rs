//! Database operations for the events table.

use chrono::{DateTime, NaiveDate, Utc};
use pawsync_engine::{Decision, Event};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::decision_from;

/// A stored event row from the database.
#[derive(Debug)]
pub struct EventRow {
    pub animal_id: Uuid,
    pub id: Uuid,
    pub kind: String,
    pub event_date: NaiveDate,
    pub observation: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for EventRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(EventRow {
            animal_id: row.try_get("animal_id")?,
            id: row.try_get("id")?,
            kind: row.try_get("kind")?,
            event_date: row.try_get("event_date")?,
            observation: row.try_get("observation")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            animal: row.animal_id,
            kind: row.kind,
            date: row.event_date,
            observation: row.observation,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_EVENTS: &str = r#"
    SELECT animal_id, id, kind, event_date, observation, updated_at
    FROM events
"#;

/// Conditionally upsert an event under `owner_id`.
///
/// A missing parent animal surfaces as a foreign key violation.
pub async fn upsert_event(
    pool: &PgPool,
    owner_id: &str,
    event: &Event,
) -> Result<Decision, sqlx::Error> {
    let row = sqlx::query_as::<_, (bool,)>(
        r#"
        INSERT INTO events (owner_id, animal_id, id, kind, event_date, observation, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (owner_id, animal_id, id) DO UPDATE SET
            kind = EXCLUDED.kind,
            event_date = EXCLUDED.event_date,
            observation = EXCLUDED.observation,
            updated_at = EXCLUDED.updated_at
        WHERE events.updated_at < EXCLUDED.updated_at
        RETURNING (xmax = 0)
        "#,
    )
    .bind(owner_id)
    .bind(event.animal)
    .bind(event.id)
    .bind(&event.kind)
    .bind(event.date)
    .bind(&event.observation)
    .bind(event.updated_at)
    .fetch_optional(pool)
    .await?;

    Ok(decision_from(row))
}

/// All events of the given animals, ordered by animal then ID.
pub async fn list_events_for(
    pool: &PgPool,
    owner_id: &str,
    animal_ids: &[Uuid],
) -> Result<Vec<EventRow>, sqlx::Error> {
    sqlx::query_as::<_, EventRow>(&format!(
        "{SELECT_EVENTS} WHERE owner_id = $1 AND animal_id = ANY($2) ORDER BY animal_id, id"
    ))
    .bind(owner_id)
    .bind(animal_ids)
    .fetch_all(pool)
    .await
}

/// Get a single event by owner, animal and ID.
pub async fn get_event(
    pool: &PgPool,
    owner_id: &str,
    animal_id: Uuid,
    id: Uuid,
) -> Result<Option<EventRow>, sqlx::Error> {
    sqlx::query_as::<_, EventRow>(&format!(
        "{SELECT_EVENTS} WHERE owner_id = $1 AND animal_id = $2 AND id = $3"
    ))
    .bind(owner_id)
    .bind(animal_id)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Insert a new event.
pub async fn insert_event(pool: &PgPool, owner_id: &str, event: &Event) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO events (owner_id, animal_id, id, kind, event_date, observation, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(owner_id)
    .bind(event.animal)
    .bind(event.id)
    .bind(&event.kind)
    .bind(event.date)
    .bind(&event.observation)
    .bind(event.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Overwrite an existing event. Returns false if absent.
pub async fn update_event(pool: &PgPool, owner_id: &str, event: &Event) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE events
        SET kind = $4, event_date = $5, observation = $6, updated_at = $7
        WHERE owner_id = $1 AND animal_id = $2 AND id = $3
        "#,
    )
    .bind(owner_id)
    .bind(event.animal)
    .bind(event.id)
    .bind(&event.kind)
    .bind(event.date)
    .bind(&event.observation)
    .bind(event.updated_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete an event. Returns false if absent.
pub async fn delete_event(
    pool: &PgPool,
    owner_id: &str,
    animal_id: Uuid,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM events WHERE owner_id = $1 AND animal_id = $2 AND id = $3")
            .bind(owner_id)
            .bind(animal_id)
            .bind(id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}
