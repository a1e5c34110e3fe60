//! Database operations for the animals table.

use chrono::{DateTime, NaiveDate, Utc};
use pawsync_engine::{Animal, Decision};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::decision_from;

/// A stored animal row from the database.
#[derive(Debug)]
pub struct AnimalRow {
    pub owner_id: String,
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub breed: String,
    pub date_of_birth: NaiveDate,
    pub updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for AnimalRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(AnimalRow {
            owner_id: row.try_get("owner_id")?,
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            kind: row.try_get("kind")?,
            breed: row.try_get("breed")?,
            date_of_birth: row.try_get("date_of_birth")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<AnimalRow> for Animal {
    fn from(row: AnimalRow) -> Self {
        Animal {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            kind: row.kind,
            breed: row.breed,
            date_of_birth: row.date_of_birth,
            updated_at: row.updated_at,
        }
    }
}

/// Insert the animal, or overwrite it when the incoming version is strictly newer.
pub async fn upsert_animal(pool: &PgPool, animal: &Animal) -> Result<Decision, sqlx::Error> {
    let row = sqlx::query_as::<_, (bool,)>(
        r#"
        INSERT INTO animals (owner_id, id, name, kind, breed, date_of_birth, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (owner_id, id) DO UPDATE SET
            name = EXCLUDED.name,
            kind = EXCLUDED.kind,
            breed = EXCLUDED.breed,
            date_of_birth = EXCLUDED.date_of_birth,
            updated_at = EXCLUDED.updated_at
        WHERE animals.updated_at < EXCLUDED.updated_at
        RETURNING (xmax = 0)
        "#,
    )
    .bind(&animal.owner_id)
    .bind(animal.id)
    .bind(&animal.name)
    .bind(&animal.kind)
    .bind(&animal.breed)
    .bind(animal.date_of_birth)
    .bind(animal.updated_at)
    .fetch_optional(pool)
    .await?;

    Ok(decision_from(row))
}

/// Get an animal by owner and ID.
pub async fn get_animal(
    pool: &PgPool,
    owner_id: &str,
    id: Uuid,
) -> Result<Option<AnimalRow>, sqlx::Error> {
    sqlx::query_as::<_, AnimalRow>(
        r#"
        SELECT owner_id, id, name, kind, breed, date_of_birth, updated_at
        FROM animals
        WHERE owner_id = $1 AND id = $2
        "#,
    )
    .bind(owner_id)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Insert a new animal. Fails with a unique violation if the ID is taken.
pub async fn insert_animal(pool: &PgPool, animal: &Animal) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO animals (owner_id, id, name, kind, breed, date_of_birth, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(&animal.owner_id)
    .bind(animal.id)
    .bind(&animal.name)
    .bind(&animal.kind)
    .bind(&animal.breed)
    .bind(animal.date_of_birth)
    .bind(animal.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Overwrite an existing animal unconditionally. Returns false if absent.
pub async fn update_animal(pool: &PgPool, animal: &Animal) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE animals
        SET name = $3, kind = $4, breed = $5, date_of_birth = $6, updated_at = $7
        WHERE owner_id = $1 AND id = $2
        "#,
    )
    .bind(&animal.owner_id)
    .bind(animal.id)
    .bind(&animal.name)
    .bind(&animal.kind)
    .bind(&animal.breed)
    .bind(animal.date_of_birth)
    .bind(animal.updated_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete an animal; events and vaccines go with it. Returns false if absent.
pub async fn delete_animal(pool: &PgPool, owner_id: &str, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM animals WHERE owner_id = $1 AND id = $2")
        .bind(owner_id)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
