//! Database operations for the vaccines table.

use chrono::{DateTime, NaiveDate, Utc};
use pawsync_engine::{Decision, Vaccine};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::decision_from;

/// A stored vaccine row from the database.
#[derive(Debug)]
pub struct VaccineRow {
    pub animal_id: Uuid,
    pub id: Uuid,
    pub name: String,
    pub application_date: NaiveDate,
    pub next_dose_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for VaccineRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(VaccineRow {
            animal_id: row.try_get("animal_id")?,
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            application_date: row.try_get("application_date")?,
            next_dose_date: row.try_get("next_dose_date")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<VaccineRow> for Vaccine {
    fn from(row: VaccineRow) -> Self {
        Vaccine {
            id: row.id,
            animal: row.animal_id,
            name: row.name,
            application_date: row.application_date,
            next_dose_date: row.next_dose_date,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_VACCINES: &str = r#"
    SELECT animal_id, id, name, application_date, next_dose_date, updated_at
    FROM vaccines
"#;

/// Conditionally upsert a vaccine under `owner_id`.
pub async fn upsert_vaccine(
    pool: &PgPool,
    owner_id: &str,
    vaccine: &Vaccine,
) -> Result<Decision, sqlx::Error> {
    let row = sqlx::query_as::<_, (bool,)>(
        r#"
        INSERT INTO vaccines
            (owner_id, animal_id, id, name, application_date, next_dose_date, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (owner_id, animal_id, id) DO UPDATE SET
            name = EXCLUDED.name,
            application_date = EXCLUDED.application_date,
            next_dose_date = EXCLUDED.next_dose_date,
            updated_at = EXCLUDED.updated_at
        WHERE vaccines.updated_at < EXCLUDED.updated_at
        RETURNING (xmax = 0)
        "#,
    )
    .bind(owner_id)
    .bind(vaccine.animal)
    .bind(vaccine.id)
    .bind(&vaccine.name)
    .bind(vaccine.application_date)
    .bind(vaccine.next_dose_date)
    .bind(vaccine.updated_at)
    .fetch_optional(pool)
    .await?;

    Ok(decision_from(row))
}

/// All vaccines of the given animals, ordered by animal then ID.
pub async fn list_vaccines_for(
    pool: &PgPool,
    owner_id: &str,
    animal_ids: &[Uuid],
) -> Result<Vec<VaccineRow>, sqlx::Error> {
    sqlx::query_as::<_, VaccineRow>(&format!(
        "{SELECT_VACCINES} WHERE owner_id = $1 AND animal_id = ANY($2) ORDER BY animal_id, id"
    ))
    .bind(owner_id)
    .bind(animal_ids)
    .fetch_all(pool)
    .await
}

/// Get a single vaccine by owner, animal and ID.
pub async fn get_vaccine(
    pool: &PgPool,
    owner_id: &str,
    animal_id: Uuid,
    id: Uuid,
) -> Result<Option<VaccineRow>, sqlx::Error> {
    sqlx::query_as::<_, VaccineRow>(&format!(
        "{SELECT_VACCINES} WHERE owner_id = $1 AND animal_id = $2 AND id = $3"
    ))
    .bind(owner_id)
    .bind(animal_id)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Insert a new vaccine.
pub async fn insert_vaccine(
    pool: &PgPool,
    owner_id: &str,
    vaccine: &Vaccine,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO vaccines
            (owner_id, animal_id, id, name, application_date, next_dose_date, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(owner_id)
    .bind(vaccine.animal)
    .bind(vaccine.id)
    .bind(&vaccine.name)
    .bind(vaccine.application_date)
    .bind(vaccine.next_dose_date)
    .bind(vaccine.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Overwrite an existing vaccine. Returns false if absent.
pub async fn update_vaccine(
    pool: &PgPool,
    owner_id: &str,
    vaccine: &Vaccine,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE vaccines
        SET name = $4, application_date = $5, next_dose_date = $6, updated_at = $7
        WHERE owner_id = $1 AND animal_id = $2 AND id = $3
        "#,
    )
    .bind(owner_id)
    .bind(vaccine.animal)
    .bind(vaccine.id)
    .bind(&vaccine.name)
    .bind(vaccine.application_date)
    .bind(vaccine.next_dose_date)
    .bind(vaccine.updated_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a vaccine. Returns false if absent.
pub async fn delete_vaccine(
    pool: &PgPool,
    owner_id: &str,
    animal_id: Uuid,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM vaccines WHERE owner_id = $1 AND animal_id = $2 AND id = $3")
            .bind(owner_id)
            .bind(animal_id)
            .bind(id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}
