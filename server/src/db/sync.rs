//! Checkpoint queries behind download and check-updates.

use std::collections::HashMap;

use pawsync_engine::{Animal, Event, PetTree, Timestamp, UpdateCounts, Vaccine};
use sqlx::PgPool;
use uuid::Uuid;

use super::{list_events_for, list_vaccines_for, AnimalRow};

/// Animals of `owner_id` whose subtree changed after `since`.
///
/// An animal qualifies when it, or any of its events or vaccines, has
/// `updated_at > since`. A null `since` selects every animal.
pub async fn changed_animals(
    pool: &PgPool,
    owner_id: &str,
    since: Option<Timestamp>,
) -> Result<Vec<AnimalRow>, sqlx::Error> {
    sqlx::query_as::<_, AnimalRow>(
        r#"
        SELECT a.owner_id, a.id, a.name, a.kind, a.breed, a.date_of_birth, a.updated_at
        FROM animals a
        WHERE a.owner_id = $1
          AND (
            $2::timestamptz IS NULL
            OR a.updated_at > $2
            OR EXISTS (
                SELECT 1 FROM events e
                WHERE e.owner_id = a.owner_id AND e.animal_id = a.id AND e.updated_at > $2
            )
            OR EXISTS (
                SELECT 1 FROM vaccines v
                WHERE v.owner_id = a.owner_id AND v.animal_id = a.id AND v.updated_at > $2
            )
          )
        ORDER BY a.id
        "#,
    )
    .bind(owner_id)
    .bind(since)
    .fetch_all(pool)
    .await
}

/// Attach the complete event and vaccine lists to each animal.
pub async fn load_trees(
    pool: &PgPool,
    owner_id: &str,
    animals: Vec<AnimalRow>,
) -> Result<Vec<PetTree>, sqlx::Error> {
    if animals.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = animals.iter().map(|a| a.id).collect();

    let mut events: HashMap<Uuid, Vec<Event>> = HashMap::new();
    for row in list_events_for(pool, owner_id, &ids).await? {
        events.entry(row.animal_id).or_default().push(row.into());
    }

    let mut vaccines: HashMap<Uuid, Vec<Vaccine>> = HashMap::new();
    for row in list_vaccines_for(pool, owner_id, &ids).await? {
        vaccines.entry(row.animal_id).or_default().push(row.into());
    }

    Ok(animals
        .into_iter()
        .map(|row| {
            let animal = Animal::from(row);
            PetTree {
                events: events.remove(&animal.id).unwrap_or_default(),
                vaccines: vaccines.remove(&animal.id).unwrap_or_default(),
                animal,
            }
        })
        .collect())
}

/// Count each kind independently by its own `updated_at`.
pub async fn change_counts(
    pool: &PgPool,
    owner_id: &str,
    since: Option<Timestamp>,
) -> Result<UpdateCounts, sqlx::Error> {
    let (animals, events, vaccines) = sqlx::query_as::<_, (i64, i64, i64)>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM animals
              WHERE owner_id = $1 AND ($2::timestamptz IS NULL OR updated_at > $2)),
            (SELECT COUNT(*) FROM events
              WHERE owner_id = $1 AND ($2::timestamptz IS NULL OR updated_at > $2)),
            (SELECT COUNT(*) FROM vaccines
              WHERE owner_id = $1 AND ($2::timestamptz IS NULL OR updated_at > $2))
        "#,
    )
    .bind(owner_id)
    .bind(since)
    .fetch_one(pool)
    .await?;

    Ok(UpdateCounts {
        animals: animals as u64,
        events: events as u64,
        vaccines: vaccines as u64,
    })
}
