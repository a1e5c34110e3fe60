//! Edge case tests for pawsync-engine
//!
//! These tests drive the public store API directly: conditional upserts in,
//! subtree selection and per-kind counts out.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use pawsync_engine::{
    Animal, Decision, Error, Event, PetPayload, Store, Timestamp, UpdateCounts, Vaccine,
};
use proptest::prelude::*;
use serde_json::json;
use uuid::Uuid;

const OWNER: &str = "owner-1";

fn base() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn animal(id: u128, name: &str, updated_at: Timestamp) -> Animal {
    Animal {
        id: Uuid::from_u128(id),
        owner_id: OWNER.to_string(),
        name: name.to_string(),
        kind: "Dog".to_string(),
        breed: "Husky".to_string(),
        date_of_birth: day(2020, 1, 1),
        updated_at,
    }
}

fn event(animal: u128, id: u128, updated_at: Timestamp) -> Event {
    Event {
        id: Uuid::from_u128(id),
        animal: Uuid::from_u128(animal),
        kind: "Consulta".to_string(),
        date: day(2023, 1, 1),
        observation: Some("Primeira consulta".to_string()),
        updated_at,
    }
}

fn vaccine(animal: u128, id: u128, updated_at: Timestamp) -> Vaccine {
    Vaccine {
        id: Uuid::from_u128(id),
        animal: Uuid::from_u128(animal),
        name: "V10".to_string(),
        application_date: day(2023, 1, 1),
        next_dose_date: Some(day(2024, 1, 1)),
        updated_at,
    }
}

// ============================================================================
// Conditional upserts
// ============================================================================

#[test]
fn upsert_on_empty_store_creates_exact_fields() {
    let mut store = Store::new();
    assert_eq!(store.upsert_animal(animal(1, "Bolt", base())), Decision::Create);

    let stored = store.get_animal(OWNER, Uuid::from_u128(1)).unwrap();
    assert_eq!(stored.name, "Bolt");
    assert_eq!(stored.kind, "Dog");
    assert_eq!(stored.breed, "Husky");
    assert_eq!(stored.date_of_birth.to_string(), "2020-01-01");
    assert_eq!(stored.updated_at, base());
}

#[test]
fn older_write_keeps_newer_name() {
    let mut store = Store::new();
    store.upsert_animal(animal(1, "Current", base()));
    let decision = store.upsert_animal(animal(1, "Stale", base() - Duration::seconds(1)));

    assert_eq!(decision, Decision::Discard);
    assert_eq!(store.get_animal(OWNER, Uuid::from_u128(1)).unwrap().name, "Current");
}

#[test]
fn children_land_under_their_pet() {
    let mut store = Store::new();
    store.upsert_animal(animal(1, "Rex", base()));

    assert_eq!(store.upsert_event(OWNER, event(1, 10, base())), Ok(Decision::Create));
    assert_eq!(store.upsert_vaccine(OWNER, vaccine(1, 20, base())), Ok(Decision::Create));

    let tree = store.get_pet(OWNER, Uuid::from_u128(1)).unwrap();
    assert_eq!(tree.events[0].animal, Uuid::from_u128(1));
    assert_eq!(tree.events[0].observation.as_deref(), Some("Primeira consulta"));
    assert_eq!(tree.vaccines[0].next_dose_date, Some(day(2024, 1, 1)));
}

#[test]
fn child_reconciles_after_its_pet_was_discarded() {
    let mut store = Store::new();
    store.upsert_animal(animal(1, "Rex", base()));

    let stale = store.upsert_animal(animal(1, "Stale", base() - Duration::days(1)));
    let child = store.upsert_event(OWNER, event(1, 10, base()));

    assert_eq!(stale, Decision::Discard);
    assert_eq!(child, Ok(Decision::Create));
    assert_eq!(store.list_events(OWNER, Uuid::from_u128(1)).unwrap().len(), 1);
}

#[test]
fn child_of_another_owners_pet_is_not_found() {
    let mut store = Store::new();
    store.upsert_animal(animal(1, "Rex", base()));

    let err = store.upsert_event("owner-2", event(1, 10, base())).unwrap_err();
    assert_eq!(err, Error::AnimalNotFound(Uuid::from_u128(1)));
}

#[test]
fn unicode_names_survive() {
    let mut store = Store::new();
    let names = ["Café", "ポチ", "Шарик", "🐶 Rex"];
    for (i, name) in names.iter().enumerate() {
        store.upsert_animal(animal(i as u128 + 1, name, base()));
    }

    for (i, name) in names.iter().enumerate() {
        let stored = store.get_animal(OWNER, Uuid::from_u128(i as u128 + 1)).unwrap();
        assert_eq!(stored.name, *name);
    }
}

// ============================================================================
// Read paths
// ============================================================================

#[test]
fn round_trip_through_checkpoint() {
    let mut store = Store::new();
    store.upsert_animal(animal(1, "Rex", base()));

    let before = store.changed_pets(OWNER, Some(base() - Duration::seconds(1)));
    assert_eq!(before.len(), 1);

    assert!(store.changed_pets(OWNER, Some(base())).is_empty());
    assert!(store.changed_pets(OWNER, Some(base() + Duration::seconds(1))).is_empty());
}

#[test]
fn subtree_versus_per_kind_asymmetry() {
    let mut store = Store::new();
    store.upsert_animal(animal(1, "A", base()));
    store
        .upsert_event(OWNER, event(1, 10, base() + Duration::seconds(1)))
        .unwrap();
    store.upsert_vaccine(OWNER, vaccine(1, 20, base())).unwrap();

    assert_eq!(
        store.change_counts(OWNER, Some(base())),
        UpdateCounts {
            animals: 0,
            events: 1,
            vaccines: 0
        }
    );

    let pets = store.changed_pets(OWNER, Some(base()));
    assert_eq!(pets.len(), 1);
    assert_eq!(pets[0].events.len(), 1);
    // Unchanged vaccine is still part of the full aggregate.
    assert_eq!(pets[0].vaccines.len(), 1);
}

#[test]
fn future_checkpoint_is_empty_not_an_error() {
    let mut store = Store::new();
    store.upsert_animal(animal(1, "Rex", base()));

    let future = base() + Duration::days(365);
    assert!(store.changed_pets(OWNER, Some(future)).is_empty());
    assert_eq!(store.change_counts(OWNER, Some(future)), UpdateCounts::default());
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_larger_version_wins_in_either_order(a in 0i64..10_000, b in 0i64..10_000) {
        let first = animal(1, "first", base() + Duration::seconds(a));
        let second = animal(1, "second", base() + Duration::seconds(b));

        let mut forward = Store::new();
        forward.upsert_animal(first.clone());
        forward.upsert_animal(second.clone());

        let mut backward = Store::new();
        backward.upsert_animal(second);
        backward.upsert_animal(first);

        let expected = base() + Duration::seconds(a.max(b));
        let f = forward.get_animal(OWNER, Uuid::from_u128(1)).unwrap();
        let r = backward.get_animal(OWNER, Uuid::from_u128(1)).unwrap();
        prop_assert_eq!(f.updated_at, expected);
        prop_assert_eq!(r.updated_at, expected);
        if a != b {
            prop_assert_eq!(&f.name, &r.name);
        }
    }

    #[test]
    fn prop_payload_timestamps_keep_microseconds(nanos in 0u32..1_000_000_000) {
        let at = base() + Duration::nanoseconds(nanos as i64);
        let payload: PetPayload = serde_json::from_value(json!({
            "id": Uuid::from_u128(1),
            "name": "Rex",
            "type": "Dog",
            "breed": "Husky",
            "date_of_birth": "2020-01-01",
            "updated_at": at,
        }))
        .unwrap();

        let stored = payload.to_animal(&OWNER.to_string()).updated_at;
        prop_assert_eq!(stored.timestamp_subsec_nanos() % 1_000, 0);
        prop_assert_eq!(stored.timestamp_subsec_micros(), nanos / 1_000);
    }
}
