//! # PawSync Engine
//!
//! Last-write-wins reconciliation for offline-first pet health records.
//!
//! Clients keep local copies of a three-level hierarchy (animals, their
//! medical events, their vaccines) and reconcile it with the server through
//! three operations: upload, download and check-for-updates. This crate holds
//! the pure parts of that protocol.
//!
//! ## Design Principles
//!
//! - **No IO**: The engine knows nothing about HTTP, databases or clocks
//! - **One rule**: Every component defers to the [`arbiter`] for ordering
//! - **Scoped**: Every lookup is keyed by owner (or owning animal), never by id alone
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! [`Animal`], [`Event`] and [`Vaccine`] each carry a client-assigned
//! identifier and an `updated_at` instant acting as a version marker.
//! Events and vaccines belong to exactly one animal.
//!
//! ### Timestamp Arbiter
//!
//! [`decide`] compares an existing `updated_at` (or its absence) with an
//! incoming one and returns a [`Decision`]: create, apply or discard.
//! Equal timestamps discard, so replaying a batch is idempotent.
//!
//! ### Payloads
//!
//! The [`payload`] module defines the wire shapes of the sync operations and
//! validates them before anything is persisted.
//!
//! ### Store
//!
//! [`Store`] is the reference in-memory entity store. Its conditional upserts
//! are atomic because they run under `&mut self`.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use pawsync_engine::{Animal, Decision, Store};
//! use uuid::Uuid;
//!
//! let mut store = Store::new();
//! let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
//!
//! let animal = Animal {
//!     id: Uuid::new_v4(),
//!     owner_id: "owner-1".to_string(),
//!     name: "Bolt".to_string(),
//!     kind: "Dog".to_string(),
//!     breed: "Husky".to_string(),
//!     date_of_birth: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
//!     updated_at: t0,
//! };
//!
//! assert_eq!(store.upsert_animal(animal.clone()), Decision::Create);
//! // Same version again: discarded.
//! assert_eq!(store.upsert_animal(animal), Decision::Discard);
//!
//! let counts = store.change_counts("owner-1", None);
//! assert_eq!(counts.animals, 1);
//! ```

pub mod arbiter;
pub mod error;
pub mod model;
pub mod payload;
pub mod store;

// Re-export main types at crate root
pub use arbiter::{changed_since, decide, normalize, Decision, Tally, UploadSummary};
pub use error::Error;
pub use model::{Animal, Event, PetTree, Vaccine};
pub use payload::{
    AnimalInput, AnimalPatch, CheckUpdatesResponse, CheckpointRequest, DownloadResponse,
    EventInput, EventPatch, EventPayload, PetPayload, UpdateCounts, UploadRequest, Validate,
    VaccineInput, VaccinePatch, VaccinePayload,
};
pub use store::Store;

/// Type aliases for clarity
pub type RecordId = uuid::Uuid;
pub type OwnerId = String;
pub type Timestamp = chrono::DateTime<chrono::Utc>;
