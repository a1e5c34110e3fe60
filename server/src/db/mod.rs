//! Database module for PostgreSQL persistence.

mod animals;
mod events;
mod sync;
mod vaccines;

pub use animals::*;
pub use events::*;
pub use sync::*;
pub use vaccines::*;

use pawsync_engine::Decision;

/// Interpret the `RETURNING (xmax = 0)` row of a conditional upsert.
///
/// No row means the `WHERE` guard rejected the update. `xmax = 0` holds only
/// for freshly inserted tuples.
pub(crate) fn decision_from(row: Option<(bool,)>) -> Decision {
    match row {
        None => Decision::Discard,
        Some((true,)) => Decision::Create,
        Some((false,)) => Decision::Apply,
    }
}

/// Check if a SQL error is a unique constraint violation.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    has_code(e, "23505")
}

/// Check if a SQL error is a foreign key violation.
pub(crate) fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    has_code(e, "23503")
}

fn has_code(e: &sqlx::Error, code: &str) -> bool {
    if let sqlx::Error::Database(db_err) = e {
        db_err.code().map(|c| c == code).unwrap_or(false)
    } else {
        false
    }
}
