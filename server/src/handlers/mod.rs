//! Request handlers for sync and record operations.
//!
//! Handlers take the store as `&dyn EntityStore` and the already
//! authenticated owner; routing and extraction live in `routes`.

mod check;
mod download;
pub mod records;
mod upload;

pub use check::*;
pub use download::*;
pub use upload::*;
