//! Authentication boundary.
//!
//! Every sync and record endpoint runs under a principal resolved from a
//! bearer token; nothing downstream looks at request headers.

mod middleware;
mod token;

pub use middleware::AuthUser;
pub use token::{issue_token, verify_token, Claims};
