//! Request extractors that reject with [`AppError`].
//!
//! Axum's own `Json` and `Path` reject with plain-text bodies and, for JSON
//! data errors, status 422. These wrappers turn every shape error into a 400
//! with the serde field path in `details`.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON body extractor.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path parameter extractor.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
