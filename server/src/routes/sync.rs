//! Sync endpoint routes.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use pawsync_engine::{CheckUpdatesResponse, CheckpointRequest, DownloadResponse, UploadRequest};

use crate::auth::AuthUser;
use crate::error::Result;
use crate::extract::AppJson;
use crate::handlers::{handle_check_updates, handle_download, handle_upload};
use crate::AppState;

/// Create sync routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sync/upload", post(upload_handler))
        .route("/sync/download", post(download_handler))
        .route("/sync/check-updates", post(check_updates_handler))
}

/// POST /sync/upload - Reconcile a batch of pets. The body is empty on success.
async fn upload_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(request): AppJson<UploadRequest>,
) -> Result<StatusCode> {
    handle_upload(state.store.as_ref(), &auth.owner_id, request).await?;
    Ok(StatusCode::OK)
}

/// POST /sync/download - Pets changed since the checkpoint.
async fn download_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(request): AppJson<CheckpointRequest>,
) -> Result<Json<DownloadResponse>> {
    let response = handle_download(state.store.as_ref(), &auth.owner_id, request).await?;
    Ok(Json(response))
}

/// POST /sync/check-updates - Per-kind change counts since the checkpoint.
async fn check_updates_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(request): AppJson<CheckpointRequest>,
) -> Result<Json<CheckUpdatesResponse>> {
    let response = handle_check_updates(state.store.as_ref(), &auth.owner_id, request).await?;
    Ok(Json(response))
}
