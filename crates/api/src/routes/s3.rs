//! Object storage routes.
//!
//! The fixed routing table of the facade: bucket management, staged
//! upload/download, and presigned transfer URLs.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use stowage_core::storage::{ObjectStore, StorageError};
use tracing::error;

use crate::AppState;

/// Creates the `/s3` routes.
pub fn routes<S: ObjectStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/s3/create", post(create_bucket::<S>))
        .route("/s3/check/{bucket_name}", get(check_bucket::<S>))
        .route("/s3/list", get(list_buckets::<S>))
        .route("/s3/upload", post(upload_file::<S>))
        .route("/s3/download", post(download_file::<S>))
        .route("/s3/upload/presigned", post(presign_upload::<S>))
        .route("/s3/download/presigned", post(presign_download::<S>))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters naming a bucket.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketQuery {
    /// Target bucket name.
    pub bucket_name: String,
}

/// Query parameters naming an object.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectQuery {
    /// Target bucket name.
    pub bucket_name: String,
    /// Object key; may contain `/`.
    pub key: String,
}

/// Query parameters for a presigned URL request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignQuery {
    /// Target bucket name.
    pub bucket_name: String,
    /// Object key; may contain `/`.
    pub key: String,
    /// Signature validity in minutes.
    pub expiration: u64,
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Map a storage error onto a status code and plain-text body.
fn error_response(err: &StorageError) -> (StatusCode, String) {
    match err {
        StorageError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        StorageError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        StorageError::LocalIo(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error while processing file".to_string(),
        ),
        StorageError::UploadFailed { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "File upload to bucket failed".to_string(),
        ),
        StorageError::BucketAlreadyOwned { .. }
        | StorageError::BucketNameTaken { .. }
        | StorageError::Transport(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/s3/create?bucketName=...`
async fn create_bucket<S: ObjectStore>(
    State(state): State<AppState<S>>,
    Query(params): Query<BucketQuery>,
) -> Response {
    match state.facade.create_bucket(&params.bucket_name).await {
        Ok(message) => (StatusCode::OK, message).into_response(),
        Err(err) => {
            error!(bucket = %params.bucket_name, error = %err, "create bucket failed");
            error_response(&err).into_response()
        }
    }
}

/// GET `/s3/check/{bucketName}`
async fn check_bucket<S: ObjectStore>(
    State(state): State<AppState<S>>,
    Path(bucket_name): Path<String>,
) -> Response {
    match state.facade.check_bucket(&bucket_name).await {
        Ok(message) => (StatusCode::OK, message).into_response(),
        Err(err) => {
            error!(bucket = %bucket_name, error = %err, "check bucket failed");
            error_response(&err).into_response()
        }
    }
}

/// GET `/s3/list`
async fn list_buckets<S: ObjectStore>(State(state): State<AppState<S>>) -> Response {
    match state.facade.list_buckets().await {
        Ok(buckets) => (StatusCode::OK, Json(buckets)).into_response(),
        Err(err) => {
            error!(error = %err, "list buckets failed");
            error_response(&err).into_response()
        }
    }
}

/// POST `/s3/upload?bucketName=...&key=...` with multipart field `file`.
async fn upload_file<S: ObjectStore>(
    State(state): State<AppState<S>>,
    Query(params): Query<ObjectQuery>,
    mut multipart: Multipart,
) -> Response {
    let mut received = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(bytes) => received = Some((filename, bytes)),
                    Err(err) => {
                        return (StatusCode::BAD_REQUEST, format!("Malformed upload: {err}"))
                            .into_response();
                    }
                }
            }
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(err) => {
                return (StatusCode::BAD_REQUEST, format!("Malformed upload: {err}"))
                    .into_response();
            }
        }
    }

    let Some((filename, bytes)) = received else {
        return (
            StatusCode::BAD_REQUEST,
            "Missing multipart field: file".to_string(),
        )
            .into_response();
    };

    match state
        .facade
        .upload_file(&params.bucket_name, &params.key, &filename, bytes)
        .await
    {
        Ok(message) => (StatusCode::OK, message).into_response(),
        Err(err) => {
            error!(
                bucket = %params.bucket_name,
                key = %params.key,
                error = %err,
                "upload failed"
            );
            error_response(&err).into_response()
        }
    }
}

/// POST `/s3/download?bucketName=...&key=...`
async fn download_file<S: ObjectStore>(
    State(state): State<AppState<S>>,
    Query(params): Query<ObjectQuery>,
) -> Response {
    match state
        .facade
        .download_file(&params.bucket_name, &params.key)
        .await
    {
        Ok(message) => (StatusCode::OK, message).into_response(),
        Err(err) => {
            error!(
                bucket = %params.bucket_name,
                key = %params.key,
                error = %err,
                "download failed"
            );
            error_response(&err).into_response()
        }
    }
}

/// POST `/s3/upload/presigned?bucketName=...&key=...&expiration=minutes`
async fn presign_upload<S: ObjectStore>(
    State(state): State<AppState<S>>,
    Query(params): Query<PresignQuery>,
) -> Response {
    match state
        .facade
        .presign_upload(&params.bucket_name, &params.key, params.expiration)
        .await
    {
        Ok(url) => (StatusCode::OK, url).into_response(),
        Err(err) => {
            error!(
                bucket = %params.bucket_name,
                key = %params.key,
                error = %err,
                "presign upload failed"
            );
            error_response(&err).into_response()
        }
    }
}

/// POST `/s3/download/presigned?bucketName=...&key=...&expiration=minutes`
async fn presign_download<S: ObjectStore>(
    State(state): State<AppState<S>>,
    Query(params): Query<PresignQuery>,
) -> Response {
    match state
        .facade
        .presign_download(&params.bucket_name, &params.key, params.expiration)
        .await
    {
        Ok(url) => (StatusCode::OK, url).into_response(),
        Err(err) => {
            error!(
                bucket = %params.bucket_name,
                key = %params.key,
                error = %err,
                "presign download failed"
            );
            error_response(&err).into_response()
        }
    }
}
