//! S3-compatible object storage client.

use std::path::Path;
use std::time::Duration;

use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::operation::RequestId;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{debug, warn};

use super::config::StorageConfig;
use super::error::StorageError;

/// Typed operations against an S3-compatible store.
///
/// This trait is the seam between the facade and the remote provider;
/// tests implement it with an in-memory store.
pub trait ObjectStore: Send + Sync {
    /// Create a bucket, returning the provider's location string.
    fn create_bucket(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<String, StorageError>> + Send;

    /// Check whether a bucket exists. A provider-side 404 is `false`,
    /// any other failure surfaces as `Transport`.
    fn bucket_exists(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<bool, StorageError>> + Send;

    /// List all bucket names in the account, provider ordering verbatim.
    fn list_buckets(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, StorageError>> + Send;

    /// Upload the fully written file at `local_path` under `key`.
    /// Returns `Ok(true)` iff the provider reported success.
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
    ) -> impl std::future::Future<Output = Result<bool, StorageError>> + Send;

    /// Fetch an entire object into memory. A missing key is `NotFound`.
    fn get_object_bytes(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Bytes, StorageError>> + Send;

    /// Produce a signed URL allowing a direct PUT without credentials.
    fn presign_put(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> impl std::future::Future<Output = Result<String, StorageError>> + Send;

    /// Produce a signed URL allowing a direct GET without credentials.
    fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> impl std::future::Future<Output = Result<String, StorageError>> + Send;
}

/// `aws-sdk-s3` backed [`ObjectStore`].
///
/// Credentials, region, and endpoint are bound once at construction.
/// The client is cheap to clone and safe for concurrent use; retry and
/// timeout policy are whatever the SDK transport defaults to.
#[derive(Debug, Clone)]
pub struct S3Client {
    client: Client,
}

impl S3Client {
    /// Build a client from storage configuration.
    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "stowage",
        );

        let sdk_config = aws_sdk_s3::Config::builder()
            .behavior_version_latest()
            .endpoint_url(&config.endpoint)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(config.force_path_style)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
        }
    }
}

/// Format provider error metadata for logs and `Transport` messages.
fn provider_message(err: &(impl ProvideErrorMetadata + RequestId)) -> String {
    format!(
        "{}: {} (request id: {})",
        err.code().unwrap_or("unknown"),
        err.message().unwrap_or("no message"),
        err.request_id().unwrap_or("none"),
    )
}

impl ObjectStore for S3Client {
    async fn create_bucket(&self, name: &str) -> Result<String, StorageError> {
        match self.client.create_bucket().bucket(name).send().await {
            Ok(output) => {
                let location = output.location().unwrap_or_default().to_string();
                debug!(bucket = name, location = %location, "bucket created");
                Ok(location)
            }
            Err(err) => {
                let service_err = err.into_service_error();
                warn!(
                    bucket = name,
                    code = service_err.code().unwrap_or("unknown"),
                    request_id = service_err.request_id().unwrap_or("none"),
                    "create bucket failed"
                );
                if service_err.is_bucket_already_owned_by_you() {
                    Err(StorageError::bucket_already_owned(name))
                } else if service_err.is_bucket_already_exists() {
                    Err(StorageError::bucket_name_taken(name))
                } else {
                    Err(StorageError::transport(provider_message(&service_err)))
                }
            }
        }
    }

    async fn bucket_exists(&self, name: &str) -> Result<bool, StorageError> {
        match self.client.head_bucket().bucket(name).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    warn!(
                        bucket = name,
                        code = service_err.code().unwrap_or("unknown"),
                        request_id = service_err.request_id().unwrap_or("none"),
                        "head bucket failed"
                    );
                    Err(StorageError::transport(provider_message(&service_err)))
                }
            }
        }
    }

    async fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        let output = self.client.list_buckets().send().await.map_err(|err| {
            let service_err = err.into_service_error();
            warn!(
                code = service_err.code().unwrap_or("unknown"),
                request_id = service_err.request_id().unwrap_or("none"),
                "list buckets failed"
            );
            StorageError::transport(provider_message(&service_err))
        })?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name())
            .map(String::from)
            .collect())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
    ) -> Result<bool, StorageError> {
        // The staged file must be fully written and closed before this call.
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|err| StorageError::local_io(err.to_string()))?;

        match self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
        {
            Ok(output) => {
                debug!(
                    bucket,
                    key,
                    request_id = output.request_id().unwrap_or("none"),
                    "object uploaded"
                );
                Ok(true)
            }
            Err(err) => {
                let service_err = err.into_service_error();
                warn!(
                    bucket,
                    key,
                    code = service_err.code().unwrap_or("unknown"),
                    request_id = service_err.request_id().unwrap_or("none"),
                    "put object failed"
                );
                Ok(false)
            }
        }
    }

    async fn get_object_bytes(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let output = match self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() || service_err.code() == Some("NoSuchBucket") {
                    return Err(StorageError::not_found(format!("object '{key}'")));
                }
                warn!(
                    bucket,
                    key,
                    code = service_err.code().unwrap_or("unknown"),
                    request_id = service_err.request_id().unwrap_or("none"),
                    "get object failed"
                );
                return Err(StorageError::transport(provider_message(&service_err)));
            }
        };

        // Buffers the whole object; large objects belong behind a
        // presigned GET instead of this route.
        let aggregated = output
            .body
            .collect()
            .await
            .map_err(|err| StorageError::transport(err.to_string()))?;
        Ok(aggregated.into_bytes())
    }

    async fn presign_put(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|err| StorageError::validation(err.to_string()))?;

        let presigned = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|err| {
                let service_err = err.into_service_error();
                StorageError::transport(provider_message(&service_err))
            })?;

        Ok(presigned.uri().to_string())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|err| StorageError::validation(err.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|err| {
                let service_err = err.into_service_error();
                StorageError::transport(provider_message(&service_err))
            })?;

        Ok(presigned.uri().to_string())
    }
}
