//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Invalid caller input (empty bucket, key, file, bad duration).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Bucket or object absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bucket already exists and is owned by this account.
    #[error("Bucket already owned by you: {bucket}")]
    BucketAlreadyOwned {
        /// The bucket name.
        bucket: String,
    },

    /// Bucket name taken by another account.
    #[error("Bucket name already taken: {bucket}")]
    BucketNameTaken {
        /// The bucket name.
        bucket: String,
    },

    /// Network failure or provider-side 5xx.
    #[error("Storage provider error: {0}")]
    Transport(String),

    /// Staging-file read/write failure on local disk.
    #[error("Local I/O error: {0}")]
    LocalIo(String),

    /// The provider did not accept the object.
    #[error("Upload to bucket '{bucket}' failed for key '{key}'")]
    UploadFailed {
        /// Target bucket.
        bucket: String,
        /// Target object key.
        key: String,
    },
}

impl StorageError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a bucket-already-owned error.
    #[must_use]
    pub fn bucket_already_owned(bucket: impl Into<String>) -> Self {
        Self::BucketAlreadyOwned {
            bucket: bucket.into(),
        }
    }

    /// Create a bucket-name-taken error.
    #[must_use]
    pub fn bucket_name_taken(bucket: impl Into<String>) -> Self {
        Self::BucketNameTaken {
            bucket: bucket.into(),
        }
    }

    /// Create a transport error.
    #[must_use]
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a local I/O error.
    #[must_use]
    pub fn local_io(msg: impl Into<String>) -> Self {
        Self::LocalIo(msg.into())
    }

    /// Create an upload-failed error.
    #[must_use]
    pub fn upload_failed(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::UploadFailed {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}
