//! Storage configuration types.

use std::path::PathBuf;

/// Immutable storage configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Static access key ID.
    pub access_key: String,
    /// Static secret access key.
    pub secret_key: String,
    /// Region identifier.
    pub region: String,
    /// S3-compatible endpoint URL.
    pub endpoint: String,
    /// Local staging directory for upload/download files.
    pub staging_dir: PathBuf,
    /// Use path-style addressing (required by most MinIO setups).
    pub force_path_style: bool,
}

impl StorageConfig {
    /// Default endpoint, matching the original service's fixed value.
    pub const DEFAULT_ENDPOINT: &'static str = "https://s3.us-east-1.amazonaws.com";

    /// SigV4 signing limit: presigned URLs live at most 7 days.
    pub const MAX_PRESIGN_MINUTES: u64 = 7 * 24 * 60;

    /// Create a new storage config with the default AWS endpoint.
    #[must_use]
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        region: impl Into<String>,
        staging_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region: region.into(),
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            staging_dir: staging_dir.into(),
            force_path_style: false,
        }
    }

    /// Override the endpoint (MinIO, Ceph RGW, custom gateways).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Enable or disable path-style addressing.
    #[must_use]
    pub fn with_path_style(mut self, enabled: bool) -> Self {
        self.force_path_style = enabled;
        self
    }
}
