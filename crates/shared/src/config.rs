//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Object storage configuration.
    pub storage: StorageSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Object storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Static access key ID.
    pub access_key: String,
    /// Static secret access key.
    pub secret_key: String,
    /// Region identifier (e.g. `us-east-1`).
    pub region: String,
    /// S3-compatible endpoint URL. The original service hardcoded the
    /// AWS endpoint; here it is overridable for MinIO, Ceph RGW, etc.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Local staging directory for upload/download files.
    pub staging_dir: String,
    /// Use path-style addressing (required by most MinIO setups).
    #[serde(default)]
    pub force_path_style: bool,
}

fn default_endpoint() -> String {
    "https://s3.us-east-1.amazonaws.com".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("STOWAGE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
