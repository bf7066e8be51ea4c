//! Object storage client and facade.
//!
//! Two layers on top of any S3-compatible endpoint (AWS S3, MinIO,
//! Ceph RGW):
//!
//! - [`S3Client`] - a thin typed adapter over `aws-sdk-s3`, one remote
//!   call per operation, credentials bound once at construction.
//! - [`StorageFacade`] - input validation, staging-directory handling,
//!   and user-facing message shaping for the HTTP layer.
//!
//! The seam between them is the [`ObjectStore`] trait so the facade can
//! be exercised against an in-memory store in tests.

mod client;
mod config;
mod error;
mod facade;

pub use client::{ObjectStore, S3Client};
pub use config::StorageConfig;
pub use error::StorageError;
pub use facade::StorageFacade;
