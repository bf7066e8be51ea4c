//! Core storage logic for Stowage.
//!
//! This crate contains the object-storage client and the service facade
//! on top of it, with no web dependencies. The HTTP layer lives in
//! `stowage-api`.
//!
//! # Modules
//!
//! - `storage` - S3-compatible client, staging-file facade, errors

pub mod storage;
