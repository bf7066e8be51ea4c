//! Shared configuration for Stowage.
//!
//! This crate provides the application configuration loaded at startup
//! and handed to the storage and API layers as immutable values.

pub mod config;

pub use config::{AppConfig, ServerConfig, StorageSettings};
