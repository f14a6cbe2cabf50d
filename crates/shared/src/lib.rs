//! Shared types, errors, and configuration for Strata.
//!
//! This crate provides common types used across all other crates:
//! - Money types with decimal precision
//! - Typed IDs for type-safe entity references
//! - Tag bags for boundary metadata encoding
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod tags;
pub mod types;

pub use config::EngineConfig;
pub use error::{SharedError, SharedResult};
pub use tags::Tags;
