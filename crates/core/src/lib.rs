//! Core ledger engine for Strata.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, strategies, and lifecycle operations
//! live here; persistence and chart provisioning are collaborator traits.
//!
//! # Modules
//!
//! - `chart` - Accounts, currencies, bridge accounts, chart directory
//! - `layer` - Ledger layer offsets and layer computation
//! - `ledger` - Layered double-entry transaction engine

pub mod chart;
pub mod layer;
pub mod ledger;
