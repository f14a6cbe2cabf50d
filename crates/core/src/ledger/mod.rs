//! Layered double-entry transaction engine.
//!
//! This module implements the ledger core:
//! - Ledger entries and entry specs
//! - The transaction aggregate with per-layer balance
//! - Transaction context assembly
//! - Entry strategies and total dispatch
//! - The entry spec executor
//! - Request validation
//! - The persistence and snapshot collaborator traits
//! - The create / reverse / complete lifecycle
//!
//! # Concurrency
//!
//! Every lifecycle operation executes inside a single atomic storage
//! boundary: the store either durably posts all entries of an operation or
//! none. Concurrent invocations on the same reference are expected to be
//! serialized by the underlying storage (row-level locking, read-committed
//! or stronger); the engine itself is synchronous and request-driven.

pub mod context;
pub mod entry;
pub mod error;
pub mod executor;
pub mod movement;
pub mod repository;
pub mod service;
pub mod snapshot;
pub mod store;
pub mod strategy;
pub mod transaction;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod strategy_props;

pub use context::{EntryPayload, TransactionContext};
pub use entry::{EntrySide, EntrySpec, GlEntry};
pub use error::LedgerError;
pub use executor::EntrySpecExecutor;
pub use movement::MovementPrinter;
pub use repository::LedgerRepository;
pub use service::TransactionService;
pub use snapshot::{BalanceSnapshot, MemorySnapshotMaintainer, SnapshotMaintainer};
pub use store::{MemoryStore, TransactionStore};
pub use strategy::{DispatchKey, EntryStrategy, StrategyRegistry};
pub use transaction::{GlTransaction, TransactionState};
pub use types::{
    CreateTransactionRequest, EntryKind, EntryRequest, TransactionDetail, TransactionGroup,
    TransactionLimit,
};
pub use validation::{CompositeValidator, TransactionValidator, ValidationContext};
