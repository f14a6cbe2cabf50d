//! Chart of accounts domain.
//!
//! - Accounts and their normal side
//! - Currencies and their layer bands
//! - Bridge account resolution across ledger hierarchies
//! - The chart directory collaborator trait

pub mod account;
pub mod bridge;
pub mod currency;
pub mod directory;
pub mod error;

pub use account::{Account, AccountNormal, Chart};
pub use bridge::{BridgeAccounts, resolve_asset_bridge, resolve_bridges, resolve_liability_bridge};
pub use currency::{Currency, validate_layer_spacing};
pub use directory::{ChartDirectory, Journal, MemoryDirectory};
pub use error::ChartError;
