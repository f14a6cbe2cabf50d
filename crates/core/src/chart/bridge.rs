//! Bridge (clearing) account resolution.
//!
//! A bridge account is a final account that clears postings between two
//! ledger hierarchies so a cross-hierarchy transfer stays balanced without
//! touching unrelated hierarchies. Resolution is a pure function of
//! `(account, chart)`: the same inputs always produce the same pair, which
//! completion relies on to land on the accounts creation used.

use serde::{Deserialize, Serialize};

use crate::chart::account::{Account, Chart};
use crate::chart::error::ChartError;

/// Description prefix marking asset-side bridge accounts.
pub const ASSET_BRIDGE_PREFIX: &str = "bridge-assets-";
/// Description prefix marking liability-side bridge accounts.
pub const LIABILITY_BRIDGE_PREFIX: &str = "bridge-liabilities-";

/// The bridge pair resolved for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeAccounts {
    /// Asset-side clearing account.
    pub asset: Account,
    /// Liability-side clearing account.
    pub liability: Account,
}

/// Resolves the asset-side bridge for an account within a chart.
///
/// Accounts are scanned in code order, so resolution is deterministic even
/// if a chart carries more than one bridge per currency.
///
/// # Errors
///
/// Returns [`ChartError::BridgeNotFound`] when the chart has no asset
/// bridge for the account's currency.
pub fn resolve_asset_bridge(account: &Account, chart: &Chart) -> Result<Account, ChartError> {
    resolve_side(account, chart, ASSET_BRIDGE_PREFIX, "asset")
}

/// Resolves the liability-side bridge for an account within a chart.
///
/// # Errors
///
/// Returns [`ChartError::BridgeNotFound`] when the chart has no liability
/// bridge for the account's currency.
pub fn resolve_liability_bridge(account: &Account, chart: &Chart) -> Result<Account, ChartError> {
    resolve_side(account, chart, LIABILITY_BRIDGE_PREFIX, "liability")
}

/// Resolves both bridge sides for an account.
///
/// # Errors
///
/// Returns [`ChartError::BridgeNotFound`] when either side is missing.
pub fn resolve_bridges(account: &Account, chart: &Chart) -> Result<BridgeAccounts, ChartError> {
    Ok(BridgeAccounts {
        asset: resolve_asset_bridge(account, chart)?,
        liability: resolve_liability_bridge(account, chart)?,
    })
}

fn resolve_side(
    account: &Account,
    chart: &Chart,
    prefix: &str,
    side: &'static str,
) -> Result<Account, ChartError> {
    let wanted = format!("{prefix}{}", account.currency);
    chart
        .final_accounts()
        .find(|candidate| candidate.description == wanted)
        .cloned()
        .ok_or_else(|| ChartError::BridgeNotFound {
            account: account.code.clone(),
            currency: account.currency.clone(),
            side,
        })
}
