//! Accounts and charts.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strata_shared::Tags;

use crate::chart::bridge::{ASSET_BRIDGE_PREFIX, LIABILITY_BRIDGE_PREFIX};

/// The normal side of an account.
///
/// - Debit-normal accounts (assets, expenses) grow when debited.
/// - Credit-normal accounts (liabilities, equity, revenue) grow when credited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountNormal {
    /// Debit-normal account.
    Debit,
    /// Credit-normal account.
    Credit,
}

impl AccountNormal {
    /// Balance change produced by a (debit, credit) pair on this side.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// A final (postable) account.
///
/// Composite accounts exist only as chart roots; every posting entry
/// references a final account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account code.
    pub code: String,
    /// Human-readable description. Bridge accounts are identified by a
    /// `bridge-assets-<CUR>` / `bridge-liabilities-<CUR>` description.
    pub description: String,
    /// ISO 4217 alpha currency code.
    pub currency: String,
    /// Normal side.
    pub normal: AccountNormal,
    /// Free-form markers (e.g. `type:EXPENSE`, `account_name:...`).
    pub tags: Tags,
    /// Code of the chart (composite root) this account belongs to.
    pub chart: String,
}

impl Account {
    /// Creates an account with empty tags.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        currency: impl Into<String>,
        normal: AccountNormal,
        chart: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            currency: currency.into(),
            normal,
            tags: Tags::new(),
            chart: chart.into(),
        }
    }

    /// True if this account is a bridge (clearing) account of either side.
    #[must_use]
    pub fn is_bridge(&self) -> bool {
        self.is_asset_bridge() || self.is_liability_bridge()
    }

    /// True if this account is an asset-side bridge.
    #[must_use]
    pub fn is_asset_bridge(&self) -> bool {
        self.description.starts_with(ASSET_BRIDGE_PREFIX)
    }

    /// True if this account is a liability-side bridge.
    #[must_use]
    pub fn is_liability_bridge(&self) -> bool {
        self.description.starts_with(LIABILITY_BRIDGE_PREFIX)
    }
}

/// A chart of accounts: the composite root of a ledger hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chart {
    /// Unique chart code.
    pub code: String,
    /// Human-readable description.
    pub description: String,
    /// Final accounts by code.
    pub accounts: BTreeMap<String, Account>,
}

impl Chart {
    /// Creates an empty chart.
    #[must_use]
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            accounts: BTreeMap::new(),
        }
    }

    /// Adds a final account to the chart.
    pub fn add_account(&mut self, account: Account) {
        self.accounts.insert(account.code.clone(), account);
    }

    /// Looks up a final account by code.
    #[must_use]
    pub fn account(&self, code: &str) -> Option<&Account> {
        self.accounts.get(code)
    }

    /// Iterates final accounts in code order.
    pub fn final_accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }
}
