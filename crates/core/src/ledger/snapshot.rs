//! Balance snapshot maintenance.
//!
//! After every successful create, reverse, and complete, the lifecycle
//! hands the affected transactions to a [`SnapshotMaintainer`] so balance
//! reads never re-aggregate entries. The in-memory maintainer tracks the
//! latest balance per (account, base layer) and is idempotent per
//! transaction, so refreshes are safe to retry.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strata_shared::types::TransactionId;

use crate::chart::Currency;
use crate::layer::LayerId;
use crate::ledger::entry::EntrySide;
use crate::ledger::error::LedgerError;
use crate::ledger::transaction::GlTransaction;

/// Materialized latest balance for one account on one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// Account code.
    pub account: String,
    /// Layer the balance is materialized for.
    pub layer: LayerId,
    /// Account currency.
    pub currency: String,
    /// Latest balance, signed by the account's normal side.
    pub balance: Decimal,
}

/// Refreshes materialized balances after a posted transaction.
pub trait SnapshotMaintainer {
    /// Applies the balance effect of a fully posted transaction.
    ///
    /// Implementations must be idempotent per transaction: refreshing the
    /// same transaction twice leaves balances unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error when the transaction references an unknown
    /// currency.
    fn update_snapshots_after_transaction(
        &mut self,
        transaction: &GlTransaction,
    ) -> Result<(), LedgerError>;
}

/// In-memory snapshot maintainer over a known currency set.
#[derive(Debug, Default)]
pub struct MemorySnapshotMaintainer {
    base_layers: BTreeMap<String, LayerId>,
    snapshots: BTreeMap<(String, LayerId), BalanceSnapshot>,
    applied: BTreeSet<TransactionId>,
}

impl MemorySnapshotMaintainer {
    /// Creates a maintainer over the configured currencies.
    ///
    /// # Errors
    ///
    /// Returns a chart error when a currency's numeric code cannot serve as
    /// a base layer.
    pub fn new<'a>(
        currencies: impl IntoIterator<Item = &'a Currency>,
    ) -> Result<Self, LedgerError> {
        let mut base_layers = BTreeMap::new();
        for currency in currencies {
            base_layers.insert(currency.name.clone(), currency.base_layer()?);
        }
        Ok(Self {
            base_layers,
            snapshots: BTreeMap::new(),
            applied: BTreeSet::new(),
        })
    }

    /// The latest base-layer balance for an account, if materialized.
    #[must_use]
    pub fn latest_balance(&self, account: &str, layer: LayerId) -> Option<Decimal> {
        self.snapshots
            .get(&(account.to_string(), layer))
            .map(|s| s.balance)
    }

    /// All materialized snapshots, in (account, layer) order.
    pub fn snapshots(&self) -> impl Iterator<Item = &BalanceSnapshot> {
        self.snapshots.values()
    }
}

impl SnapshotMaintainer for MemorySnapshotMaintainer {
    fn update_snapshots_after_transaction(
        &mut self,
        transaction: &GlTransaction,
    ) -> Result<(), LedgerError> {
        if !self.applied.insert(transaction.id) {
            return Ok(());
        }

        for entry in &transaction.entries {
            let base = self
                .base_layers
                .get(&entry.account.currency)
                .copied()
                .ok_or_else(|| LedgerError::CurrencyNotFound(entry.account.currency.clone()))?;

            // Only base-layer postings move the materialized balance;
            // pending/hold/limit layers are working storage.
            if entry.layer != base {
                continue;
            }

            let (debit, credit) = match entry.side {
                EntrySide::Debit => (entry.amount, Decimal::ZERO),
                EntrySide::Credit => (Decimal::ZERO, entry.amount),
            };
            let change = entry.account.normal.balance_change(debit, credit);

            let snapshot = self
                .snapshots
                .entry((entry.account.code.clone(), base))
                .or_insert_with(|| BalanceSnapshot {
                    account: entry.account.code.clone(),
                    layer: base,
                    currency: entry.account.currency.clone(),
                    balance: Decimal::ZERO,
                });
            snapshot.balance += change;
        }
        Ok(())
    }
}
