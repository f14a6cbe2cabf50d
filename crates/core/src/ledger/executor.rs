//! Entry spec execution.
//!
//! The executor is the only path from specs to attached entries. It checks
//! the per-layer balance of the spec set *before* attaching anything: a
//! strategy that under- or over-posts is rejected, never adjusted.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::layer::LayerId;
use crate::ledger::entry::{EntrySide, EntrySpec};
use crate::ledger::error::LedgerError;
use crate::ledger::transaction::GlTransaction;

/// Materializes entry specs onto a transaction.
pub struct EntrySpecExecutor;

impl EntrySpecExecutor {
    /// Verifies the spec set balances per layer, then attaches every spec
    /// as an entry of `transaction`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SpecsUnbalanced`] naming the first layer on
    /// which the specs do not balance; the transaction is left untouched.
    pub fn execute(
        transaction: &mut GlTransaction,
        specs: Vec<EntrySpec>,
    ) -> Result<(), LedgerError> {
        Self::verify_balanced(&specs)?;

        for spec in specs {
            let entry = transaction.create_entry(
                spec.account,
                spec.amount,
                spec.detail,
                spec.side,
                spec.layer,
            );
            entry.tags = spec.tags;
        }
        Ok(())
    }

    /// Checks the per-layer balance law over a spec set.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SpecsUnbalanced`] for the first unbalanced
    /// layer.
    pub fn verify_balanced(specs: &[EntrySpec]) -> Result<(), LedgerError> {
        let mut totals: BTreeMap<LayerId, (Decimal, Decimal)> = BTreeMap::new();
        for spec in specs {
            let entry = totals.entry(spec.layer).or_default();
            match spec.side {
                EntrySide::Debit => entry.0 += spec.amount,
                EntrySide::Credit => entry.1 += spec.amount,
            }
        }

        for (layer, (debits, credits)) in totals {
            if debits != credits {
                return Err(LedgerError::SpecsUnbalanced {
                    layer,
                    debits,
                    credits,
                });
            }
        }
        Ok(())
    }
}
