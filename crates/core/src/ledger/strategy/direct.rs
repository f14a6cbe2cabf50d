//! Direct (non-pending) transfers.

use crate::layer::LayerKind;
use crate::ledger::context::EntryPayload;
use crate::ledger::entry::{EntrySide, EntrySpec};
use crate::ledger::error::LedgerError;
use crate::ledger::strategy::{DispatchKey, EntryStrategy};
use crate::ledger::types::EntryKind;

/// Posts a transfer straight onto the base layer, plus daily and cumulative
/// limit tracking for principal amounts.
pub struct DirectStrategy;

impl EntryStrategy for DirectStrategy {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn handles(&self, key: &DispatchKey) -> bool {
        !key.is_pending
    }

    fn create_entries(&self, payload: &EntryPayload) -> Result<Vec<EntrySpec>, LedgerError> {
        let base = payload.base_layer()?;
        let amount = payload.entry.amount.amount;
        let detail = &payload.entry.detail;

        let mut specs = vec![
            EntrySpec::new(
                payload.debit_account.clone(),
                amount,
                EntrySide::Debit,
                base,
                detail,
            ),
            EntrySpec::new(
                payload.credit_account.clone(),
                amount,
                EntrySide::Credit,
                base,
                detail,
            ),
        ];

        specs.extend(self.limit_entries(payload)?);
        Ok(specs)
    }
}

impl DirectStrategy {
    /// Limit tracking entries: the debit account's daily and cumulative
    /// limit layers accumulate every principal amount it sends.
    ///
    /// Skipped for non-principal entries, explicit opt-outs, and bridge
    /// account debits (clearing traffic is not subject to limits).
    fn limit_entries(&self, payload: &EntryPayload) -> Result<Vec<EntrySpec>, LedgerError> {
        if payload.entry.kind != EntryKind::Amount || payload.entry.skip_limits {
            return Ok(Vec::new());
        }
        if payload.debit_account.is_bridge() {
            return Ok(Vec::new());
        }
        let Some(bridge_asset) = payload.bridge_asset.clone() else {
            return Ok(Vec::new());
        };

        let base = payload.base_layer()?;
        let amount = payload.entry.amount.amount;
        let daily = LayerKind::DailyLimit.layer(base);
        let cumulative = LayerKind::CumulativeLimit.layer(base);
        let detail = "transaction_limit";

        Ok(vec![
            EntrySpec::new(
                bridge_asset.clone(),
                amount,
                EntrySide::Debit,
                daily,
                detail,
            ),
            EntrySpec::new(
                payload.debit_account.clone(),
                amount,
                EntrySide::Credit,
                daily,
                detail,
            ),
            EntrySpec::new(bridge_asset, amount, EntrySide::Debit, cumulative, detail),
            EntrySpec::new(
                payload.debit_account.clone(),
                amount,
                EntrySide::Credit,
                cumulative,
                detail,
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Account, AccountNormal, Currency};
    use crate::ledger::types::EntryRequest;
    use rust_decimal_macros::dec;
    use strata_shared::types::Money;

    fn payload(kind: EntryKind, skip_limits: bool, with_bridge: bool) -> EntryPayload {
        EntryPayload {
            entry: EntryRequest {
                debit_account: "CASH".to_string(),
                credit_account: "W-1".to_string(),
                amount: Money::new(dec!(100), "NGN"),
                detail: "transfer".to_string(),
                kind,
                skip_limits,
            },
            currency: Currency::new(566, "NGN"),
            debit_account: Account::new("CASH", "cash float", "NGN", AccountNormal::Debit, "main"),
            credit_account: Account::new("W-1", "wallet", "NGN", AccountNormal::Credit, "main"),
            bridge_asset: with_bridge.then(|| {
                Account::new("BA", "bridge-assets-NGN", "NGN", AccountNormal::Debit, "main")
            }),
            bridge_liability: with_bridge.then(|| {
                Account::new(
                    "BL",
                    "bridge-liabilities-NGN",
                    "NGN",
                    AccountNormal::Credit,
                    "main",
                )
            }),
        }
    }

    #[test]
    fn test_base_layer_pair() {
        let specs = DirectStrategy
            .create_entries(&payload(EntryKind::Fee, false, true))
            .unwrap();

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].side, EntrySide::Debit);
        assert_eq!(specs[0].account.code, "CASH");
        assert_eq!(specs[1].side, EntrySide::Credit);
        assert_eq!(specs[1].account.code, "W-1");
        assert!(specs.iter().all(|s| s.layer == 566));
    }

    #[test]
    fn test_amount_entries_track_limits() {
        let specs = DirectStrategy
            .create_entries(&payload(EntryKind::Amount, false, true))
            .unwrap();

        assert_eq!(specs.len(), 6);
        let daily: Vec<_> = specs.iter().filter(|s| s.layer == 4566).collect();
        let cumulative: Vec<_> = specs.iter().filter(|s| s.layer == 5566).collect();
        assert_eq!(daily.len(), 2);
        assert_eq!(cumulative.len(), 2);
        assert!(daily.iter().all(|s| s.detail == "transaction_limit"));
    }

    #[test]
    fn test_skip_limits_opts_out() {
        let specs = DirectStrategy
            .create_entries(&payload(EntryKind::Amount, true, true))
            .unwrap();
        assert_eq!(specs.len(), 2);
    }

    #[test]
    fn test_no_bridge_means_no_limit_entries() {
        let specs = DirectStrategy
            .create_entries(&payload(EntryKind::Amount, false, false))
            .unwrap();
        assert_eq!(specs.len(), 2);
    }

    #[test]
    fn test_bridge_debit_not_limited() {
        let mut p = payload(EntryKind::Amount, false, true);
        p.debit_account =
            Account::new("BA", "bridge-assets-NGN", "NGN", AccountNormal::Debit, "main");

        let specs = DirectStrategy.create_entries(&p).unwrap();
        assert_eq!(specs.len(), 2);
    }

    #[test]
    fn test_handles_only_non_pending() {
        use crate::ledger::types::TransactionGroup;
        let pending = DispatchKey {
            kind: "DEPOSIT".to_string(),
            group: TransactionGroup::Inbound,
            is_pending: true,
        };
        let direct = DispatchKey {
            is_pending: false,
            ..pending.clone()
        };
        assert!(!DirectStrategy.handles(&pending));
        assert!(DirectStrategy.handles(&direct));
    }
}
