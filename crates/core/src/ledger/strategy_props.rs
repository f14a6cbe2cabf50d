//! Property-based tests for entry strategies and dispatch.
//!
//! - Spec balance: every strategy emits per-layer balanced spec sets
//! - Dispatch totality: every key selects exactly one strategy or is
//!   rejected explicitly - never silently, never ambiguously

use std::collections::BTreeMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use strata_shared::Tags;
use strata_shared::types::Money;

use crate::chart::{Account, AccountNormal, Currency};
use crate::ledger::context::EntryPayload;
use crate::ledger::entry::{EntrySide, EntrySpec};
use crate::ledger::error::LedgerError;
use crate::ledger::strategy::{
    DirectStrategy, DispatchKey, EntryStrategy, PendingBillPaymentStrategy,
    PendingInboundStrategy, StrategyRegistry,
};
use crate::ledger::types::{EntryKind, EntryRequest, TransactionGroup};

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn entry_kind() -> impl Strategy<Value = EntryKind> {
    prop_oneof![
        Just(EntryKind::Amount),
        Just(EntryKind::Fee),
        Just(EntryKind::Commission),
        Just(EntryKind::Rebate),
    ]
}

fn account_normal() -> impl Strategy<Value = AccountNormal> {
    prop_oneof![Just(AccountNormal::Debit), Just(AccountNormal::Credit)]
}

fn transaction_group() -> impl Strategy<Value = TransactionGroup> {
    prop_oneof![
        Just(TransactionGroup::Inbound),
        Just(TransactionGroup::Outbound),
        Just(TransactionGroup::BillPayment),
        Just(TransactionGroup::Transfer),
    ]
}

fn payload(
    amount: Decimal,
    kind: EntryKind,
    credit_normal: AccountNormal,
    skip_limits: bool,
) -> EntryPayload {
    let mut debit_account =
        Account::new("EXP", "agent expense", "NGN", AccountNormal::Debit, "main");
    // Keep commission payloads valid so spec shape is what gets tested.
    debit_account.tags = Tags::decode("type:EXPENSE");

    EntryPayload {
        entry: EntryRequest {
            debit_account: "EXP".to_string(),
            credit_account: "W-1".to_string(),
            amount: Money::new(amount, "NGN"),
            detail: "transfer".to_string(),
            kind,
            skip_limits,
        },
        currency: Currency::new(566, "NGN"),
        debit_account,
        credit_account: Account::new("W-1", "wallet", "NGN", credit_normal, "main"),
        bridge_asset: Some(Account::new(
            "BA",
            "bridge-assets-NGN",
            "NGN",
            AccountNormal::Debit,
            "main",
        )),
        bridge_liability: Some(Account::new(
            "BL",
            "bridge-liabilities-NGN",
            "NGN",
            AccountNormal::Credit,
            "main",
        )),
    }
}

fn assert_layers_balanced(specs: &[EntrySpec]) -> Result<(), TestCaseError> {
    let mut sums: BTreeMap<i16, Decimal> = BTreeMap::new();
    for spec in specs {
        let signed = match spec.side {
            EntrySide::Debit => spec.amount,
            EntrySide::Credit => -spec.amount,
        };
        *sums.entry(spec.layer).or_default() += signed;
    }
    for (layer, sum) in sums {
        prop_assert_eq!(sum, Decimal::ZERO, "layer {} unbalanced", layer);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// *For any* payload, the direct strategy emits a per-layer balanced
    /// spec set.
    #[test]
    fn prop_direct_specs_balance(
        amount in positive_amount(),
        kind in entry_kind(),
        credit_normal in account_normal(),
        skip_limits in any::<bool>(),
    ) {
        let specs = DirectStrategy
            .create_entries(&payload(amount, kind, credit_normal, skip_limits))
            .unwrap();
        prop_assert!(!specs.is_empty());
        assert_layers_balanced(&specs)?;
    }

    /// *For any* payload, the pending inbound strategy emits a per-layer
    /// balanced spec set.
    #[test]
    fn prop_pending_inbound_specs_balance(
        amount in positive_amount(),
        kind in entry_kind(),
        credit_normal in account_normal(),
    ) {
        let specs = PendingInboundStrategy
            .create_entries(&payload(amount, kind, credit_normal, false))
            .unwrap();
        prop_assert!(!specs.is_empty());
        assert_layers_balanced(&specs)?;
    }

    /// *For any* payload, the bill payment strategy emits a per-layer
    /// balanced spec set (possibly empty for fee entries).
    #[test]
    fn prop_bill_payment_specs_balance(
        amount in positive_amount(),
        kind in entry_kind(),
        credit_normal in account_normal(),
    ) {
        let specs = PendingBillPaymentStrategy
            .create_entries(&payload(amount, kind, credit_normal, false))
            .unwrap();
        assert_layers_balanced(&specs)?;
    }

    /// *For any* dispatch key, the standard registry selects exactly one
    /// strategy or rejects explicitly; ambiguity is impossible.
    #[test]
    fn prop_dispatch_total_and_unambiguous(
        group in transaction_group(),
        is_pending in any::<bool>(),
        kind in "[A-Z]{1,12}",
    ) {
        let registry = StrategyRegistry::standard();
        let key = DispatchKey { kind, group, is_pending };

        match registry.select(&key) {
            Ok(strategy) => {
                // The selected strategy does accept the key.
                prop_assert!(strategy.handles(&key));
            }
            Err(LedgerError::NoStrategyFound { .. }) => {
                // Only the pending groups without a strategy are rejected.
                prop_assert!(is_pending);
                prop_assert!(matches!(
                    group,
                    TransactionGroup::Outbound | TransactionGroup::Transfer
                ));
            }
            Err(other) => {
                return Err(TestCaseError::fail(format!(
                    "unexpected dispatch error: {other}"
                )));
            }
        }
    }
}
