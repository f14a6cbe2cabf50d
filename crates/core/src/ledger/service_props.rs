//! Property-based tests for the transaction lifecycle.
//!
//! - Balance law: every posted transaction balances per layer
//! - Round-trip reversal: create then reverse nets balances to zero
//! - Idempotent reversal and completion short-circuits
//! - Completion settles the staged amount onto the base layer

use std::collections::BTreeMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use strata_shared::config::LedgerConfig;
use strata_shared::types::{JournalId, Money};

use crate::chart::{Account, AccountNormal, Chart, Currency, Journal, MemoryDirectory};
use crate::ledger::service::TransactionService;
use crate::ledger::snapshot::MemorySnapshotMaintainer;
use crate::ledger::store::MemoryStore;
use crate::ledger::types::{
    CreateTransactionRequest, EntryKind, EntryRequest, STATUS_ALREADY_COMPLETED,
    STATUS_ALREADY_REVERSED, TransactionGroup,
};

type Service = TransactionService<MemoryStore, MemorySnapshotMaintainer, MemoryDirectory>;

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn fixture() -> (Service, Chart) {
    let mut chart = Chart::new("main", "Main chart");
    for (code, description, normal) in [
        ("CASH", "cash float", AccountNormal::Debit),
        ("W-1", "customer wallet", AccountNormal::Credit),
        ("BA", "bridge-assets-NGN", AccountNormal::Debit),
        ("BL", "bridge-liabilities-NGN", AccountNormal::Credit),
    ] {
        chart.add_account(Account::new(code, description, "NGN", normal, "main"));
    }

    let mut directory = MemoryDirectory::new();
    directory.add_chart(chart.clone());
    directory.add_currency(Currency::new(566, "NGN")).unwrap();
    directory.add_journal(Journal {
        id: JournalId::new(),
        name: "main".to_string(),
        chart: "main".to_string(),
    });

    let snapshots = MemorySnapshotMaintainer::new(&[Currency::new(566, "NGN")]).unwrap();
    let service = TransactionService::new(
        MemoryStore::new(),
        directory,
        snapshots,
        &LedgerConfig::default(),
    );
    (service, chart)
}

fn request(
    reference: &str,
    group: TransactionGroup,
    pending: bool,
    amounts: &[Decimal],
) -> CreateTransactionRequest {
    CreateTransactionRequest {
        reference: reference.to_string(),
        group,
        kind: "TRANSFER".to_string(),
        pending,
        entries: amounts
            .iter()
            .map(|amount| EntryRequest {
                debit_account: "CASH".to_string(),
                credit_account: "W-1".to_string(),
                amount: Money::new(*amount, "NGN"),
                detail: "transfer".to_string(),
                kind: EntryKind::Amount,
                skip_limits: true,
            })
            .collect(),
        metadata: BTreeMap::new(),
        limit: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// *For any* amounts, a posted direct transaction satisfies the
    /// per-layer balance law.
    #[test]
    fn prop_direct_transaction_balances(amounts in prop::collection::vec(positive_amount(), 1..5)) {
        let (mut service, chart) = fixture();
        service
            .create_transaction(&request("ref-1", TransactionGroup::Transfer, false, &amounts), &chart)
            .unwrap();

        let posted = service.repository().find_by_reference("ref-1").unwrap();
        prop_assert!(posted.is_balanced());
        for totals in posted.layer_totals().values() {
            prop_assert_eq!(totals.debits, totals.credits);
        }
    }

    /// *For any* amount, a pending inbound transaction balances on every
    /// layer it touches, including the pending layer.
    #[test]
    fn prop_pending_transaction_balances(amount in positive_amount()) {
        let (mut service, chart) = fixture();
        service
            .create_transaction(&request("ref-1", TransactionGroup::Inbound, true, &[amount]), &chart)
            .unwrap();

        let posted = service.repository().find_by_reference("ref-1").unwrap();
        prop_assert!(posted.is_balanced());
        prop_assert!(posted.layer_totals().contains_key(&1566));
    }

    /// *For any* amount, create-then-reverse nets every account balance to
    /// zero.
    #[test]
    fn prop_round_trip_reversal_nets_to_zero(amount in positive_amount()) {
        let (mut service, chart) = fixture();
        service
            .create_transaction(&request("ref-1", TransactionGroup::Transfer, false, &[amount]), &chart)
            .unwrap();
        service.reverse_transaction("ref-1", "rev-1").unwrap();

        prop_assert_eq!(service.snapshots().latest_balance("CASH", 566), Some(Decimal::ZERO));
        prop_assert_eq!(service.snapshots().latest_balance("W-1", 566), Some(Decimal::ZERO));
    }

    /// *For any* amount, a second reversal returns `already_reversed` and
    /// posts nothing new.
    #[test]
    fn prop_reversal_idempotent(amount in positive_amount()) {
        let (mut service, chart) = fixture();
        service
            .create_transaction(&request("ref-1", TransactionGroup::Transfer, false, &[amount]), &chart)
            .unwrap();
        service.reverse_transaction("ref-1", "rev-1").unwrap();
        let posted_before = service.repository().store().len();

        let detail = service.reverse_transaction("ref-1", "rev-2").unwrap();
        prop_assert_eq!(detail.status(), Some(STATUS_ALREADY_REVERSED));
        prop_assert_eq!(service.repository().store().len(), posted_before);
    }

    /// *For any* amount, completion settles exactly the staged amount onto
    /// the recipient's base-layer balance, and a second completion is an
    /// idempotent no-op.
    #[test]
    fn prop_completion_settles_staged_amount(amount in positive_amount()) {
        let (mut service, chart) = fixture();
        service
            .create_transaction(&request("dep-1", TransactionGroup::Inbound, true, &[amount]), &chart)
            .unwrap();

        // Until completion the recipient has no base-layer balance.
        prop_assert_eq!(service.snapshots().latest_balance("W-1", 566), None);

        service.complete_transaction("dep-1").unwrap();
        prop_assert_eq!(service.snapshots().latest_balance("W-1", 566), Some(amount));
        prop_assert_eq!(service.snapshots().latest_balance("BL", 566), Some(Decimal::ZERO));

        let posted_before = service.repository().store().len();
        let again = service.complete_transaction("dep-1").unwrap();
        prop_assert_eq!(again.status(), Some(STATUS_ALREADY_COMPLETED));
        prop_assert_eq!(service.repository().store().len(), posted_before);
    }
}
