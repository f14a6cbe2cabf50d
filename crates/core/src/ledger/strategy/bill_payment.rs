//! Pending bill payment transfers.
//!
//! Bill payments stage the principal against the liability bridge like
//! inbound transfers, but additionally carry rebate and commission entries
//! whose completion routes money to payer and agent accounts. Entry kinds
//! drive both the staged shape and the completion routing tags.

use std::collections::BTreeMap;

use crate::layer::{LayerId, LayerKind};
use crate::ledger::context::EntryPayload;
use crate::ledger::entry::{EntrySide, EntrySpec};
use crate::ledger::error::LedgerError;
use crate::ledger::strategy::pending_inbound::{
    credit_account_pending_entries, debit_account_pending_entries,
};
use crate::ledger::strategy::{DispatchKey, EntryStrategy, base_layer_of, reverse_offset_layers};
use crate::ledger::transaction::GlTransaction;
use crate::ledger::types::{EntryKind, TransactionGroup};

/// Strategy for `(pending, BILL_PAYMENT)` transfers.
pub struct PendingBillPaymentStrategy;

impl EntryStrategy for PendingBillPaymentStrategy {
    fn name(&self) -> &'static str {
        "pending-bill-payment"
    }

    fn handles(&self, key: &DispatchKey) -> bool {
        key.is_pending && key.group == TransactionGroup::BillPayment
    }

    fn create_entries(&self, payload: &EntryPayload) -> Result<Vec<EntrySpec>, LedgerError> {
        let base = payload.base_layer()?;
        let pending = LayerKind::Pending.layer(base);
        let amount = payload.entry.amount.amount;
        let detail = &payload.entry.detail;

        match payload.entry.kind {
            EntryKind::Amount => {
                let bridge_liability = payload.require_bridge_liability()?;
                let mut specs = vec![
                    EntrySpec::new(
                        payload.debit_account.clone(),
                        amount,
                        EntrySide::Debit,
                        base,
                        detail,
                    ),
                    EntrySpec::new(
                        bridge_liability.clone(),
                        amount,
                        EntrySide::Credit,
                        base,
                        detail,
                    )
                    .with_tags(&format!(
                        "credit:{},type:AMOUNT",
                        payload.entry.credit_account
                    )),
                ];
                specs.extend(self.pending_chain(payload, pending, None)?);
                Ok(specs)
            }
            EntryKind::Rebate => {
                let tag = format!("debit:{},type:REBATE", payload.entry.debit_account);
                self.pending_chain(payload, pending, Some(&tag))
            }
            EntryKind::Commission => {
                if payload.debit_account.tags.value_of("type") != Some("EXPENSE") {
                    return Err(LedgerError::ExpenseAccountRequired(
                        payload.debit_account.code.clone(),
                    ));
                }
                let tag = format!("debit:{},type:COMMISSION", payload.debit_account.code);
                self.commission_chain(payload, pending, &tag)
            }
            EntryKind::Fee => Ok(Vec::new()),
        }
    }

    fn complete(
        &self,
        original: &GlTransaction,
        completion: &mut GlTransaction,
        currency_layers: &BTreeMap<String, LayerId>,
    ) -> Result<(), LedgerError> {
        reverse_offset_layers(original, completion, currency_layers);
        self.complete_tagged(original, completion, currency_layers)
    }
}

impl PendingBillPaymentStrategy {
    /// The pending stage for principal and rebate entries; the routing tag
    /// (if any) lands on the recipient's credit entry.
    fn pending_chain(
        &self,
        payload: &EntryPayload,
        layer: LayerId,
        tag: Option<&str>,
    ) -> Result<Vec<EntrySpec>, LedgerError> {
        use crate::chart::AccountNormal;

        let bridge_liability = payload.require_bridge_liability()?;
        let amount = payload.entry.amount.amount;
        let detail = &payload.entry.detail;

        let mut specs = match payload.credit_account.normal {
            AccountNormal::Credit => {
                let bridge_asset = payload.require_bridge_asset()?;
                credit_account_pending_entries(
                    amount,
                    layer,
                    detail,
                    &bridge_asset,
                    &bridge_liability,
                    &payload.credit_account,
                )
            }
            AccountNormal::Debit => debit_account_pending_entries(
                amount,
                layer,
                detail,
                &bridge_liability,
                &payload.credit_account,
            ),
        };

        if let (Some(tag), Some(last)) = (tag, specs.last_mut()) {
            // The recipient credit is always the final entry of the chain.
            if payload.credit_account.normal == AccountNormal::Credit {
                *last = last.clone().with_tags(tag);
            }
        }
        Ok(specs)
    }

    /// Commission chains fund the agent from the expense account directly,
    /// not from the asset bridge.
    fn commission_chain(
        &self,
        payload: &EntryPayload,
        layer: LayerId,
        tag: &str,
    ) -> Result<Vec<EntrySpec>, LedgerError> {
        use crate::chart::AccountNormal;

        let amount = payload.entry.amount.amount;
        let detail = &payload.entry.detail;

        match payload.credit_account.normal {
            AccountNormal::Credit => {
                let bridge_liability = payload.require_bridge_liability()?;
                let mut specs = credit_account_pending_entries(
                    amount,
                    layer,
                    detail,
                    &payload.debit_account,
                    &bridge_liability,
                    &payload.credit_account,
                );
                if let Some(last) = specs.last_mut() {
                    *last = last.clone().with_tags(tag);
                }
                Ok(specs)
            }
            AccountNormal::Debit => Ok(debit_account_pending_entries(
                amount,
                layer,
                detail,
                &payload.debit_account,
                &payload.credit_account,
            )),
        }
    }

    /// Settles tagged amounts onto the base layer, routed by the entry's
    /// kind tag: principal flows bridge-to-recipient, rebates and
    /// commissions flow recipient-to-source.
    fn complete_tagged(
        &self,
        original: &GlTransaction,
        completion: &mut GlTransaction,
        currency_layers: &BTreeMap<String, LayerId>,
    ) -> Result<(), LedgerError> {
        let completion_tags = completion.boundary_tags();

        let tagged: Vec<_> = original
            .entries
            .iter()
            .filter_map(|e| {
                e.tags
                    .value_of("credit")
                    .or_else(|| e.tags.value_of("debit"))
                    .map(|code| (e.clone(), code.to_string()))
            })
            .collect();

        for (offset_entry, recipient_code) in tagged {
            let base = base_layer_of(&offset_entry.account.currency, currency_layers);
            let kind = offset_entry
                .tags
                .value_of("type")
                .ok_or_else(|| LedgerError::InvalidCompletionTags(original.detail.clone()))?
                .to_string();

            let Some(recipient) = original
                .entries
                .iter()
                .find(|e| e.account.code == recipient_code)
            else {
                continue;
            };

            match kind.as_str() {
                "AMOUNT" => {
                    let debited = completion.create_debit(
                        offset_entry.account.clone(),
                        offset_entry.amount,
                        "Bridge debit for bill payment",
                        base,
                    );
                    debited.tags = completion_tags.clone();

                    let credited = completion.create_credit(
                        recipient.account.clone(),
                        offset_entry.amount,
                        format!("Bill payment completion: {}", offset_entry.detail),
                        base,
                    );
                    credited.tags = completion_tags.clone();
                }
                "REBATE" | "COMMISSION" => {
                    let debited = completion.create_debit(
                        recipient.account.clone(),
                        offset_entry.amount,
                        format!("Bill payment completion: {}", offset_entry.detail),
                        base,
                    );
                    debited.tags = completion_tags.clone();

                    let credited = completion.create_credit(
                        offset_entry.account.clone(),
                        offset_entry.amount,
                        "Bridge credit for bill payment",
                        base,
                    );
                    credited.tags = completion_tags.clone();
                }
                _ => {
                    return Err(LedgerError::InvalidCompletionTags(original.detail.clone()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Account, AccountNormal, Currency};
    use crate::ledger::types::EntryRequest;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use strata_shared::Tags;
    use strata_shared::types::Money;

    fn payload(kind: EntryKind, debit_expense: bool) -> EntryPayload {
        let mut debit_account =
            Account::new("EXP", "agent expense", "NGN", AccountNormal::Debit, "main");
        if debit_expense {
            debit_account.tags = Tags::decode("type:EXPENSE");
        }
        EntryPayload {
            entry: EntryRequest {
                debit_account: "EXP".to_string(),
                credit_account: "AGENT".to_string(),
                amount: Money::new(dec!(25), "NGN"),
                detail: "bill".to_string(),
                kind,
                skip_limits: false,
            },
            currency: Currency::new(566, "NGN"),
            debit_account,
            credit_account: Account::new(
                "AGENT",
                "agent wallet",
                "NGN",
                AccountNormal::Credit,
                "main",
            ),
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

    fn assert_layers_balanced(specs: &[EntrySpec]) {
        let mut sums: std::collections::BTreeMap<i16, Decimal> = std::collections::BTreeMap::new();
        for spec in specs {
            let signed = match spec.side {
                EntrySide::Debit => spec.amount,
                EntrySide::Credit => -spec.amount,
            };
            *sums.entry(spec.layer).or_default() += signed;
        }
        for (layer, sum) in sums {
            assert_eq!(sum, Decimal::ZERO, "layer {layer} unbalanced");
        }
    }

    #[test]
    fn test_amount_entry_specs() {
        let specs = PendingBillPaymentStrategy
            .create_entries(&payload(EntryKind::Amount, false))
            .unwrap();

        assert_eq!(specs.len(), 6);
        assert_layers_balanced(&specs);

        let tagged = specs
            .iter()
            .find(|s| s.tags.value_of("credit").is_some())
            .unwrap();
        assert_eq!(tagged.tags.value_of("type"), Some("AMOUNT"));
        assert_eq!(tagged.layer, 566);
    }

    #[test]
    fn test_rebate_entry_specs() {
        let specs = PendingBillPaymentStrategy
            .create_entries(&payload(EntryKind::Rebate, false))
            .unwrap();

        // Pending chain only - rebates never touch the base layer at creation.
        assert!(specs.iter().all(|s| s.layer == 1566));
        assert_layers_balanced(&specs);

        let tagged = specs
            .iter()
            .find(|s| s.tags.value_of("debit").is_some())
            .unwrap();
        assert_eq!(tagged.tags.value_of("type"), Some("REBATE"));
        assert_eq!(tagged.tags.value_of("debit"), Some("EXP"));
    }

    #[test]
    fn test_commission_requires_expense_account() {
        let err = PendingBillPaymentStrategy
            .create_entries(&payload(EntryKind::Commission, false))
            .unwrap_err();
        assert!(matches!(err, LedgerError::ExpenseAccountRequired(_)));

        let specs = PendingBillPaymentStrategy
            .create_entries(&payload(EntryKind::Commission, true))
            .unwrap();
        assert_layers_balanced(&specs);

        // The expense account funds the chain directly.
        assert_eq!(specs[0].account.code, "EXP");
        assert_eq!(specs[0].side, EntrySide::Debit);
    }

    #[test]
    fn test_fee_entries_are_skipped() {
        let specs = PendingBillPaymentStrategy
            .create_entries(&payload(EntryKind::Fee, false))
            .unwrap();
        assert!(specs.is_empty());
    }

    #[test]
    fn test_handles_pending_bill_payment_only() {
        let bill = DispatchKey {
            kind: "BILL".to_string(),
            group: TransactionGroup::BillPayment,
            is_pending: true,
        };
        assert!(PendingBillPaymentStrategy.handles(&bill));
        assert!(!PendingBillPaymentStrategy.handles(&DispatchKey {
            is_pending: false,
            ..bill.clone()
        }));
        assert!(!PendingBillPaymentStrategy.handles(&DispatchKey {
            group: TransactionGroup::Inbound,
            ..bill
        }));
    }
}
