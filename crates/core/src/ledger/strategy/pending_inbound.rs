//! Pending inbound transfers.
//!
//! An inbound pending transfer lands the funds against the liability bridge
//! on the base layer and stages the onward movement to the credit account on
//! the pending layer. Completion reverses the pending stage and settles the
//! bridged amount onto the credit account.

use rust_decimal::Decimal;

use crate::chart::Account;
use crate::layer::{LayerId, LayerKind};
use crate::ledger::context::EntryPayload;
use crate::ledger::entry::{EntrySide, EntrySpec};
use crate::ledger::error::LedgerError;
use crate::ledger::strategy::{DispatchKey, EntryStrategy};
use crate::ledger::types::TransactionGroup;

/// Strategy for `(pending, INBOUND)` transfers.
pub struct PendingInboundStrategy;

impl EntryStrategy for PendingInboundStrategy {
    fn name(&self) -> &'static str {
        "pending-inbound"
    }

    fn handles(&self, key: &DispatchKey) -> bool {
        key.is_pending && key.group == TransactionGroup::Inbound
    }

    fn create_entries(&self, payload: &EntryPayload) -> Result<Vec<EntrySpec>, LedgerError> {
        let base = payload.base_layer()?;
        let pending = LayerKind::Pending.layer(base);
        let amount = payload.entry.amount.amount;
        let detail = &payload.entry.detail;

        let bridge_liability = payload.require_bridge_liability()?;

        // Funds arrive: held against the liability bridge until completed.
        // The credit tag routes the completion to the final recipient.
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
            .with_tags(&format!("credit:{}", payload.entry.credit_account)),
        ];

        specs.extend(self.pending_entries(
            payload,
            amount,
            pending,
            detail,
            &bridge_liability,
        )?);
        Ok(specs)
    }
}

impl PendingInboundStrategy {
    fn pending_entries(
        &self,
        payload: &EntryPayload,
        amount: Decimal,
        layer: LayerId,
        detail: &str,
        bridge_liability: &Account,
    ) -> Result<Vec<EntrySpec>, LedgerError> {
        use crate::chart::AccountNormal;

        match payload.credit_account.normal {
            AccountNormal::Credit => {
                let bridge_asset = payload.require_bridge_asset()?;
                Ok(credit_account_pending_entries(
                    amount,
                    layer,
                    detail,
                    &bridge_asset,
                    bridge_liability,
                    &payload.credit_account,
                ))
            }
            AccountNormal::Debit => Ok(debit_account_pending_entries(
                amount,
                layer,
                detail,
                bridge_liability,
                &payload.credit_account,
            )),
        }
    }
}

/// Pending stage for a credit-normal recipient: bridge the asset and
/// liability sides, then flow on to the recipient.
pub(crate) fn credit_account_pending_entries(
    amount: Decimal,
    layer: LayerId,
    detail: &str,
    bridge_asset: &Account,
    bridge_liability: &Account,
    credit_account: &Account,
) -> Vec<EntrySpec> {
    vec![
        EntrySpec::new(bridge_asset.clone(), amount, EntrySide::Debit, layer, detail),
        EntrySpec::new(
            bridge_liability.clone(),
            amount,
            EntrySide::Credit,
            layer,
            detail,
        ),
        EntrySpec::new(
            bridge_liability.clone(),
            amount,
            EntrySide::Debit,
            layer,
            detail,
        ),
        EntrySpec::new(
            credit_account.clone(),
            amount,
            EntrySide::Credit,
            layer,
            detail,
        ),
    ]
}

/// Pending stage for a debit-normal recipient (like cash): debiting it
/// increases its balance.
pub(crate) fn debit_account_pending_entries(
    amount: Decimal,
    layer: LayerId,
    detail: &str,
    bridge_liability: &Account,
    credit_account: &Account,
) -> Vec<EntrySpec> {
    vec![
        EntrySpec::new(
            credit_account.clone(),
            amount,
            EntrySide::Debit,
            layer,
            detail,
        ),
        EntrySpec::new(
            bridge_liability.clone(),
            amount,
            EntrySide::Credit,
            layer,
            detail,
        ),
    ]
}
