//! Entry strategies and dispatch.
//!
//! A strategy knows which ledger layers a kind of transfer must touch; the
//! executor turns its specs into entries. Dispatch over
//! `(kind, group, is_pending)` is total and explicit: a key matching zero
//! or several strategies is a configuration error, never a fallback.

pub mod bill_payment;
pub mod direct;
pub mod pending_inbound;

use std::collections::BTreeMap;

use crate::layer::{LayerId, offset_layers};
use crate::ledger::context::EntryPayload;
use crate::ledger::entry::EntrySpec;
use crate::ledger::error::LedgerError;
use crate::ledger::transaction::GlTransaction;
use crate::ledger::types::TransactionGroup;

pub use bill_payment::PendingBillPaymentStrategy;
pub use direct::DirectStrategy;
pub use pending_inbound::PendingInboundStrategy;

/// The dispatch key selecting an entry strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchKey {
    /// Opaque transaction kind.
    pub kind: String,
    /// Transaction group.
    pub group: TransactionGroup,
    /// Pending flag.
    pub is_pending: bool,
}

/// A strategy producing balanced entry specs for one entry request, and
/// building the entries of a completion transaction.
pub trait EntryStrategy: Send + Sync {
    /// Strategy name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Whether this strategy accepts the dispatch key.
    fn handles(&self, key: &DispatchKey) -> bool;

    /// Emits the entry specs for one entry request. The union of specs for
    /// one payload must balance per layer.
    fn create_entries(&self, payload: &EntryPayload) -> Result<Vec<EntrySpec>, LedgerError>;

    /// Builds the entries of a completion transaction.
    ///
    /// The default moves everything off the offset layers and settles
    /// tagged amounts onto the base layer.
    ///
    /// # Errors
    ///
    /// Returns an error when completion routing tags are malformed.
    fn complete(
        &self,
        original: &GlTransaction,
        completion: &mut GlTransaction,
        currency_layers: &BTreeMap<String, LayerId>,
    ) -> Result<(), LedgerError> {
        reverse_offset_layers(original, completion, currency_layers);
        complete_tagged_entries(original, completion, currency_layers)
    }
}

/// Total strategy dispatch.
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn EntryStrategy>>,
}

impl StrategyRegistry {
    /// The standard strategy set: direct, pending inbound, pending bill
    /// payment.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            strategies: vec![
                Box::new(DirectStrategy),
                Box::new(PendingInboundStrategy),
                Box::new(PendingBillPaymentStrategy),
            ],
        }
    }

    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Registers a strategy.
    pub fn register(&mut self, strategy: Box<dyn EntryStrategy>) {
        self.strategies.push(strategy);
    }

    /// Selects the single strategy accepting the key.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NoStrategyFound`] or
    /// [`LedgerError::AmbiguousStrategy`] - both configuration errors.
    pub fn select(&self, key: &DispatchKey) -> Result<&dyn EntryStrategy, LedgerError> {
        let mut matches = self.strategies.iter().filter(|s| s.handles(key));
        let first = matches.next();
        let second = matches.next();

        match (first, second) {
            (Some(strategy), None) => Ok(strategy.as_ref()),
            (None, _) => Err(LedgerError::NoStrategyFound {
                kind: key.kind.clone(),
                group: key.group.to_string(),
                pending: key.is_pending,
            }),
            (Some(_), Some(_)) => Err(LedgerError::AmbiguousStrategy {
                kind: key.kind.clone(),
                group: key.group.to_string(),
                pending: key.is_pending,
            }),
        }
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Moves every offset-layer entry of `original` into `completion`, negated.
///
/// After posting, the original's pending/hold/limit positions are cleared;
/// the base layer is untouched.
pub(crate) fn reverse_offset_layers(
    original: &GlTransaction,
    completion: &mut GlTransaction,
    currency_layers: &BTreeMap<String, LayerId>,
) {
    let layers: Vec<LayerId> = currency_layers
        .values()
        .flat_map(|base| offset_layers(*base))
        .collect();

    let reversal = original.create_reverse_layers(false, &layers);
    let completion_tags = completion.boundary_tags();
    for entry in reversal.entries {
        let moved = completion.create_entry(
            entry.account,
            entry.amount,
            entry.detail,
            entry.side,
            entry.layer,
        );
        moved.tags = completion_tags.clone();
    }
}

/// Settles tagged amounts onto the base layer.
///
/// Entries tagged `credit:<code>` credit the recipient and debit the tagged
/// (bridge) account; entries tagged `debit:<code>` debit the recipient and
/// credit the transaction's liability bridge of the same currency.
pub(crate) fn complete_tagged_entries(
    original: &GlTransaction,
    completion: &mut GlTransaction,
    currency_layers: &BTreeMap<String, LayerId>,
) -> Result<(), LedgerError> {
    let completion_tags = completion.boundary_tags();

    let credit_tagged: Vec<_> = original
        .entries
        .iter()
        .filter_map(|e| {
            e.tags
                .value_of("credit")
                .map(|code| (e.clone(), code.to_string()))
        })
        .collect();

    for (offset_entry, recipient_code) in credit_tagged {
        let base = base_layer_of(&offset_entry.account.currency, currency_layers);
        let recipient = original
            .entries
            .iter()
            .find(|e| e.account.code == recipient_code)
            .ok_or_else(|| LedgerError::InvalidCompletionTags(original.detail.clone()))?;

        let credited = completion.create_credit(
            recipient.account.clone(),
            offset_entry.amount,
            format!("Completion credit for {}", offset_entry.detail),
            base,
        );
        credited.tags = completion_tags.clone();

        let debited = completion.create_debit(
            offset_entry.account.clone(),
            offset_entry.amount,
            "Bridge debit for completion",
            base,
        );
        debited.tags = completion_tags.clone();
    }

    let debit_tagged: Vec<_> = original
        .entries
        .iter()
        .filter_map(|e| {
            e.tags
                .value_of("debit")
                .map(|code| (e.clone(), code.to_string()))
        })
        .collect();

    for (offset_entry, recipient_code) in debit_tagged {
        let base = base_layer_of(&offset_entry.account.currency, currency_layers);
        let recipient = original
            .entries
            .iter()
            .find(|e| e.account.code == recipient_code)
            .ok_or_else(|| LedgerError::InvalidCompletionTags(original.detail.clone()))?;

        let debited = completion.create_debit(
            recipient.account.clone(),
            offset_entry.amount,
            format!("Completion debit for {}", offset_entry.detail),
            base,
        );
        debited.tags = completion_tags.clone();

        let bridge = original
            .entries
            .iter()
            .find(|e| {
                e.account.is_liability_bridge()
                    && e.account.currency == offset_entry.account.currency
            })
            .ok_or_else(|| LedgerError::InvalidCompletionTags(original.detail.clone()))?;

        let credited = completion.create_credit(
            bridge.account.clone(),
            offset_entry.amount,
            "Bridge credit for completion",
            base,
        );
        credited.tags = completion_tags.clone();
    }

    Ok(())
}

pub(crate) fn base_layer_of(currency: &str, currency_layers: &BTreeMap<String, LayerId>) -> LayerId {
    currency_layers.get(currency).copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(group: TransactionGroup, is_pending: bool) -> DispatchKey {
        DispatchKey {
            kind: "DEPOSIT".to_string(),
            group,
            is_pending,
        }
    }

    #[test]
    fn test_dispatch_is_total_over_valid_keys() {
        let registry = StrategyRegistry::standard();

        // Every non-pending key routes to the direct strategy.
        for group in [
            TransactionGroup::Inbound,
            TransactionGroup::Outbound,
            TransactionGroup::BillPayment,
            TransactionGroup::Transfer,
        ] {
            let strategy = registry.select(&key(group, false)).unwrap();
            assert_eq!(strategy.name(), "direct");
        }

        assert_eq!(
            registry
                .select(&key(TransactionGroup::Inbound, true))
                .unwrap()
                .name(),
            "pending-inbound"
        );
        assert_eq!(
            registry
                .select(&key(TransactionGroup::BillPayment, true))
                .unwrap()
                .name(),
            "pending-bill-payment"
        );
    }

    #[test]
    fn test_unmatched_key_is_rejected() {
        let registry = StrategyRegistry::standard();

        for group in [TransactionGroup::Outbound, TransactionGroup::Transfer] {
            let err = registry.select(&key(group, true)).err().unwrap();
            assert!(matches!(err, LedgerError::NoStrategyFound { .. }));
        }
    }

    #[test]
    fn test_ambiguous_registration_is_rejected() {
        let mut registry = StrategyRegistry::standard();
        registry.register(Box::new(DirectStrategy));

        let err = registry
            .select(&key(TransactionGroup::Transfer, false))
            .err()
            .unwrap();
        assert!(matches!(err, LedgerError::AmbiguousStrategy { .. }));
    }

    #[test]
    fn test_empty_registry_rejects_everything() {
        let registry = StrategyRegistry::new();
        let err = registry
            .select(&key(TransactionGroup::Inbound, false))
            .err()
            .unwrap();
        assert!(matches!(err, LedgerError::NoStrategyFound { .. }));
    }
}
