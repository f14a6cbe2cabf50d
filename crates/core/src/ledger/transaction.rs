//! The ledger transaction aggregate.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strata_shared::Tags;
use strata_shared::types::{EntryId, JournalId, TransactionId};

use crate::chart::Account;
use crate::layer::LayerId;
use crate::ledger::entry::{EntrySide, GlEntry};
use crate::ledger::error::LedgerError;
use crate::ledger::types::TransactionGroup;

/// Structured lifecycle state of a transaction.
///
/// The engine never inspects tag strings for state; these flags are the
/// single source of truth. [`TransactionState::encode_into`] and
/// [`TransactionState::decode`] translate to and from the boundary tag
/// representation (`reversed:true`, `completes:<ref>`, ...) for external
/// systems that exchange the encoded form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionState {
    /// Transaction group recorded at creation.
    pub group: Option<TransactionGroup>,
    /// Opaque transaction kind recorded at creation.
    pub kind: Option<String>,
    /// Set once a reversal has been posted against this transaction.
    pub reversed: bool,
    /// Reference of the posted reversal.
    pub reversal_reference: Option<String>,
    /// For a reversal transaction: the reference it reverses.
    pub reverses: Option<String>,
    /// Set once a completion has been posted against this transaction.
    pub completed: bool,
    /// Reference of the posted completion.
    pub completion_reference: Option<String>,
    /// For a completion transaction: the reference it completes.
    pub completes: Option<String>,
}

impl TransactionState {
    /// Writes the boundary tag representation into `tags`.
    pub fn encode_into(&self, tags: &mut Tags) {
        if let Some(group) = self.group {
            tags.add_pair("group", &group.to_string());
        }
        if let Some(kind) = &self.kind {
            tags.add_pair("type", kind);
        }
        if self.reversed {
            tags.add("reversed:true");
        }
        if let Some(reference) = &self.reversal_reference {
            tags.add_pair("reversal_reference", reference);
        }
        if let Some(reference) = &self.reverses {
            tags.add_pair("reverses", reference);
        }
        if self.completed {
            tags.add("completed:true");
        }
        if let Some(reference) = &self.completion_reference {
            tags.add_pair("completion_reference", reference);
        }
        if let Some(reference) = &self.completes {
            tags.add_pair("completes", reference);
        }
    }

    /// Reads the boundary tag representation back into structured state.
    #[must_use]
    pub fn decode(tags: &Tags) -> Self {
        Self {
            group: tags.value_of("group").and_then(|g| g.parse().ok()),
            kind: tags.value_of("type").map(str::to_string),
            reversed: tags.contains("reversed:true"),
            reversal_reference: tags.value_of("reversal_reference").map(str::to_string),
            reverses: tags.value_of("reverses").map(str::to_string),
            completed: tags.contains("completed:true"),
            completion_reference: tags.value_of("completion_reference").map(str::to_string),
            completes: tags.value_of("completes").map(str::to_string),
        }
    }
}

/// Per-layer debit and credit totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerTotals {
    /// Sum of debit amounts on the layer.
    pub debits: Decimal,
    /// Sum of credit amounts on the layer.
    pub credits: Decimal,
}

/// A ledger transaction: an ordered set of entries posted atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlTransaction {
    /// Unique transaction id (UUID v7, time-ordered).
    pub id: TransactionId,
    /// Opaque reference, usually the external transaction reference.
    pub detail: String,
    /// Creation timestamp.
    pub timestamp: DateTime<Utc>,
    /// Posting date.
    pub post_date: DateTime<Utc>,
    /// Journal this transaction posts to.
    pub journal: JournalId,
    /// Request metadata markers.
    pub tags: Tags,
    /// Structured lifecycle state.
    pub state: TransactionState,
    /// Ordered entries.
    pub entries: Vec<GlEntry>,
}

impl GlTransaction {
    /// Creates an empty transaction shell stamped now.
    #[must_use]
    pub fn new(detail: impl Into<String>, journal: JournalId) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            detail: detail.into(),
            timestamp: now,
            post_date: now,
            journal,
            tags: Tags::new(),
            state: TransactionState::default(),
            entries: Vec::new(),
        }
    }

    /// Attaches an entry.
    pub fn create_entry(
        &mut self,
        account: Account,
        amount: Decimal,
        detail: impl Into<String>,
        side: EntrySide,
        layer: LayerId,
    ) -> &mut GlEntry {
        self.entries.push(GlEntry {
            id: EntryId::new(),
            account,
            amount,
            side,
            detail: detail.into(),
            tags: Tags::new(),
            layer,
        });
        self.entries.last_mut().expect("entry just pushed")
    }

    /// Attaches a debit entry.
    pub fn create_debit(
        &mut self,
        account: Account,
        amount: Decimal,
        detail: impl Into<String>,
        layer: LayerId,
    ) -> &mut GlEntry {
        self.create_entry(account, amount, detail, EntrySide::Debit, layer)
    }

    /// Attaches a credit entry.
    pub fn create_credit(
        &mut self,
        account: Account,
        amount: Decimal,
        detail: impl Into<String>,
        layer: LayerId,
    ) -> &mut GlEntry {
        self.create_entry(account, amount, detail, EntrySide::Credit, layer)
    }

    /// Creates a reversal of this transaction: every entry negated on its
    /// original side and layer.
    ///
    /// When `keep_entry_tags` is set, entry tags are copied onto the
    /// reversal entries.
    #[must_use]
    pub fn create_reverse(&self, keep_entry_tags: bool) -> GlTransaction {
        self.reverse_filtered(keep_entry_tags, |_| true)
    }

    /// Creates a reversal restricted to entries on the given layers.
    #[must_use]
    pub fn create_reverse_layers(
        &self,
        keep_entry_tags: bool,
        layers: &[LayerId],
    ) -> GlTransaction {
        self.reverse_filtered(keep_entry_tags, |entry| layers.contains(&entry.layer))
    }

    fn reverse_filtered(
        &self,
        keep_entry_tags: bool,
        select: impl Fn(&GlEntry) -> bool,
    ) -> GlTransaction {
        let mut reversal = GlTransaction::new(format!("({})", self.detail), self.journal);
        for entry in self.entries.iter().filter(|e| select(e)) {
            let reversed = reversal.create_entry(
                entry.account.clone(),
                -entry.amount,
                entry.detail.clone(),
                entry.side,
                entry.layer,
            );
            if keep_entry_tags {
                reversed.tags = entry.tags.clone();
            }
        }
        reversal
    }

    /// Debit and credit totals per layer present among the entries.
    #[must_use]
    pub fn layer_totals(&self) -> BTreeMap<LayerId, LayerTotals> {
        let mut totals: BTreeMap<LayerId, LayerTotals> = BTreeMap::new();
        for entry in &self.entries {
            let layer = totals.entry(entry.layer).or_default();
            match entry.side {
                EntrySide::Debit => layer.debits += entry.amount,
                EntrySide::Credit => layer.credits += entry.amount,
            }
        }
        totals
    }

    /// True if every layer satisfies the balance law.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.validate_balanced().is_ok()
    }

    /// Checks the per-layer balance law.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnbalancedLayer`] naming the first layer on
    /// which debits and credits differ.
    pub fn validate_balanced(&self) -> Result<(), LedgerError> {
        for (layer, totals) in self.layer_totals() {
            if totals.debits != totals.credits {
                return Err(LedgerError::UnbalancedLayer {
                    detail: self.detail.clone(),
                    layer,
                    debits: totals.debits,
                    credits: totals.credits,
                });
            }
        }
        Ok(())
    }

    /// Distinct account codes touched by this transaction, in code order.
    #[must_use]
    pub fn account_codes(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .map(|e| e.account.code.clone())
            .collect()
    }

    /// The boundary tag representation: request metadata plus encoded state.
    #[must_use]
    pub fn boundary_tags(&self) -> Tags {
        let mut tags = self.tags.clone();
        self.state.encode_into(&mut tags);
        tags
    }
}
