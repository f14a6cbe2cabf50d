//! Ledger entries and entry specs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strata_shared::Tags;
use strata_shared::types::EntryId;

use crate::chart::Account;
use crate::layer::LayerId;

/// Side of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    /// Debit entry.
    Debit,
    /// Credit entry.
    Credit,
}

impl EntrySide {
    /// The opposite side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// A single posted ledger entry.
///
/// Entries are immutable once posted, except for tag mutation during
/// completion and reversal tagging. Reversal entries carry negated amounts
/// on the same side as the entry they reverse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlEntry {
    /// Unique entry id.
    pub id: EntryId,
    /// Snapshot of the final account this entry posts to.
    pub account: Account,
    /// Amount; negative for reversal entries.
    pub amount: Decimal,
    /// Entry side.
    pub side: EntrySide,
    /// Detail string.
    pub detail: String,
    /// Free-form markers (e.g. `credit:<code>` completion routing).
    pub tags: Tags,
    /// Ledger layer this entry posts to.
    pub layer: LayerId,
}

impl GlEntry {
    /// True if this is a credit entry.
    #[must_use]
    pub fn is_credit(&self) -> bool {
        self.side == EntrySide::Credit
    }

    /// True if this is a debit entry.
    #[must_use]
    pub fn is_debit(&self) -> bool {
        self.side == EntrySide::Debit
    }

    /// Signed amount: positive for debits, negative for credits.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.side {
            EntrySide::Debit => self.amount,
            EntrySide::Credit => -self.amount,
        }
    }
}

/// A not-yet-persisted entry produced by a strategy.
///
/// The executor converts specs into [`GlEntry`] values attached to a
/// transaction, after checking that the spec set balances per layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySpec {
    /// The final account to post to.
    pub account: Account,
    /// Amount to post.
    pub amount: Decimal,
    /// Entry side.
    pub side: EntrySide,
    /// Ledger layer.
    pub layer: LayerId,
    /// Detail string.
    pub detail: String,
    /// Markers carried onto the produced entry.
    pub tags: Tags,
}

impl EntrySpec {
    /// Creates a spec with no tags.
    #[must_use]
    pub fn new(
        account: Account,
        amount: Decimal,
        side: EntrySide,
        layer: LayerId,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            account,
            amount,
            side,
            layer,
            detail: detail.into(),
            tags: Tags::new(),
        }
    }

    /// Attaches boundary-encoded markers to the spec.
    #[must_use]
    pub fn with_tags(mut self, tags: &str) -> Self {
        self.tags = Tags::decode(tags);
        self
    }
}
