//! Request and result types for the transaction lifecycle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_shared::types::Money;

/// Status marker for an idempotent reversal short-circuit.
pub const STATUS_ALREADY_REVERSED: &str = "already_reversed";
/// Status marker for an idempotent completion short-circuit.
pub const STATUS_ALREADY_COMPLETED: &str = "already_completed";

/// Transaction grouping construct.
///
/// The group routes a creation request to its entry strategy together with
/// the pending flag; dispatch is total over the valid combinations and
/// rejects everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionGroup {
    /// Funds arriving from outside the ledger.
    Inbound,
    /// Funds leaving the ledger.
    Outbound,
    /// Bill payment flows.
    BillPayment,
    /// Internal transfers.
    Transfer,
}

impl std::fmt::Display for TransactionGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Inbound => "INBOUND",
            Self::Outbound => "OUTBOUND",
            Self::BillPayment => "BILL_PAYMENT",
            Self::Transfer => "TRANSFER",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for TransactionGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INBOUND" => Ok(Self::Inbound),
            "OUTBOUND" => Ok(Self::Outbound),
            "BILL_PAYMENT" => Ok(Self::BillPayment),
            "TRANSFER" => Ok(Self::Transfer),
            other => Err(format!("Unknown transaction group: {other}")),
        }
    }
}

/// Kind of a single entry request within a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    /// The principal transfer amount.
    Amount,
    /// A fee charged on the transfer.
    Fee,
    /// A commission owed to a third party.
    Commission,
    /// A rebate returned to the payer.
    Rebate,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Amount => "AMOUNT",
            Self::Fee => "FEE",
            Self::Commission => "COMMISSION",
            Self::Rebate => "REBATE",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AMOUNT" => Ok(Self::Amount),
            "FEE" => Ok(Self::Fee),
            "COMMISSION" => Ok(Self::Commission),
            "REBATE" => Ok(Self::Rebate),
            other => Err(format!("Unknown entry kind: {other}")),
        }
    }
}

/// One logical transfer within a creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRequest {
    /// Code of the account to debit.
    pub debit_account: String,
    /// Code of the account to credit.
    pub credit_account: String,
    /// Transfer amount with currency.
    pub amount: Money,
    /// Detail string carried onto the produced entries.
    pub detail: String,
    /// Kind of this entry.
    pub kind: EntryKind,
    /// Skip limit-layer tracking for this entry.
    #[serde(default)]
    pub skip_limits: bool,
}

/// Per-transaction debit limits, checked before any entry is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLimit {
    /// Largest debit a single entry may carry.
    pub max_transaction_debit: Money,
    /// Smallest debit a single entry may carry.
    pub min_transaction_debit: Money,
}

/// A transaction creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    /// External reference; becomes the transaction detail.
    pub reference: String,
    /// Transaction group.
    pub group: TransactionGroup,
    /// Opaque transaction kind (e.g. "DEPOSIT", "WITHDRAWAL").
    pub kind: String,
    /// Whether the transfer lands on the pending layer until completed.
    #[serde(default)]
    pub pending: bool,
    /// The logical transfers to post.
    pub entries: Vec<EntryRequest>,
    /// Free-form request metadata, flattened onto the transaction tags.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Optional debit limits.
    #[serde(default)]
    pub limit: Option<TransactionLimit>,
}

/// Result returned to lifecycle callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetail {
    /// The reference the operation resolves to.
    pub reference: String,
    /// Result metadata. Always carries `account_ids` (comma-joined distinct
    /// account codes touched) and `transactions` (references involved);
    /// idempotent short-circuits add a `status` marker.
    pub metadata: BTreeMap<String, String>,
}

impl TransactionDetail {
    /// Creates a detail record.
    #[must_use]
    pub fn new(reference: impl Into<String>, metadata: BTreeMap<String, String>) -> Self {
        Self {
            reference: reference.into(),
            metadata,
        }
    }

    /// The idempotency status marker, if any.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.metadata.get("status").map(String::as_str)
    }

    /// The comma-joined account codes touched.
    #[must_use]
    pub fn account_ids(&self) -> Option<&str> {
        self.metadata.get("account_ids").map(String::as_str)
    }

    /// The comma-joined transaction references involved.
    #[must_use]
    pub fn transactions(&self) -> Option<&str> {
        self.metadata.get("transactions").map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_round_trip() {
        for group in [
            TransactionGroup::Inbound,
            TransactionGroup::Outbound,
            TransactionGroup::BillPayment,
            TransactionGroup::Transfer,
        ] {
            let parsed: TransactionGroup = group.to_string().parse().unwrap();
            assert_eq!(parsed, group);
        }
        assert!("SIDEWAYS".parse::<TransactionGroup>().is_err());
    }

    #[test]
    fn test_entry_kind_round_trip() {
        for kind in [
            EntryKind::Amount,
            EntryKind::Fee,
            EntryKind::Commission,
            EntryKind::Rebate,
        ] {
            let parsed: EntryKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_detail_accessors() {
        let mut metadata = BTreeMap::new();
        metadata.insert("account_ids".to_string(), "A,B".to_string());
        metadata.insert("transactions".to_string(), "ref-1".to_string());
        metadata.insert("status".to_string(), STATUS_ALREADY_REVERSED.to_string());

        let detail = TransactionDetail::new("ref-1", metadata);
        assert_eq!(detail.account_ids(), Some("A,B"));
        assert_eq!(detail.transactions(), Some("ref-1"));
        assert_eq!(detail.status(), Some(STATUS_ALREADY_REVERSED));
    }
}
