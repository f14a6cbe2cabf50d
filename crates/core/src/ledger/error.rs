//! Ledger error types.
//!
//! The taxonomy follows the engine's failure contract: not-found conditions
//! and inconsistent states always propagate; validator rejections abort
//! before any entry is built; idempotent re-invocations are *not* errors
//! (they surface as a status marker on the result instead).

use rust_decimal::Decimal;
use thiserror::Error;

use crate::chart::ChartError;
use crate::layer::LayerId;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Not Found ==========
    /// Account code could not be resolved to a final account.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Currency code could not be resolved.
    #[error("Currency not found: {0}")]
    CurrencyNotFound(String),

    /// Chart code could not be resolved.
    #[error("Chart not found: {0}")]
    ChartNotFound(String),

    /// No journal posts to the chart.
    #[error("Journal not found for chart: {chart}")]
    JournalNotFound {
        /// The chart code.
        chart: String,
    },

    /// No transaction carries the reference.
    #[error("Unable to find transaction with reference: {0}")]
    TransactionNotFound(String),

    /// The referenced transaction has no entries to work from.
    #[error("Transaction {0} has no entries")]
    NoEntries(String),

    // ========== Invalid Request ==========
    /// Creation request has no entries.
    #[error("Transaction request must have at least one entry")]
    EmptyRequest,

    /// Creation request exceeds the configured entry cap.
    #[error("Transaction request has {count} entries, maximum is {max}")]
    TooManyEntries {
        /// Entries in the request.
        count: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Entry amount cannot be zero.
    #[error("Entry amount cannot be zero")]
    ZeroAmount,

    /// Entry amount cannot be negative.
    #[error("Entry amount cannot be negative")]
    NegativeAmount,

    /// Credit and debit accounts carry different currencies.
    #[error("Currency mismatch between credit account ({credit}) and debit account ({debit})")]
    CurrencyMismatch {
        /// Credit account currency.
        credit: String,
        /// Debit account currency.
        debit: String,
    },

    /// Entry amount currency differs from the account currency.
    #[error("Currency mismatch between accounts ({account}) and amount ({amount})")]
    AmountCurrencyMismatch {
        /// Account currency.
        account: String,
        /// Amount currency.
        amount: String,
    },

    /// Maximum transaction debit exceeded.
    #[error("Maximum transaction debit exceeded: {amount} > {limit}")]
    DebitLimitExceeded {
        /// Requested amount.
        amount: Decimal,
        /// Configured maximum.
        limit: Decimal,
    },

    /// Minimum transaction debit not met.
    #[error("Minimum transaction debit not met: {amount} < {limit}")]
    DebitLimitNotMet {
        /// Requested amount.
        amount: Decimal,
        /// Configured minimum.
        limit: Decimal,
    },

    // ========== Inconsistent State ==========
    /// Some, but not all, transactions in a group are already reversed.
    #[error("One or more transactions in group {0} have already been reversed")]
    PartialGroupReversal(String),

    /// A transaction cannot be completed without its group marker.
    #[error("Unable to find transaction group for reference: {0}")]
    MissingGroupState(String),

    /// A transaction cannot be completed without its kind marker.
    #[error("Unable to find transaction kind for reference: {0}")]
    MissingKindState(String),

    /// Commission entries require an expense-tagged debit account.
    #[error("Expense account required for commission entry, got: {0}")]
    ExpenseAccountRequired(String),

    /// Completion markers on an entry are malformed.
    #[error("Invalid completion tags on transaction {0}")]
    InvalidCompletionTags(String),

    /// A strategy requires a bridge account the context does not carry.
    #[error("Bridge {side} account not found for {account}")]
    MissingBridgeAccount {
        /// Account whose bridge was required.
        account: String,
        /// Bridge side ("asset" or "liability").
        side: &'static str,
    },

    // ========== Balance Violations ==========
    /// A transaction violates the per-layer balance law.
    #[error(
        "Transaction ({detail}) does not balance. debits={debits}, credits={credits} (layer={layer})"
    )]
    UnbalancedLayer {
        /// Transaction detail (reference).
        detail: String,
        /// Offending layer.
        layer: LayerId,
        /// Sum of debit amounts on the layer.
        debits: Decimal,
        /// Sum of credit amounts on the layer.
        credits: Decimal,
    },

    /// A strategy emitted an entry spec set that does not balance per layer.
    #[error("Entry specs do not balance. debits={debits}, credits={credits} (layer={layer})")]
    SpecsUnbalanced {
        /// Offending layer.
        layer: LayerId,
        /// Sum of debit amounts on the layer.
        debits: Decimal,
        /// Sum of credit amounts on the layer.
        credits: Decimal,
    },

    // ========== Dispatch ==========
    /// No strategy accepts the dispatch key.
    #[error("No entry strategy for kind={kind}, group={group}, pending={pending}")]
    NoStrategyFound {
        /// Transaction kind.
        kind: String,
        /// Transaction group.
        group: String,
        /// Pending flag.
        pending: bool,
    },

    /// More than one strategy accepts the dispatch key.
    #[error("Ambiguous entry strategy for kind={kind}, group={group}, pending={pending}")]
    AmbiguousStrategy {
        /// Transaction kind.
        kind: String,
        /// Transaction group.
        group: String,
        /// Pending flag.
        pending: bool,
    },

    // ========== Storage ==========
    /// A transaction with the same reference is already posted.
    #[error("A transaction with reference {0} is already posted")]
    DuplicateReference(String),

    // ========== Chart ==========
    /// Chart configuration or bridge resolution failure.
    #[error(transparent)]
    Chart(#[from] ChartError),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::CurrencyNotFound(_) => "CURRENCY_NOT_FOUND",
            Self::ChartNotFound(_) => "CHART_NOT_FOUND",
            Self::JournalNotFound { .. } => "JOURNAL_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::NoEntries(_) => "NO_ENTRIES",
            Self::EmptyRequest => "EMPTY_REQUEST",
            Self::TooManyEntries { .. } => "TOO_MANY_ENTRIES",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::AmountCurrencyMismatch { .. } => "AMOUNT_CURRENCY_MISMATCH",
            Self::DebitLimitExceeded { .. } => "DEBIT_LIMIT_EXCEEDED",
            Self::DebitLimitNotMet { .. } => "DEBIT_LIMIT_NOT_MET",
            Self::PartialGroupReversal(_) => "PARTIAL_GROUP_REVERSAL",
            Self::MissingGroupState(_) => "MISSING_GROUP_STATE",
            Self::MissingKindState(_) => "MISSING_KIND_STATE",
            Self::ExpenseAccountRequired(_) => "EXPENSE_ACCOUNT_REQUIRED",
            Self::InvalidCompletionTags(_) => "INVALID_COMPLETION_TAGS",
            Self::MissingBridgeAccount { .. } => "MISSING_BRIDGE_ACCOUNT",
            Self::UnbalancedLayer { .. } => "UNBALANCED_LAYER",
            Self::SpecsUnbalanced { .. } => "SPECS_UNBALANCED",
            Self::NoStrategyFound { .. } => "NO_STRATEGY_FOUND",
            Self::AmbiguousStrategy { .. } => "AMBIGUOUS_STRATEGY",
            Self::DuplicateReference(_) => "DUPLICATE_REFERENCE",
            Self::Chart(_) => "CHART_ERROR",
        }
    }

    /// Returns true for conditions that abort with nothing persisted.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_)
                | Self::CurrencyNotFound(_)
                | Self::ChartNotFound(_)
                | Self::JournalNotFound { .. }
                | Self::TransactionNotFound(_)
        )
    }

    /// Returns true for inconsistent-state conditions, which must never be
    /// silently repaired.
    #[must_use]
    pub fn is_inconsistent_state(&self) -> bool {
        matches!(
            self,
            Self::PartialGroupReversal(_)
                | Self::MissingGroupState(_)
                | Self::MissingKindState(_)
                | Self::ExpenseAccountRequired(_)
                | Self::InvalidCompletionTags(_)
        )
    }
}
