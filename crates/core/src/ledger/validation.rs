//! Creation request validation.
//!
//! Validators run after context assembly and before any entry is built; a
//! rejection aborts the whole operation with nothing persisted.

use strata_shared::config::LedgerConfig;

use crate::ledger::context::TransactionContext;
use crate::ledger::error::LedgerError;
use crate::ledger::types::{CreateTransactionRequest, EntryKind};

/// Context handed to validators.
pub struct ValidationContext<'a> {
    /// The resolved transaction context.
    pub context: &'a TransactionContext,
}

impl<'a> ValidationContext<'a> {
    /// Wraps a transaction context.
    #[must_use]
    pub fn new(context: &'a TransactionContext) -> Self {
        Self { context }
    }
}

/// A single validation rule.
pub trait TransactionValidator: Send + Sync {
    /// Rule name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Validates the request against the context.
    ///
    /// # Errors
    ///
    /// Returns the violation as a [`LedgerError`].
    fn validate(
        &self,
        request: &CreateTransactionRequest,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), LedgerError>;
}

/// Rejects empty or oversized requests and non-positive amounts.
pub struct ShapeValidator {
    max_entries: usize,
}

impl TransactionValidator for ShapeValidator {
    fn name(&self) -> &'static str {
        "shape"
    }

    fn validate(
        &self,
        request: &CreateTransactionRequest,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), LedgerError> {
        if request.entries.is_empty() {
            return Err(LedgerError::EmptyRequest);
        }
        if request.entries.len() > self.max_entries {
            return Err(LedgerError::TooManyEntries {
                count: request.entries.len(),
                max: self.max_entries,
            });
        }
        for entry in &request.entries {
            if entry.amount.is_zero() {
                return Err(LedgerError::ZeroAmount);
            }
            if entry.amount.is_negative() {
                return Err(LedgerError::NegativeAmount);
            }
        }
        Ok(())
    }
}

/// Every referenced account code must resolve to a final account.
pub struct AccountExistenceValidator;

impl TransactionValidator for AccountExistenceValidator {
    fn name(&self) -> &'static str {
        "account-existence"
    }

    fn validate(
        &self,
        request: &CreateTransactionRequest,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), LedgerError> {
        for entry in &request.entries {
            for code in [&entry.credit_account, &entry.debit_account] {
                if !ctx.context.accounts.contains_key(code) {
                    return Err(LedgerError::AccountNotFound(code.clone()));
                }
            }
        }
        Ok(())
    }
}

/// Credit account, debit account, and amount must share one currency.
pub struct CurrencyConsistencyValidator;

impl TransactionValidator for CurrencyConsistencyValidator {
    fn name(&self) -> &'static str {
        "currency-consistency"
    }

    fn validate(
        &self,
        request: &CreateTransactionRequest,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), LedgerError> {
        for entry in &request.entries {
            let credit = ctx
                .context
                .accounts
                .get(&entry.credit_account)
                .ok_or_else(|| LedgerError::AccountNotFound(entry.credit_account.clone()))?;
            let debit = ctx
                .context
                .accounts
                .get(&entry.debit_account)
                .ok_or_else(|| LedgerError::AccountNotFound(entry.debit_account.clone()))?;

            if credit.currency != debit.currency {
                return Err(LedgerError::CurrencyMismatch {
                    credit: credit.currency.clone(),
                    debit: debit.currency.clone(),
                });
            }
            if credit.currency != entry.amount.currency {
                return Err(LedgerError::AmountCurrencyMismatch {
                    account: credit.currency.clone(),
                    amount: entry.amount.currency.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Principal amounts must fall inside the request's debit limits.
pub struct TransactionLimitValidator;

impl TransactionValidator for TransactionLimitValidator {
    fn name(&self) -> &'static str {
        "transaction-limit"
    }

    fn validate(
        &self,
        request: &CreateTransactionRequest,
        _ctx: &ValidationContext<'_>,
    ) -> Result<(), LedgerError> {
        let Some(limit) = &request.limit else {
            return Ok(());
        };

        for entry in &request.entries {
            if entry.skip_limits || entry.kind != EntryKind::Amount {
                continue;
            }
            if entry.amount.is_greater_than(&limit.max_transaction_debit) {
                return Err(LedgerError::DebitLimitExceeded {
                    amount: entry.amount.amount,
                    limit: limit.max_transaction_debit.amount,
                });
            }
            if entry.amount.is_less_than(&limit.min_transaction_debit) {
                return Err(LedgerError::DebitLimitNotMet {
                    amount: entry.amount.amount,
                    limit: limit.min_transaction_debit.amount,
                });
            }
        }
        Ok(())
    }
}

/// Runs every registered validator in order, stopping at the first failure.
pub struct CompositeValidator {
    validators: Vec<Box<dyn TransactionValidator>>,
}

impl CompositeValidator {
    /// The standard rule set.
    #[must_use]
    pub fn standard(config: &LedgerConfig) -> Self {
        Self {
            validators: vec![
                Box::new(ShapeValidator {
                    max_entries: config.max_entries_per_request,
                }),
                Box::new(AccountExistenceValidator),
                Box::new(CurrencyConsistencyValidator),
                Box::new(TransactionLimitValidator),
            ],
        }
    }

    /// Validates a request against all rules.
    ///
    /// # Errors
    ///
    /// Returns the first violation.
    pub fn validate(
        &self,
        request: &CreateTransactionRequest,
        ctx: &ValidationContext<'_>,
    ) -> Result<(), LedgerError> {
        for validator in &self.validators {
            validator.validate(request, ctx)?;
        }
        Ok(())
    }
}
