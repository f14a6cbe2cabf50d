//! Transaction persistence collaborator.
//!
//! Each lifecycle operation maps to one atomic storage boundary: `post`
//! validates before inserting, so a rejected transaction leaves no partial
//! state behind. Real deployments implement this trait over a database with
//! row-level locking on the transaction record; the in-memory store backs
//! tests and single-process use.

use std::collections::BTreeMap;

use crate::ledger::error::LedgerError;
use crate::ledger::transaction::GlTransaction;

/// Persistence primitives consumed by the lifecycle.
pub trait TransactionStore {
    /// Durably posts a transaction after checking the per-layer balance law.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnbalancedLayer`] for a balance violation or
    /// [`LedgerError::DuplicateReference`] when the reference is taken;
    /// in both cases nothing is persisted.
    fn post(&mut self, transaction: GlTransaction) -> Result<(), LedgerError>;

    /// Finds a transaction by its reference (detail).
    fn find_by_reference(&self, reference: &str) -> Option<GlTransaction>;

    /// Finds a transaction group by name, returning its members in
    /// insertion order.
    fn find_group(&self, name: &str) -> Option<Vec<GlTransaction>>;

    /// Creates (or extends) a named transaction group.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::TransactionNotFound`] when a member reference
    /// does not resolve.
    fn create_group(&mut self, name: &str, members: &[String]) -> Result<(), LedgerError>;

    /// Marks a transaction reversed, linking the reversal reference.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::TransactionNotFound`] when the reference does
    /// not resolve.
    fn mark_reversed(&mut self, reference: &str, reversal_reference: &str)
    -> Result<(), LedgerError>;

    /// Marks a transaction completed, linking the completion reference.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::TransactionNotFound`] when the reference does
    /// not resolve.
    fn mark_completed(
        &mut self,
        reference: &str,
        completion_reference: &str,
    ) -> Result<(), LedgerError>;
}

/// In-memory transaction store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    transactions: BTreeMap<String, GlTransaction>,
    groups: BTreeMap<String, Vec<String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of posted transactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// True when nothing has been posted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl TransactionStore for MemoryStore {
    fn post(&mut self, transaction: GlTransaction) -> Result<(), LedgerError> {
        transaction.validate_balanced()?;
        if self.transactions.contains_key(&transaction.detail) {
            return Err(LedgerError::DuplicateReference(transaction.detail));
        }
        self.transactions
            .insert(transaction.detail.clone(), transaction);
        Ok(())
    }

    fn find_by_reference(&self, reference: &str) -> Option<GlTransaction> {
        self.transactions.get(reference).cloned()
    }

    fn find_group(&self, name: &str) -> Option<Vec<GlTransaction>> {
        let members = self.groups.get(name)?;
        Some(
            members
                .iter()
                .filter_map(|reference| self.transactions.get(reference).cloned())
                .collect(),
        )
    }

    fn create_group(&mut self, name: &str, members: &[String]) -> Result<(), LedgerError> {
        for member in members {
            if !self.transactions.contains_key(member) {
                return Err(LedgerError::TransactionNotFound(member.clone()));
            }
        }
        let group = self.groups.entry(name.to_string()).or_default();
        for member in members {
            if !group.contains(member) {
                group.push(member.clone());
            }
        }
        Ok(())
    }

    fn mark_reversed(
        &mut self,
        reference: &str,
        reversal_reference: &str,
    ) -> Result<(), LedgerError> {
        let transaction = self
            .transactions
            .get_mut(reference)
            .ok_or_else(|| LedgerError::TransactionNotFound(reference.to_string()))?;
        transaction.state.reversed = true;
        transaction.state.reversal_reference = Some(reversal_reference.to_string());
        Ok(())
    }

    fn mark_completed(
        &mut self,
        reference: &str,
        completion_reference: &str,
    ) -> Result<(), LedgerError> {
        let transaction = self
            .transactions
            .get_mut(reference)
            .ok_or_else(|| LedgerError::TransactionNotFound(reference.to_string()))?;
        transaction.state.completed = true;
        transaction.state.completion_reference = Some(completion_reference.to_string());
        Ok(())
    }
}
