//! Reversal and completion persistence choreography.
//!
//! The repository owns the additive mechanics: a reversal posts a
//! counter-transaction and marks the original; a completion posts the
//! completion transaction, groups it with the original, and marks the
//! original. Nothing is ever deleted or mutated beyond the state markers.

use chrono::Utc;

use crate::ledger::error::LedgerError;
use crate::ledger::store::TransactionStore;
use crate::ledger::transaction::GlTransaction;

/// Domain-level persistence operations over a [`TransactionStore`].
pub struct LedgerRepository<S: TransactionStore> {
    store: S,
}

impl<S: TransactionStore> LedgerRepository<S> {
    /// Wraps a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Posts a transaction.
    ///
    /// # Errors
    ///
    /// Propagates store rejections (balance violation, duplicate reference).
    pub fn post_transaction(&mut self, transaction: GlTransaction) -> Result<(), LedgerError> {
        self.store.post(transaction)
    }

    /// Finds a transaction by reference.
    pub fn find_by_reference(&self, reference: &str) -> Option<GlTransaction> {
        self.store.find_by_reference(reference)
    }

    /// Finds a transaction group by reference.
    pub fn find_group(&self, reference: &str) -> Option<Vec<GlTransaction>> {
        self.store.find_group(reference)
    }

    /// Posts a reversal of `transaction` under `reversal_reference` and
    /// marks the original reversed.
    ///
    /// The counter-transaction negates every entry on its original side and
    /// layer, keeps entry tags, copies the original's metadata, and records
    /// the reference it reverses.
    ///
    /// # Errors
    ///
    /// Propagates store rejections; the original is only marked after the
    /// reversal posts.
    pub fn reverse_transaction(
        &mut self,
        transaction: &GlTransaction,
        reversal_reference: &str,
    ) -> Result<String, LedgerError> {
        let mut reversal = transaction.create_reverse(true);
        let now = Utc::now();
        reversal.timestamp = now;
        reversal.post_date = now;
        reversal.detail = reversal_reference.to_string();
        reversal.tags = transaction.tags.clone();
        reversal.state.group = transaction.state.group;
        reversal.state.kind = transaction.state.kind.clone();
        reversal.state.reverses = Some(transaction.detail.clone());

        self.store.post(reversal)?;
        self.store
            .mark_reversed(&transaction.detail, reversal_reference)?;

        Ok(reversal_reference.to_string())
    }

    /// Posts `completion`, groups it with the original under the original's
    /// reference, and marks the original completed.
    ///
    /// # Errors
    ///
    /// Propagates store rejections; the original is only marked after the
    /// completion posts.
    pub fn complete_transaction(
        &mut self,
        original: &GlTransaction,
        completion: GlTransaction,
    ) -> Result<(), LedgerError> {
        let completion_reference = completion.detail.clone();

        self.store.post(completion)?;
        self.store.create_group(
            &original.detail,
            &[original.detail.clone(), completion_reference.clone()],
        )?;
        self.store
            .mark_completed(&original.detail, &completion_reference)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Account, AccountNormal};
    use crate::ledger::store::MemoryStore;
    use crate::ledger::types::TransactionGroup;
    use rust_decimal_macros::dec;
    use strata_shared::Tags;
    use strata_shared::types::JournalId;

    fn account(code: &str) -> Account {
        Account::new(code, "wallet", "NGN", AccountNormal::Credit, "main")
    }

    fn posted_transaction(repo: &mut LedgerRepository<MemoryStore>) -> GlTransaction {
        let mut tx = GlTransaction::new("tx-1", JournalId::new());
        tx.tags = Tags::decode("channel:web");
        tx.state.group = Some(TransactionGroup::Transfer);
        tx.state.kind = Some("TRANSFER".to_string());
        tx.create_debit(account("A"), dec!(100), "d", 566);
        tx.create_credit(account("B"), dec!(100), "d", 566);
        repo.post_transaction(tx.clone()).unwrap();
        tx
    }

    #[test]
    fn test_reverse_posts_counter_transaction() {
        let mut repo = LedgerRepository::new(MemoryStore::new());
        let tx = posted_transaction(&mut repo);

        let reference = repo.reverse_transaction(&tx, "rev-1").unwrap();
        assert_eq!(reference, "rev-1");

        let reversal = repo.find_by_reference("rev-1").unwrap();
        assert_eq!(reversal.entries.len(), 2);
        assert_eq!(reversal.entries[0].amount, dec!(-100));
        assert_eq!(reversal.state.reverses.as_deref(), Some("tx-1"));
        // Metadata rides along; the group/kind markers are preserved.
        assert!(reversal.tags.contains("channel:web"));
        assert_eq!(reversal.state.group, Some(TransactionGroup::Transfer));

        let original = repo.find_by_reference("tx-1").unwrap();
        assert!(original.state.reversed);
        assert_eq!(original.state.reversal_reference.as_deref(), Some("rev-1"));
    }

    #[test]
    fn test_reversal_is_additive() {
        let mut repo = LedgerRepository::new(MemoryStore::new());
        let tx = posted_transaction(&mut repo);

        repo.reverse_transaction(&tx, "rev-1").unwrap();

        // The original's entries are untouched.
        let original = repo.find_by_reference("tx-1").unwrap();
        assert_eq!(original.entries.len(), 2);
        assert_eq!(original.entries[0].amount, dec!(100));
        assert_eq!(repo.store().len(), 2);
    }

    #[test]
    fn test_complete_groups_and_marks() {
        let mut repo = LedgerRepository::new(MemoryStore::new());
        let tx = posted_transaction(&mut repo);

        let mut completion = GlTransaction::new("comp-1", tx.journal);
        completion.state.completes = Some(tx.detail.clone());
        repo.complete_transaction(&tx, completion).unwrap();

        let group = repo.find_group("tx-1").unwrap();
        assert_eq!(group.len(), 2);
        assert_eq!(group[0].detail, "tx-1");
        assert_eq!(group[1].detail, "comp-1");

        let original = repo.find_by_reference("tx-1").unwrap();
        assert!(original.state.completed);
        assert_eq!(
            original.state.completion_reference.as_deref(),
            Some("comp-1")
        );
    }
}
