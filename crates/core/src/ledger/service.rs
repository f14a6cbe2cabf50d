//! The transaction lifecycle: create, reverse, complete.
//!
//! Every operation resolves its inputs up front, fails with nothing
//! persisted on any not-found or inconsistent state, and refreshes balance
//! snapshots after posting. Idempotent re-invocation (already reversed,
//! already completed) is the only silent success path.

use std::collections::{BTreeMap, BTreeSet};

use strata_shared::Tags;
use strata_shared::config::LedgerConfig;
use uuid::Uuid;

use crate::chart::{Chart, ChartDirectory};
use crate::layer::{LayerId, LayerKind};
use crate::ledger::context::TransactionContext;
use crate::ledger::error::LedgerError;
use crate::ledger::executor::EntrySpecExecutor;
use crate::ledger::movement::MovementPrinter;
use crate::ledger::repository::LedgerRepository;
use crate::ledger::snapshot::SnapshotMaintainer;
use crate::ledger::store::TransactionStore;
use crate::ledger::strategy::StrategyRegistry;
use crate::ledger::transaction::GlTransaction;
use crate::ledger::types::{
    CreateTransactionRequest, STATUS_ALREADY_COMPLETED, STATUS_ALREADY_REVERSED, TransactionDetail,
};
use crate::ledger::validation::{CompositeValidator, ValidationContext};

/// The ledger transaction lifecycle service.
pub struct TransactionService<S, M, D>
where
    S: TransactionStore,
    M: SnapshotMaintainer,
    D: ChartDirectory,
{
    pub(crate) repository: LedgerRepository<S>,
    pub(crate) directory: D,
    pub(crate) registry: StrategyRegistry,
    pub(crate) validator: CompositeValidator,
    pub(crate) snapshots: M,
    pub(crate) printer: MovementPrinter,
}

impl<S, M, D> TransactionService<S, M, D>
where
    S: TransactionStore,
    M: SnapshotMaintainer,
    D: ChartDirectory,
{
    /// Creates a service with the standard strategy set and validators.
    pub fn new(store: S, directory: D, snapshots: M, config: &LedgerConfig) -> Self {
        Self {
            repository: LedgerRepository::new(store),
            directory,
            registry: StrategyRegistry::standard(),
            validator: CompositeValidator::standard(config),
            snapshots,
            printer: MovementPrinter::new(config.print_movements),
        }
    }

    /// Read access to the repository.
    pub fn repository(&self) -> &LedgerRepository<S> {
        &self.repository
    }

    /// Read access to the snapshot maintainer.
    pub fn snapshots(&self) -> &M {
        &self.snapshots
    }

    /// Creates and posts a transaction for `request` against `chart`.
    ///
    /// Context assembly resolves every referenced account, currency, and
    /// bridge pair; validation runs before any entry is built; strategies
    /// emit the layered entries; the store enforces the per-layer balance
    /// law at post time.
    ///
    /// # Errors
    ///
    /// Any unresolvable code, validator rejection, dispatch failure, or
    /// balance violation aborts with nothing persisted.
    pub fn create_transaction(
        &mut self,
        request: &CreateTransactionRequest,
        chart: &Chart,
    ) -> Result<TransactionDetail, LedgerError> {
        let context = TransactionContext::build(request, chart, &self.directory)?;
        self.validator
            .validate(request, &ValidationContext::new(&context))?;

        let journal = self.directory.journal_for_chart(&chart.code).ok_or_else(|| {
            LedgerError::JournalNotFound {
                chart: chart.code.clone(),
            }
        })?;

        let mut transaction = GlTransaction::new(&request.reference, journal.id);
        transaction.tags = request
            .metadata
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Tags>();

        let key = context.dispatch_key();
        for entry_request in &request.entries {
            let payload = context.payload(entry_request)?;
            let strategy = self.registry.select(&key)?;
            let specs = strategy.create_entries(&payload)?;
            EntrySpecExecutor::execute(&mut transaction, specs)?;
        }
        transaction.state.group = Some(request.group);
        transaction.state.kind = Some(request.kind.clone());

        let currency_layers = context.currency_layers()?;
        self.printer
            .print(&transaction, "pre-created", &currency_layers);

        let posted = transaction.clone();
        self.repository.post_transaction(transaction)?;
        self.snapshots.update_snapshots_after_transaction(&posted)?;
        self.printer.print(&posted, "created", &currency_layers);

        let mut metadata = request.metadata.clone();
        metadata.insert("account_ids".to_string(), joined_account_ids(&posted));
        metadata.insert("transactions".to_string(), posted.detail.clone());
        Ok(TransactionDetail::new(&request.reference, metadata))
    }

    /// Reverses the transaction (or transaction group) under `reference`.
    ///
    /// Group reversal is all-or-nothing: a group with every member already
    /// reversed short-circuits idempotently, a partially reversed group
    /// fails, and an unreversed group is reversed member by member, most
    /// recent post date first. Single reversal uses the caller-supplied
    /// `reversal_reference`; group members each get a fresh random one.
    ///
    /// # Errors
    ///
    /// [`LedgerError::TransactionNotFound`] when nothing carries the
    /// reference, [`LedgerError::PartialGroupReversal`] for inconsistent
    /// groups.
    pub fn reverse_transaction(
        &mut self,
        reference: &str,
        reversal_reference: &str,
    ) -> Result<TransactionDetail, LedgerError> {
        if let Some(members) = self.repository.find_group(reference) {
            return self.reverse_group(reference, &members);
        }
        self.reverse_single(reference, reversal_reference)
    }

    fn reverse_group(
        &mut self,
        reference: &str,
        members: &[GlTransaction],
    ) -> Result<TransactionDetail, LedgerError> {
        let reversed = members.iter().filter(|t| t.state.reversed).count();

        if reversed == members.len() {
            let mut metadata = BTreeMap::new();
            metadata.insert("account_ids".to_string(), group_account_ids(members));
            metadata.insert("transactions".to_string(), group_references(members));
            metadata.insert("status".to_string(), STATUS_ALREADY_REVERSED.to_string());
            return Ok(TransactionDetail::new(reference, metadata));
        }
        if reversed > 0 {
            return Err(LedgerError::PartialGroupReversal(reference.to_string()));
        }

        let mut new_references = Vec::new();
        for member in reversal_order(members) {
            let fresh_reference = Uuid::new_v4().to_string();
            new_references.push(
                self.repository
                    .reverse_transaction(&member, &fresh_reference)?,
            );
        }

        for new_reference in &new_references {
            let reversal = self
                .repository
                .find_by_reference(new_reference)
                .ok_or_else(|| LedgerError::TransactionNotFound(new_reference.clone()))?;
            self.snapshots
                .update_snapshots_after_transaction(&reversal)?;
        }
        for member in members {
            if let Some(refreshed) = self.repository.find_by_reference(&member.detail) {
                self.snapshots
                    .update_snapshots_after_transaction(&refreshed)?;
                self.printer
                    .print(&refreshed, "reversed (group)", &BTreeMap::new());
            }
        }

        let mut metadata = BTreeMap::new();
        metadata.insert("account_ids".to_string(), group_account_ids(members));
        metadata.insert("transactions".to_string(), new_references.join(","));
        Ok(TransactionDetail::new(reference, metadata))
    }

    fn reverse_single(
        &mut self,
        reference: &str,
        reversal_reference: &str,
    ) -> Result<TransactionDetail, LedgerError> {
        let transaction = self
            .repository
            .find_by_reference(reference)
            .ok_or_else(|| LedgerError::TransactionNotFound(reference.to_string()))?;

        if transaction.state.reversed {
            let mut metadata = BTreeMap::new();
            metadata.insert("account_ids".to_string(), joined_account_ids(&transaction));
            metadata.insert("transactions".to_string(), reference.to_string());
            metadata.insert("status".to_string(), STATUS_ALREADY_REVERSED.to_string());
            return Ok(TransactionDetail::new(reference, metadata));
        }

        self.repository
            .reverse_transaction(&transaction, reversal_reference)?;

        let reversal = self
            .repository
            .find_by_reference(reversal_reference)
            .ok_or_else(|| LedgerError::TransactionNotFound(reversal_reference.to_string()))?;
        self.snapshots
            .update_snapshots_after_transaction(&reversal)?;
        self.printer.print(&reversal, "reversed", &BTreeMap::new());

        let mut metadata = BTreeMap::new();
        metadata.insert("account_ids".to_string(), joined_account_ids(&transaction));
        metadata.insert(
            "transactions".to_string(),
            format!("{reference},{reversal_reference}"),
        );
        Ok(TransactionDetail::new(reversal_reference, metadata))
    }

    /// Completes the pending transaction under `reference`.
    ///
    /// The completion-capable strategy moves the staged amounts out of the
    /// offset layers onto the base layer in a new transaction, which is
    /// grouped with the original under the original's reference.
    ///
    /// # Errors
    ///
    /// [`LedgerError::TransactionNotFound`] for an unknown reference;
    /// [`LedgerError::MissingGroupState`] / [`LedgerError::MissingKindState`]
    /// when the transaction lacks the markers completion needs.
    pub fn complete_transaction(
        &mut self,
        reference: &str,
    ) -> Result<TransactionDetail, LedgerError> {
        let transaction = self
            .repository
            .find_by_reference(reference)
            .ok_or_else(|| LedgerError::TransactionNotFound(reference.to_string()))?;

        if transaction.state.completed {
            let mut metadata = BTreeMap::new();
            metadata.insert("account_ids".to_string(), joined_account_ids(&transaction));
            metadata.insert("transactions".to_string(), reference.to_string());
            metadata.insert("status".to_string(), STATUS_ALREADY_COMPLETED.to_string());
            return Ok(TransactionDetail::new(reference, metadata));
        }

        let currency_names: BTreeSet<String> = transaction
            .entries
            .iter()
            .map(|e| e.account.currency.clone())
            .collect();
        let currencies = self.directory.currencies_by_names(&currency_names);
        let mut currency_layers: BTreeMap<String, LayerId> = BTreeMap::new();
        for name in &currency_names {
            let currency = currencies
                .get(name)
                .ok_or_else(|| LedgerError::CurrencyNotFound(name.clone()))?;
            currency_layers.insert(name.clone(), currency.base_layer()?);
        }

        let group = transaction
            .state
            .group
            .ok_or_else(|| LedgerError::MissingGroupState(reference.to_string()))?;
        let kind = transaction
            .state
            .kind
            .clone()
            .ok_or_else(|| LedgerError::MissingKindState(reference.to_string()))?;

        let first_entry = transaction
            .entries
            .first()
            .ok_or_else(|| LedgerError::NoEntries(reference.to_string()))?;
        let chart = self
            .directory
            .chart(&first_entry.account.chart)
            .ok_or_else(|| LedgerError::ChartNotFound(first_entry.account.chart.clone()))?;

        let is_pending = transaction.entries.iter().any(|entry| {
            currency_layers
                .values()
                .any(|base| entry.layer == LayerKind::Pending.layer(*base))
        });

        let mut completion = GlTransaction::new(Uuid::new_v4().to_string(), transaction.journal);
        completion.tags = transaction.tags.clone();
        completion.state.group = Some(group);
        completion.state.kind = Some(kind.clone());
        completion.state.completes = Some(transaction.detail.clone());

        let context = TransactionContext::minimal(is_pending, chart, group, kind);
        let strategy = self.registry.select(&context.dispatch_key())?;
        strategy.complete(&transaction, &mut completion, &currency_layers)?;

        self.printer
            .print(&completion, "pre-completed", &currency_layers);

        let posted = completion.clone();
        self.repository.complete_transaction(&transaction, completion)?;
        self.snapshots.update_snapshots_after_transaction(&posted)?;
        if let Some(refreshed) = self.repository.find_by_reference(reference) {
            self.snapshots
                .update_snapshots_after_transaction(&refreshed)?;
        }
        self.printer.print(&posted, "completed", &currency_layers);

        let mut metadata = BTreeMap::new();
        metadata.insert("account_ids".to_string(), joined_account_ids(&transaction));
        metadata.insert(
            "transactions".to_string(),
            format!("{reference},{}", posted.detail),
        );
        Ok(TransactionDetail::new(reference, metadata))
    }
}

/// Group members in reversal order: most recent post date first, ties
/// broken by descending transaction id (UUID v7 follows creation order).
pub(crate) fn reversal_order(members: &[GlTransaction]) -> Vec<GlTransaction> {
    let mut ordered = members.to_vec();
    ordered.sort_by(|a, b| b.post_date.cmp(&a.post_date).then(b.id.cmp(&a.id)));
    ordered
}

fn joined_account_ids(transaction: &GlTransaction) -> String {
    transaction
        .account_codes()
        .into_iter()
        .collect::<Vec<_>>()
        .join(",")
}

fn group_account_ids(members: &[GlTransaction]) -> String {
    members
        .iter()
        .map(joined_account_ids)
        .collect::<Vec<_>>()
        .join(",")
}

fn group_references(members: &[GlTransaction]) -> String {
    members
        .iter()
        .map(|t| t.detail.clone())
        .collect::<Vec<_>>()
        .join(",")
}
