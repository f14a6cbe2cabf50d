//! Transaction context assembly.
//!
//! The context is built once per creation request and is immutable from
//! then on: accounts, currencies, and bridge pairs are resolved up front so
//! a missing code aborts the whole operation before anything is built.

use std::collections::{BTreeMap, BTreeSet};

use crate::chart::{Account, BridgeAccounts, Chart, ChartDirectory, Currency, resolve_bridges};
use crate::layer::LayerId;
use crate::ledger::error::LedgerError;
use crate::ledger::strategy::DispatchKey;
use crate::ledger::types::{CreateTransactionRequest, EntryRequest, TransactionGroup};

/// Immutable context for one lifecycle operation.
#[derive(Debug, Clone)]
pub struct TransactionContext {
    /// Whether the transfer lands on the pending layer.
    pub is_pending: bool,
    /// The chart being posted to.
    pub chart: Chart,
    /// Resolved currencies by ISO alpha code.
    pub currencies: BTreeMap<String, Currency>,
    /// Resolved final accounts by code.
    pub accounts: BTreeMap<String, Account>,
    /// Bridge pairs by account code.
    pub bridge_accounts: BTreeMap<String, BridgeAccounts>,
    /// Opaque transaction kind.
    pub kind: String,
    /// Transaction group.
    pub group: TransactionGroup,
}

impl TransactionContext {
    /// Builds the full context for a creation request.
    ///
    /// # Errors
    ///
    /// Returns a not-found error naming the first unresolvable account or
    /// currency code.
    pub fn build(
        request: &CreateTransactionRequest,
        chart: &Chart,
        directory: &impl ChartDirectory,
    ) -> Result<Self, LedgerError> {
        let account_codes: BTreeSet<String> = request
            .entries
            .iter()
            .flat_map(|e| [e.credit_account.clone(), e.debit_account.clone()])
            .collect();

        let accounts = directory.final_accounts_by_codes(&account_codes);
        for code in &account_codes {
            if !accounts.contains_key(code) {
                return Err(LedgerError::AccountNotFound(code.clone()));
            }
        }

        let currency_names: BTreeSet<String> =
            accounts.values().map(|a| a.currency.clone()).collect();
        let currencies = directory.currencies_by_names(&currency_names);
        for name in &currency_names {
            if !currencies.contains_key(name) {
                return Err(LedgerError::CurrencyNotFound(name.clone()));
            }
        }

        // Accounts without a bridge pair stay out of the map: the direct
        // strategy treats bridges as optional, and the pending strategies
        // fail explicitly when they need one the chart does not carry.
        let mut bridge_accounts = BTreeMap::new();
        for account in accounts.values() {
            if let Ok(bridges) = resolve_bridges(account, chart) {
                bridge_accounts.insert(account.code.clone(), bridges);
            }
        }

        Ok(Self {
            is_pending: request.pending,
            chart: chart.clone(),
            currencies,
            accounts,
            bridge_accounts,
            kind: request.kind.clone(),
            group: request.group,
        })
    }

    /// Builds the minimal context used by completion: no resolved maps,
    /// just the dispatch inputs and the chart root.
    #[must_use]
    pub fn minimal(
        is_pending: bool,
        chart: Chart,
        group: TransactionGroup,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            is_pending,
            chart,
            currencies: BTreeMap::new(),
            accounts: BTreeMap::new(),
            bridge_accounts: BTreeMap::new(),
            kind: kind.into(),
            group,
        }
    }

    /// The strategy dispatch key for this context.
    #[must_use]
    pub fn dispatch_key(&self) -> DispatchKey {
        DispatchKey {
            kind: self.kind.clone(),
            group: self.group,
            is_pending: self.is_pending,
        }
    }

    /// Currency base layers by ISO alpha code.
    ///
    /// # Errors
    ///
    /// Returns a chart error when a currency's numeric code cannot serve as
    /// a base layer.
    pub fn currency_layers(&self) -> Result<BTreeMap<String, LayerId>, LedgerError> {
        let mut layers = BTreeMap::new();
        for (name, currency) in &self.currencies {
            layers.insert(name.clone(), currency.base_layer()?);
        }
        Ok(layers)
    }

    /// Assembles the strategy payload for one entry request.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the entry references an account or
    /// currency the context does not carry.
    pub fn payload(&self, entry: &EntryRequest) -> Result<EntryPayload, LedgerError> {
        let credit_account = self
            .accounts
            .get(&entry.credit_account)
            .cloned()
            .ok_or_else(|| LedgerError::AccountNotFound(entry.credit_account.clone()))?;
        let debit_account = self
            .accounts
            .get(&entry.debit_account)
            .cloned()
            .ok_or_else(|| LedgerError::AccountNotFound(entry.debit_account.clone()))?;
        let currency = self
            .currencies
            .get(&entry.amount.currency)
            .cloned()
            .ok_or_else(|| LedgerError::CurrencyNotFound(entry.amount.currency.clone()))?;

        // Bridges are resolved for the debit account; completion relies on
        // getting the same pair creation used.
        let bridges = self.bridge_accounts.get(&entry.debit_account);

        Ok(EntryPayload {
            entry: entry.clone(),
            currency,
            debit_account,
            credit_account,
            bridge_asset: bridges.map(|b| b.asset.clone()),
            bridge_liability: bridges.map(|b| b.liability.clone()),
        })
    }
}

/// Everything a strategy needs to emit specs for one entry request.
#[derive(Debug, Clone)]
pub struct EntryPayload {
    /// The entry request.
    pub entry: EntryRequest,
    /// The entry's currency.
    pub currency: Currency,
    /// Resolved debit account.
    pub debit_account: Account,
    /// Resolved credit account.
    pub credit_account: Account,
    /// Asset-side bridge for the debit account, when resolved.
    pub bridge_asset: Option<Account>,
    /// Liability-side bridge for the debit account, when resolved.
    pub bridge_liability: Option<Account>,
}

impl EntryPayload {
    /// The base layer of the entry's currency.
    ///
    /// # Errors
    ///
    /// Returns a chart error when the currency's numeric code cannot serve
    /// as a base layer.
    pub fn base_layer(&self) -> Result<LayerId, LedgerError> {
        Ok(self.currency.base_layer()?)
    }

    /// The asset bridge, or an error naming the debit account.
    pub fn require_bridge_asset(&self) -> Result<Account, LedgerError> {
        self.bridge_asset
            .clone()
            .ok_or_else(|| LedgerError::MissingBridgeAccount {
                account: self.debit_account.code.clone(),
                side: "asset",
            })
    }

    /// The liability bridge, or an error naming the debit account.
    pub fn require_bridge_liability(&self) -> Result<Account, LedgerError> {
        self.bridge_liability
            .clone()
            .ok_or_else(|| LedgerError::MissingBridgeAccount {
                account: self.debit_account.code.clone(),
                side: "liability",
            })
    }
}
