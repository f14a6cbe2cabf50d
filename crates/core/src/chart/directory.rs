//! Chart directory collaborator.
//!
//! The engine never provisions accounts, currencies, or journals; it reads
//! them through this trait. The in-memory implementation backs the test
//! suite and small single-process deployments.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strata_shared::types::JournalId;

use crate::chart::account::{Account, Chart};
use crate::chart::currency::{Currency, validate_layer_spacing};
use crate::chart::error::ChartError;

/// A journal: the posting scope for one chart of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    /// Unique journal id.
    pub id: JournalId,
    /// Journal name.
    pub name: String,
    /// Code of the chart this journal posts to.
    pub chart: String,
}

/// Read access to charts, accounts, currencies, and journals.
pub trait ChartDirectory {
    /// Looks up a chart by code.
    fn chart(&self, code: &str) -> Option<Chart>;

    /// Resolves final accounts for a set of codes. Codes with no final
    /// account are absent from the result.
    fn final_accounts_by_codes(&self, codes: &BTreeSet<String>) -> BTreeMap<String, Account>;

    /// Resolves currencies for a set of ISO alpha codes. Unknown codes are
    /// absent from the result.
    fn currencies_by_names(&self, names: &BTreeSet<String>) -> BTreeMap<String, Currency>;

    /// Looks up the journal posting to a chart.
    fn journal_for_chart(&self, chart_code: &str) -> Option<Journal>;
}

/// In-memory chart directory.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    charts: BTreeMap<String, Chart>,
    currencies: BTreeMap<String, Currency>,
    journals: BTreeMap<String, Journal>,
}

impl MemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a chart.
    pub fn add_chart(&mut self, chart: Chart) {
        self.charts.insert(chart.code.clone(), chart);
    }

    /// Registers a currency, revalidating layer spacing across the whole set.
    ///
    /// # Errors
    ///
    /// Returns an error when the new currency's layer band overlaps a
    /// registered one.
    pub fn add_currency(&mut self, currency: Currency) -> Result<(), ChartError> {
        let mut all: Vec<Currency> = self.currencies.values().cloned().collect();
        all.push(currency.clone());
        validate_layer_spacing(&all)?;
        self.currencies.insert(currency.name.clone(), currency);
        Ok(())
    }

    /// Registers a journal for a chart.
    pub fn add_journal(&mut self, journal: Journal) {
        self.journals.insert(journal.chart.clone(), journal);
    }
}

impl ChartDirectory for MemoryDirectory {
    fn chart(&self, code: &str) -> Option<Chart> {
        self.charts.get(code).cloned()
    }

    fn final_accounts_by_codes(&self, codes: &BTreeSet<String>) -> BTreeMap<String, Account> {
        let mut found = BTreeMap::new();
        for chart in self.charts.values() {
            for code in codes {
                if let Some(account) = chart.account(code) {
                    found.insert(code.clone(), account.clone());
                }
            }
        }
        found
    }

    fn currencies_by_names(&self, names: &BTreeSet<String>) -> BTreeMap<String, Currency> {
        names
            .iter()
            .filter_map(|name| self.currencies.get(name).map(|c| (name.clone(), c.clone())))
            .collect()
    }

    fn journal_for_chart(&self, chart_code: &str) -> Option<Journal> {
        self.journals.get(chart_code).cloned()
    }
}
