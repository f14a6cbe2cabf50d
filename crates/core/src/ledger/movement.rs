//! Movement diagnostic.
//!
//! A disablable debug aid that logs a transaction's movements grouped by
//! layer through `tracing`. Not part of the functional contract; off by
//! default.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::info;

use crate::layer::{LayerId, LayerKind};
use crate::ledger::entry::GlEntry;
use crate::ledger::transaction::GlTransaction;

/// Logs layer-grouped transaction movements.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovementPrinter {
    enabled: bool,
}

impl MovementPrinter {
    /// Creates a printer; `enabled = false` makes every call a no-op.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Logs the movements of `transaction` under an operation label.
    ///
    /// `currency_layers` maps currency names to base layers for layer
    /// naming; unknown layers are labeled by their raw id.
    pub fn print(
        &self,
        transaction: &GlTransaction,
        operation: &str,
        currency_layers: &BTreeMap<String, LayerId>,
    ) {
        if !self.enabled {
            return;
        }

        let mut output = String::new();
        output.push_str(&format!(
            "\n--- Transaction {operation}: {} ---",
            transaction.detail
        ));

        if transaction.entries.iter().any(|e| e.amount < Decimal::ZERO) {
            output.push_str("\nTYPE: REVERSAL");
        }
        if let Some(completes) = &transaction.state.completes {
            output.push_str(&format!("\nCOMPLETES: {completes}"));
        }

        let mut by_layer: BTreeMap<LayerId, Vec<&GlEntry>> = BTreeMap::new();
        for entry in &transaction.entries {
            by_layer.entry(entry.layer).or_default().push(entry);
        }

        for (layer, entries) in &by_layer {
            output.push_str(&format!(
                "\n{} (L{layer}):",
                layer_name(*layer, currency_layers)
            ));
            for entry in entries {
                output.push_str(&format!("\n  {}", format_entry(entry)));
            }

            let debits: Decimal = entries
                .iter()
                .filter(|e| e.is_debit())
                .map(|e| e.amount.abs())
                .sum();
            let credits: Decimal = entries
                .iter()
                .filter(|e| e.is_credit())
                .map(|e| e.amount.abs())
                .sum();
            output.push_str(&format!("\n  Balance: Dr {debits} | Cr {credits}"));
        }

        info!(
            reference = %transaction.detail,
            entries = transaction.entries.len(),
            "{output}"
        );
    }
}

fn layer_name(layer: LayerId, currency_layers: &BTreeMap<String, LayerId>) -> String {
    for base in currency_layers.values() {
        if let Some(kind) = LayerKind::of(layer, *base) {
            return kind.name().to_string();
        }
    }
    format!("Layer {layer}")
}

fn format_entry(entry: &GlEntry) -> String {
    let side = if entry.is_credit() { "CR" } else { "DR" };
    let bridge = if entry.account.is_asset_bridge() {
        "[BridgeAsset] "
    } else if entry.account.is_liability_bridge() {
        "[BridgeLiab] "
    } else {
        ""
    };
    let tags = if entry.tags.is_empty() {
        String::new()
    } else {
        format!(" [tags: {}]", entry.tags.encode())
    };
    format!(
        "{side} {bridge}{} ({}) | {} {}{tags}",
        entry.account.description, entry.account.code, entry.account.currency, entry.amount
    )
}
