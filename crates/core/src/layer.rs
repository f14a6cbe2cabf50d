//! Ledger layer offsets and layer computation.
//!
//! Every currency owns a contiguous band of layers: the currency's numeric
//! code is its *base layer*, and each [`LayerKind`] adds a fixed offset on
//! top of it. Offsets are a closed enumeration passed explicitly into layer
//! computation - there are no ambient layer constants anywhere else in the
//! engine.

use serde::{Deserialize, Serialize};

/// Identifier of a ledger layer. `layer = currency base layer + offset`.
pub type LayerId = i16;

/// Distance between consecutive layer offsets.
pub const OFFSET_STRIDE: i16 = 1000;

/// The closed set of layer offsets within a currency's band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Available funds.
    Base,
    /// Funds awaiting completion.
    Pending,
    /// Credit allowances.
    CreditAllowances,
    /// Funds on hold.
    OnHold,
    /// Daily limit tracking.
    DailyLimit,
    /// Cumulative limit tracking.
    CumulativeLimit,
    /// Fee accrual.
    Fee,
}

impl LayerKind {
    /// All layer kinds, in offset order.
    pub const ALL: [LayerKind; 7] = [
        LayerKind::Base,
        LayerKind::Pending,
        LayerKind::CreditAllowances,
        LayerKind::OnHold,
        LayerKind::DailyLimit,
        LayerKind::CumulativeLimit,
        LayerKind::Fee,
    ];

    /// The offset this kind adds to a currency's base layer.
    #[must_use]
    pub const fn offset(self) -> i16 {
        match self {
            LayerKind::Base => 0,
            LayerKind::Pending => 1000,
            LayerKind::CreditAllowances => 2000,
            LayerKind::OnHold => 3000,
            LayerKind::DailyLimit => 4000,
            LayerKind::CumulativeLimit => 5000,
            LayerKind::Fee => 6000,
        }
    }

    /// Computes the concrete layer id for a currency base layer.
    #[must_use]
    pub const fn layer(self, base: LayerId) -> LayerId {
        base + self.offset()
    }

    /// Decomposes a layer id against a base layer.
    ///
    /// Returns `None` when the layer does not belong to the base layer's band.
    #[must_use]
    pub fn of(layer: LayerId, base: LayerId) -> Option<LayerKind> {
        LayerKind::ALL.into_iter().find(|k| k.layer(base) == layer)
    }

    /// Human-readable name, used by the movement diagnostic.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            LayerKind::Base => "Base",
            LayerKind::Pending => "Pending",
            LayerKind::CreditAllowances => "Credit Allowances",
            LayerKind::OnHold => "On Hold",
            LayerKind::DailyLimit => "Daily Limit",
            LayerKind::CumulativeLimit => "Cumulative Limit",
            LayerKind::Fee => "Fee",
        }
    }
}

/// All non-base layer ids for a currency base layer, in offset order.
#[must_use]
pub fn offset_layers(base: LayerId) -> Vec<LayerId> {
    LayerKind::ALL
        .into_iter()
        .filter(|k| *k != LayerKind::Base)
        .map(|k| k.layer(base))
        .collect()
}
