//! Chart error types.

use thiserror::Error;

/// Errors raised by chart configuration and bridge resolution.
#[derive(Debug, Error)]
pub enum ChartError {
    /// Two configured currencies own overlapping layer bands.
    #[error("Layer bands of currencies {a} and {b} overlap")]
    LayerRangeOverlap {
        /// First currency name.
        a: String,
        /// Second currency name.
        b: String,
    },

    /// A currency's numeric code cannot serve as a base layer.
    #[error("Currency {currency} has numeric code {id}, which is not usable as a base layer")]
    BaseLayerOutOfRange {
        /// Currency name.
        currency: String,
        /// Offending numeric code.
        id: u16,
    },

    /// No bridge account of the requested side exists for the account's currency.
    #[error("No {side} bridge account for {account} ({currency}) in chart")]
    BridgeNotFound {
        /// Account code the bridge was resolved for.
        account: String,
        /// The account's currency.
        currency: String,
        /// Bridge side ("asset" or "liability").
        side: &'static str,
    },
}
