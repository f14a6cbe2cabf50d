//! Currencies and their layer bands.

use serde::{Deserialize, Serialize};

use crate::chart::error::ChartError;
use crate::layer::{LayerId, LayerKind, OFFSET_STRIDE};

/// A configured currency.
///
/// The numeric id doubles as the currency's base layer. Real ISO 4217
/// numeric codes are below 1000, which keeps every currency's layer band
/// disjoint from every other's; [`validate_layer_spacing`] rejects any
/// configuration that breaks this assumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// ISO 4217 numeric code (e.g. 840 for USD, 566 for NGN).
    pub id: u16,
    /// ISO 4217 alpha code (e.g. "USD", "NGN").
    pub name: String,
}

impl Currency {
    /// Creates a currency.
    #[must_use]
    pub fn new(id: u16, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// The base layer for this currency.
    ///
    /// # Errors
    ///
    /// Returns an error when the numeric code does not fit a layer id.
    pub fn base_layer(&self) -> Result<LayerId, ChartError> {
        LayerId::try_from(self.id).map_err(|_| ChartError::BaseLayerOutOfRange {
            currency: self.name.clone(),
            id: self.id,
        })
    }
}

/// Validates that no two currencies' computed layer bands overlap.
///
/// Layers are `base + offset` with offsets `0, 1000, ..., 6000`, so two
/// bands collide exactly when the base-layer difference is a multiple of
/// the offset stride no larger than the largest offset.
///
/// # Errors
///
/// Returns the first offending pair, or an out-of-range numeric code.
pub fn validate_layer_spacing(currencies: &[Currency]) -> Result<(), ChartError> {
    let max_offset = LayerKind::Fee.offset();

    for (i, a) in currencies.iter().enumerate() {
        let base_a = a.base_layer()?;
        for b in &currencies[i + 1..] {
            let base_b = b.base_layer()?;
            let diff = (i32::from(base_a) - i32::from(base_b)).abs();
            if diff % i32::from(OFFSET_STRIDE) == 0 && diff <= i32::from(max_offset) {
                return Err(ChartError::LayerRangeOverlap {
                    a: a.name.clone(),
                    b: b.name.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_layer() {
        let ngn = Currency::new(566, "NGN");
        assert_eq!(ngn.base_layer().unwrap(), 566);
    }

    #[test]
    fn test_iso_numeric_codes_never_collide() {
        // Distinct codes below 1000 always differ by less than one stride.
        let currencies = vec![
            Currency::new(840, "USD"),
            Currency::new(978, "EUR"),
            Currency::new(566, "NGN"),
            Currency::new(826, "GBP"),
        ];
        assert!(validate_layer_spacing(&currencies).is_ok());
    }

    #[test]
    fn test_identical_base_layers_rejected() {
        let currencies = vec![Currency::new(840, "USD"), Currency::new(840, "USX")];
        assert!(matches!(
            validate_layer_spacing(&currencies),
            Err(ChartError::LayerRangeOverlap { .. })
        ));
    }

    #[test]
    fn test_stride_separated_bases_rejected() {
        // 1566 == 566 + Pending offset: NGN's pending layer would be XAA's base.
        let currencies = vec![Currency::new(566, "NGN"), Currency::new(1566, "XAA")];
        assert!(matches!(
            validate_layer_spacing(&currencies),
            Err(ChartError::LayerRangeOverlap { .. })
        ));
    }

    #[test]
    fn test_far_apart_bases_accepted() {
        // 8000 is beyond the Fee offset from 566, so the bands are disjoint.
        let currencies = vec![Currency::new(566, "NGN"), Currency::new(8000, "XTS")];
        assert!(validate_layer_spacing(&currencies).is_ok());
    }

    #[test]
    fn test_non_stride_offset_accepted() {
        let currencies = vec![Currency::new(566, "NGN"), Currency::new(1567, "XTT")];
        assert!(validate_layer_spacing(&currencies).is_ok());
    }
}
