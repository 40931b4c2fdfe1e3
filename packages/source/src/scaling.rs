//! Magnitude-coded damage amounts.
//!
//! The storm database records damage as a mantissa plus a one-letter
//! magnitude (`25` + `K` is $25,000). Only `B`, `M` and `K` are accepted;
//! callers are expected to have filtered out anything else before scaling.

use storm_impact_source_models::{DamageUnit, InvalidUnitError};

/// Converts `amount` in units of `suffix` to an absolute amount.
///
/// # Errors
///
/// Returns [`InvalidUnitError`] if `suffix` is not `B`, `M` or `K` (in
/// either case).
pub fn scale(amount: f64, suffix: &str) -> Result<f64, InvalidUnitError> {
    Ok(DamageUnit::from_suffix(suffix)?.apply(amount))
}

/// Returns `true` if `suffix` is an accepted magnitude code.
#[must_use]
pub fn is_valid_suffix(suffix: &str) -> bool {
    DamageUnit::from_suffix(suffix).is_ok()
}
