//! Exact-precision money arithmetic.
//!
//! Amounts are `u64` minor currency units. Proportional computations go
//! through `u128` intermediates with round-half-up, never binary floats.

/// Computes `value * numerator / denominator`, rounded half-up.
///
/// Returns 0 when the denominator is 0.
#[must_use]
pub fn proportional(value: u64, numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    let scaled = u128::from(value) * u128::from(numerator) + u128::from(denominator) / 2;
    // Cannot overflow u64: result <= value when numerator <= denominator,
    // and realistic monetary inputs stay far below u64::MAX otherwise.
    (scaled / u128::from(denominator)) as u64
}

/// Line total for a unit price and quantity.
#[must_use]
pub fn line_total(unit_price: u64, quantity: u32) -> u64 {
    unit_price.saturating_mul(u64::from(quantity))
}

// ============================================================================
// TESTS
// ============================================================================
