//! Checkout configuration constants.
//!
//! Thresholds and fees are configuration, not hard-coded business law. All
//! monetary values are in minor currency units (e.g. paise, cents).

use serde::{Deserialize, Serialize};

/// Tunable checkout and lifecycle parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Orders with a subtotal at or above this ship for free.
    pub free_shipping_threshold: u64,
    /// Flat shipping fee charged below the free-shipping threshold.
    pub flat_shipping_fee:       u64,
    /// Cash-on-delivery is refused when the final amount exceeds this.
    pub cod_ceiling:             u64,
    /// Days after delivery during which a return may be requested.
    pub return_window_days:      u32,
    /// Maximum number of online-payment retry attempts per order.
    pub max_retry_attempts:      u32,
    /// ISO 4217 currency code passed to the payment gateway.
    pub currency:                String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: 500_00,
            flat_shipping_fee:       50_00,
            cod_ceiling:             1000_00,
            return_window_days:      7,
            max_retry_attempts:      3,
            currency:                "INR".to_string(),
        }
    }
}
