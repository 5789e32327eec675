//! Payment gateway abstraction.
//!
//! Online payments go through an external gateway: an intent is created
//! for the final amount, and a later callback carries an HMAC-SHA256
//! signature over `{order_ref}|{payment_ref}` that must match before the
//! payment is treated as collected.

use std::sync::{Arc, Mutex};

use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::errors::{StoreError, StoreResult};

type HmacSha256 = Hmac<Sha256>;

/// A payment intent created at the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Gateway-side reference for this payment.
    pub id:       String,
    /// Amount to collect, in minor units.
    pub amount:   u64,
    /// ISO 4217 currency code.
    pub currency: String,
}

/// Verification callback payload, as supplied by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    /// Gateway order reference attached at intent creation.
    pub gateway_order_id:   String,
    /// Gateway payment reference for the completed charge.
    pub gateway_payment_id: String,
    /// Hex HMAC-SHA256 signature over `{gateway_order_id}|{gateway_payment_id}`.
    pub signature:          String,
}

/// External payment gateway.
pub trait PaymentGateway: Send + Sync + std::fmt::Debug {
    /// Creates a payment intent for the given amount.
    fn create_intent(
        &self, amount: u64, currency: &str, reference: &str,
    ) -> StoreResult<PaymentIntent>;

    /// The shared secret used to verify callback signatures, if configured.
    fn webhook_secret(&self) -> Option<&str>;
}

/// Signs `{order_ref}|{payment_ref}` with HMAC-SHA256, hex-encoded.
pub fn sign_payload(secret: &str, order_ref: &str, payment_ref: &str) -> StoreResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| StoreError::NotConfigured)?;
    mac.update(order_ref.as_bytes());
    mac.update(b"|");
    mac.update(payment_ref.as_bytes());

    let bytes = mac.finalize().into_bytes();
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    Ok(out)
}

/// Whether a gateway-supplied signature matches the expected one.
///
/// Constant-time comparison; never short-circuits on the first
/// differing byte.
#[must_use]
pub fn signature_matches(expected: &str, supplied: &str) -> bool {
    constant_time_eq(expected.as_bytes(), supplied.as_bytes())
}

/// Deterministic in-memory gateway.
///
/// Issues sequential intent IDs and can be flipped unavailable to
/// exercise the gateway-failure paths.
#[derive(Debug)]
pub struct MockGateway {
    secret:    Option<String>,
    counter:   Arc<Mutex<u64>>,
    available: Arc<Mutex<bool>>,
}

impl MockGateway {
    /// Creates a mock gateway with a webhook secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret:    Some(secret.into()),
            counter:   Arc::new(Mutex::new(0)),
            available: Arc::new(Mutex::new(true)),
        }
    }

    /// Creates a mock gateway with no secret configured.
    #[must_use]
    pub fn without_secret() -> Self {
        Self {
            secret:    None,
            counter:   Arc::new(Mutex::new(0)),
            available: Arc::new(Mutex::new(true)),
        }
    }

    /// Simulates the gateway going down or coming back.
    pub fn set_available(&self, available: bool) -> StoreResult<()> {
        let mut flag = self.available.lock().map_err(|_| StoreError::LockError)?;
        *flag = available;
        Ok(())
    }
}

impl PaymentGateway for MockGateway {
    fn create_intent(
        &self, amount: u64, currency: &str, reference: &str,
    ) -> StoreResult<PaymentIntent> {
        let available = self.available.lock().map_err(|_| StoreError::LockError)?;
        if !*available {
            return Err(StoreError::PaymentGatewayUnavailable(
                "gateway is offline".to_string(),
            ));
        }

        let mut counter = self.counter.lock().map_err(|_| StoreError::LockError)?;
        *counter += 1;
        tracing::debug!(amount, currency, reference, intent = *counter, "payment intent created");
        Ok(PaymentIntent {
            id: format!("pay_{counter}"),
            amount,
            currency: currency.to_string(),
        })
    }

    fn webhook_secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }
}
