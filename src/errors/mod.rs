//! Error types for the storefront core.
//!
//! Every failure is a typed result; nothing in this crate panics in
//! non-test code. Variants carry enough context (current state, allowed
//! next states, required vs available amounts) for the caller to react.

use crate::implementation::order_management::types::LineStatus;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Storefront-specific errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Lock acquisition failed.
    #[error("Failed to acquire lock")]
    LockError,
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),
    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),
    /// Order line not found.
    #[error("Order line not found: {0}")]
    LineNotFound(String),
    /// Coupon code not found.
    #[error("Coupon not found: {0}")]
    CouponNotFound(String),
    /// Coupon code already registered.
    #[error("Coupon already exists: {0}")]
    CouponAlreadyExists(String),
    /// Checkout attempted with no items.
    #[error("Cart is empty")]
    EmptyCart,
    /// A single stock decrement could not be satisfied.
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        /// Product ID.
        product_id: String,
        /// Units available.
        available:  u32,
        /// Units requested.
        requested:  u32,
    },
    /// One or more priced lines exceed available stock; the whole
    /// operation is rejected, never partially applied.
    #[error("One or more items are out of stock")]
    OutOfStock,
    /// Cash-on-delivery refused above the configured ceiling.
    #[error("Cash on delivery not allowed: amount {amount} exceeds ceiling {ceiling}")]
    CodNotAllowed {
        /// Final payable amount.
        amount:  u64,
        /// Configured COD ceiling.
        ceiling: u64,
    },
    /// Wallet balance is short of the required debit.
    #[error("Insufficient wallet balance: required {required}, available {available}")]
    InsufficientWalletBalance {
        /// Amount to debit.
        required:  u64,
        /// Current balance.
        available: u64,
    },
    /// Coupon failed eligibility checks.
    #[error("Coupon not eligible: {reason}")]
    CouponIneligible {
        /// Why the coupon was rejected.
        reason: String,
    },
    /// Requested line transition is not in the state machine.
    #[error("Invalid transition from {current}: allowed next states {allowed:?}")]
    InvalidTransition {
        /// Current line status.
        current: LineStatus,
        /// Legal next statuses from the current one.
        allowed: Vec<LineStatus>,
    },
    /// Transition exists but is not permitted for this actor.
    #[error("Transition not permitted for this actor")]
    ForbiddenTransition,
    /// Return requested outside the allowed window.
    #[error("Return window closed: delivered {delivered_at}, window {window_days} days")]
    ReturnWindowClosed {
        /// When the line was delivered.
        delivered_at: DateTime<Utc>,
        /// Configured window length.
        window_days:  u32,
    },
    /// Line is not in the state the operation requires.
    #[error("Line is in the wrong state: {0}")]
    WrongState(LineStatus),
    /// Gateway signature did not match.
    #[error("Payment signature mismatch")]
    SignatureMismatch,
    /// Payment was already verified for this order.
    #[error("Payment already verified")]
    AlreadyVerified,
    /// Online-payment retry budget exhausted.
    #[error("Payment retry limit exceeded: {attempts} of {max} attempts used")]
    RetryLimitExceeded {
        /// Attempts already made.
        attempts: u32,
        /// Configured maximum.
        max:      u32,
    },
    /// Retry requested for a payment that has not failed.
    #[error("Payment is not in a failed state")]
    NotFailed,
    /// Payment gateway call failed.
    #[error("Payment gateway unavailable: {0}")]
    PaymentGatewayUnavailable(String),
    /// Gateway secret or configuration missing.
    #[error("Payment gateway not configured")]
    NotConfigured,
    /// Bad input shape or missing required field.
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Result type for storefront operations.
pub type StoreResult<T> = Result<T, StoreError>;
