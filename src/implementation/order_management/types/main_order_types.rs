//! The central order aggregate type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::basic_types::{OrderId, OrderPaymentStatus, OrderStatus};
use super::order_types::OrderLine;
use crate::implementation::coupon::CouponId;
use crate::types::{PaymentMethod, ShippingAddress, UserId};

/// One purchase transaction.
///
/// `status` and `payment_status` are derived from the line collection and
/// are never written directly outside creation; after every line mutation
/// they are recomputed together. The monetary invariant
/// `final_amount == max(0, total_price - discount - coupon_discount) + shipping_charge`
/// holds after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Internal order ID.
    pub id:               OrderId,
    /// Human-readable order code, unique, generated at creation.
    pub code:             String,
    /// Owning user.
    pub user_id:          UserId,
    /// Shipping address snapshot, not a live reference.
    pub address:          ShippingAddress,
    /// Payment method chosen at checkout.
    pub payment_method:   PaymentMethod,
    /// Derived order status.
    pub status:           OrderStatus,
    /// Derived order payment status.
    pub payment_status:   OrderPaymentStatus,
    /// Ordered line items.
    pub lines:            Vec<OrderLine>,
    /// Sum of base (list) line prices.
    pub total_price:      u64,
    /// Sum of per-line catalog discounts.
    pub discount:         u64,
    /// Applied coupon code, if any.
    pub coupon_code:      Option<String>,
    /// Applied coupon ID, if any.
    pub coupon_id:        Option<CouponId>,
    /// Coupon discount amount.
    pub coupon_discount:  u64,
    /// Wallet balance consumed by this order.
    pub wallet_used:      u64,
    /// Shipping charge.
    pub shipping_charge:  u64,
    /// Final payable amount.
    pub final_amount:     u64,
    /// Gateway payment-intent reference for online payments.
    pub gateway_order_id: Option<String>,
    /// Online-payment retry attempts used.
    pub retry_attempts:   u32,
    /// When the last retry happened.
    pub last_retry_at:    Option<DateTime<Utc>>,
    /// When every active line reached delivered.
    pub delivered_date:   Option<DateTime<Utc>>,
    /// When the order became fully returned.
    pub returned_date:    Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at:       DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at:       DateTime<Utc>,
}
