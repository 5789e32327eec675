//! Order implementation.
//!
//! Aggregate-level behaviour: construction from a priced cart, derived
//! state refresh, the monetary invariant, and the per-line refund share.

use chrono::{DateTime, Utc};

use super::status::{recompute_order_payment_status, recompute_order_status};
use crate::implementation::coupon::CouponId;
use crate::implementation::order_management::types::{Order, OrderId, OrderLine, OrderStatus};
use crate::implementation::pricing::PricedCart;
use crate::types::money::proportional;
use crate::types::{PaymentMethod, ShippingAddress, UserId};

impl Order {
    /// Creates an order from a priced cart.
    ///
    /// Line statuses start at `Pending/Pending`; unit offer prices are
    /// frozen from the pricing run.
    #[must_use]
    pub fn from_priced_cart(
        code: String, user_id: UserId, address: ShippingAddress, payment_method: PaymentMethod,
        priced: &PricedCart, coupon: Option<(CouponId, String)>, wallet_used: u64,
        gateway_order_id: Option<String>,
    ) -> Self {
        let now = Utc::now();

        let lines: Vec<OrderLine> = priced
            .lines
            .iter()
            .map(|l| {
                OrderLine::new(
                    l.product_id.clone(),
                    l.variant_id.clone(),
                    l.ml,
                    l.quantity,
                    l.unit_offer_price,
                )
            })
            .collect();

        let (coupon_id, coupon_code) = match coupon {
            Some((id, code)) => (Some(id), Some(code)),
            None => (None, None),
        };

        Self {
            id: OrderId::generate(),
            code,
            user_id,
            address,
            payment_method,
            status: OrderStatus::Pending,
            payment_status: recompute_order_payment_status(&lines),
            lines,
            total_price: priced.total_price,
            discount: priced.discount,
            coupon_code,
            coupon_id,
            coupon_discount: priced.coupon_discount,
            wallet_used,
            shipping_charge: priced.shipping_charge,
            final_amount: priced.final_amount,
            gateway_order_id,
            retry_attempts: 0,
            last_retry_at: None,
            delivered_date: None,
            returned_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Looks up a line by ID.
    #[must_use]
    pub fn line(&self, line_id: &super::super::types::LineId) -> Option<&OrderLine> {
        self.lines.iter().find(|l| &l.id == line_id)
    }

    /// Recomputes both derived statuses from the line collection.
    ///
    /// Sets `delivered_date` / `returned_date` once when the derived
    /// status first reaches the corresponding value.
    pub fn refresh_derived_state(&mut self, now: DateTime<Utc>) {
        self.status = recompute_order_status(&self.lines);
        self.payment_status = recompute_order_payment_status(&self.lines);

        if self.status == OrderStatus::Delivered && self.delivered_date.is_none() {
            self.delivered_date = Some(now);
        }
        if self.status == OrderStatus::Returned && self.returned_date.is_none() {
            self.returned_date = Some(now);
        }
        self.updated_at = now;
    }

    /// Recomputes the derived payment status only.
    ///
    /// Used by the customer return request, which intentionally defers
    /// order-status recomputation.
    pub fn refresh_payment_status(&mut self, now: DateTime<Utc>) {
        self.payment_status = recompute_order_payment_status(&self.lines);
        self.updated_at = now;
    }

    /// Refund for one line: its frozen total, less the line's fair share
    /// of the order-level catalog discount.
    ///
    /// Coupon discount is reconciled at the aggregate level, not folded
    /// into the per-line refund.
    #[must_use]
    pub fn item_refund(&self, line: &OrderLine) -> u64 {
        let line_total = line.line_total();
        if self.discount == 0 || self.total_price == 0 {
            return line_total;
        }
        let discount_share = proportional(line_total, self.discount, self.total_price);
        line_total.saturating_sub(discount_share)
    }

    /// Whether the monetary invariant holds.
    #[must_use]
    pub fn money_invariant_holds(&self) -> bool {
        let net = self
            .total_price
            .saturating_sub(self.discount)
            .saturating_sub(self.coupon_discount);
        self.final_amount == net + self.shipping_charge
    }
}
