//! Order service implementation.
//!
//! Owns the order store and every line-status mutation. Each mutation
//! runs under the order-map lock, so aggregate recomputations are
//! serialized per order; stock, wallet, and coupon side effects are
//! applied inside the same critical section.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{Duration, Utc};

use super::status::allowed_next;
use crate::config::CheckoutConfig;
use crate::errors::{StoreError, StoreResult};
use crate::implementation::catalog::{CatalogService, StockLine};
use crate::implementation::coupon::CouponService;
use crate::implementation::order_management::types::{
    LineId, LinePaymentStatus, LineStatus, Order, OrderId, OrderPaymentStatus,
};
use crate::implementation::wallet::WalletService;
use crate::types::catalog::resolve_variant;
use crate::types::money::line_total;
use crate::types::{Actor, PaymentMethod, UserId};

/// In-memory order store plus the line-mutation API.
#[derive(Debug)]
pub struct OrderService {
    orders:             Arc<Mutex<HashMap<OrderId, Order>>>,
    orders_by_customer: Arc<Mutex<HashMap<UserId, Vec<OrderId>>>>,
    order_counter:      Arc<Mutex<u64>>,
    catalog:            Arc<CatalogService>,
    wallet:             Arc<WalletService>,
    coupons:            Arc<CouponService>,
    config:             CheckoutConfig,
}

impl OrderService {
    /// Creates a new order service.
    #[must_use]
    pub fn new(
        catalog: Arc<CatalogService>, wallet: Arc<WalletService>, coupons: Arc<CouponService>,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            orders: Arc::new(Mutex::new(HashMap::new())),
            orders_by_customer: Arc::new(Mutex::new(HashMap::new())),
            order_counter: Arc::new(Mutex::new(1000)),
            catalog,
            wallet,
            coupons,
            config,
        }
    }

    /// Generates the next human-readable order code.
    pub(crate) fn next_order_code(&self) -> StoreResult<String> {
        let mut counter = self.order_counter.lock().map_err(|_| StoreError::LockError)?;
        let num = *counter;
        *counter += 1;
        Ok(format!("ORD-{num}"))
    }

    /// Registers a freshly placed order.
    pub(crate) fn insert_order(&self, order: Order) -> StoreResult<()> {
        let order_id = order.id;
        let user_id = order.user_id.clone();

        let mut orders = self.orders.lock().map_err(|_| StoreError::LockError)?;
        let mut by_customer =
            self.orders_by_customer.lock().map_err(|_| StoreError::LockError)?;

        orders.insert(order_id, order);
        by_customer.entry(user_id).or_default().push(order_id);
        Ok(())
    }

    /// Runs a closure against one order under the store lock.
    ///
    /// Serializes concurrent mutations of the same order.
    pub(crate) fn with_order_mut<R>(
        &self, order_id: &OrderId, f: impl FnOnce(&mut Order) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let mut orders = self.orders.lock().map_err(|_| StoreError::LockError)?;
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| StoreError::OrderNotFound(order_id.to_string()))?;
        f(order)
    }

    /// Gets an order by ID.
    pub fn get_order(&self, order_id: &OrderId) -> StoreResult<Order> {
        let orders = self.orders.lock().map_err(|_| StoreError::LockError)?;
        orders
            .get(order_id)
            .cloned()
            .ok_or_else(|| StoreError::OrderNotFound(order_id.to_string()))
    }

    /// Gets a customer's orders, newest first.
    pub fn get_customer_orders(&self, user_id: &UserId) -> StoreResult<Vec<Order>> {
        let orders = self.orders.lock().map_err(|_| StoreError::LockError)?;
        let by_customer = self.orders_by_customer.lock().map_err(|_| StoreError::LockError)?;

        let order_ids = by_customer.get(user_id).cloned().unwrap_or_default();
        let mut customer_orders: Vec<Order> =
            order_ids.iter().filter_map(|id| orders.get(id).cloned()).collect();

        customer_orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(customer_orders)
    }

    // ========================================================================
    // LINE-STATUS TRANSITIONS
    // ========================================================================

    /// Transitions one line to a new status.
    ///
    /// Enforces the transition table and actor rules, applies the
    /// per-transition side effects, runs the aggregate reconciliation for
    /// cancellations and completed returns, and recomputes both derived
    /// order statuses. Returns the updated order.
    pub fn update_line_status(
        &self, order_id: &OrderId, line_id: &LineId, new_status: LineStatus, actor: Actor,
        reason: Option<String>,
    ) -> StoreResult<Order> {
        let mut orders = self.orders.lock().map_err(|_| StoreError::LockError)?;
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| StoreError::OrderNotFound(order_id.to_string()))?;

        let line_idx = order
            .lines
            .iter()
            .position(|l| &l.id == line_id)
            .ok_or_else(|| StoreError::LineNotFound(line_id.to_string()))?;
        let current = order.lines[line_idx].status;

        let allowed = allowed_next(current);
        if !allowed.contains(&new_status) {
            return Err(StoreError::InvalidTransition { current, allowed });
        }

        // Return requests carry a window check and are customer-initiated;
        // they only enter through `request_return`.
        if new_status == LineStatus::ReturnRequested {
            return Err(StoreError::ForbiddenTransition);
        }

        // Customers may only cancel pre-shipment; everything else is admin.
        if actor == Actor::Customer && new_status != LineStatus::Cancelled {
            return Err(StoreError::ForbiddenTransition);
        }

        let now = Utc::now();
        let mut removed: Vec<LineId> = Vec::new();

        {
            let line = &mut order.lines[line_idx];
            line.status = new_status;

            match new_status {
                LineStatus::Processing | LineStatus::Shipped => {},
                LineStatus::Delivered => {
                    if current == LineStatus::ReturnRequested {
                        // Admin rejected the return request.
                        line.return_rejection_date = Some(now);
                        line.payment_status = LinePaymentStatus::Paid;
                    } else {
                        if line.delivered_date.is_none() {
                            line.delivered_date = Some(now);
                        }
                        line.payment_status = LinePaymentStatus::Paid;
                    }
                },
                LineStatus::Cancelled => {
                    // Money was never collected for this line, or will be
                    // reconciled through the order-level wallet logic.
                    line.payment_status = LinePaymentStatus::Pending;
                    if reason.is_some() {
                        line.cancellation_reason = reason.clone();
                    }
                    removed.push(line.id);
                },
                LineStatus::ReturnApproved => {
                    line.return_approval_date = Some(now);
                    line.payment_status = LinePaymentStatus::RefundApproved;
                },
                LineStatus::Returned => {
                    line.payment_status = LinePaymentStatus::Refunded;
                    line.returned_date = Some(now);
                    line.refund_date = Some(now);
                    removed.push(line.id);
                },
                LineStatus::Pending | LineStatus::ReturnRequested => unreachable!(),
            }
        }

        if new_status == LineStatus::ReturnApproved {
            // Freeze the refund before totals are recomputed; immutable once set.
            let refund = order.item_refund(&order.lines[line_idx]);
            let line = &mut order.lines[line_idx];
            if line.refund_amount.is_none() {
                line.refund_amount = Some(refund);
            }
        }

        if removed.is_empty() {
            order.refresh_derived_state(now);
        } else {
            self.reconcile_removed_lines(order, &removed)?;
        }

        tracing::debug!(
            order = %order.code,
            line = %line_id,
            from = %current,
            to = %new_status,
            "line status updated"
        );
        Ok(order.clone())
    }

    /// Customer return request for a delivered line.
    ///
    /// Fails with `WrongState` unless the line is `Delivered`, and with
    /// `ReturnWindowClosed` outside the configured window. Updates the
    /// derived payment status only; order status is deliberately left
    /// untouched so a pending return does not regress it.
    pub fn request_return(
        &self, order_id: &OrderId, line_id: &LineId, reason: impl Into<String>,
    ) -> StoreResult<Order> {
        let mut orders = self.orders.lock().map_err(|_| StoreError::LockError)?;
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| StoreError::OrderNotFound(order_id.to_string()))?;

        let line = order
            .lines
            .iter_mut()
            .find(|l| &l.id == line_id)
            .ok_or_else(|| StoreError::LineNotFound(line_id.to_string()))?;

        if line.status != LineStatus::Delivered {
            return Err(StoreError::WrongState(line.status));
        }

        let now = Utc::now();
        let delivered_at = line.delivered_date.unwrap_or(order.created_at);
        let window = Duration::days(i64::from(self.config.return_window_days));
        if now > delivered_at + window {
            return Err(StoreError::ReturnWindowClosed {
                delivered_at,
                window_days: self.config.return_window_days,
            });
        }

        line.status = LineStatus::ReturnRequested;
        line.payment_status = LinePaymentStatus::ReturnRequested;
        line.return_reason = Some(reason.into());

        order.refresh_payment_status(now);
        Ok(order.clone())
    }

    // ========================================================================
    // AGGREGATE RECONCILIATION
    // ========================================================================

    /// Reapplies the aggregate after lines left the billable set.
    ///
    /// One logical unit: stock restoration, proportional wallet refund,
    /// coupon re-evaluation, monetary recomputation from live catalog
    /// prices, then both derived statuses. Runs under the order-map lock.
    pub(crate) fn reconcile_removed_lines(
        &self, order: &mut Order, removed: &[LineId],
    ) -> StoreResult<()> {
        let now = Utc::now();

        // 1. Restore stock for every newly removed line. Online orders
        // only take stock at payment verification, so a removal before
        // the payment was collected has nothing to restore.
        let stock_taken = !(order.payment_method == PaymentMethod::Online
            && matches!(
                order.payment_status,
                OrderPaymentStatus::Pending | OrderPaymentStatus::Failed
            ));
        if stock_taken {
            for line in order.lines.iter().filter(|l| removed.contains(&l.id)) {
                self.catalog.increment_stock(&StockLine {
                    product_id: line.product_id.clone(),
                    variant_id: line.variant_id.clone(),
                    ml:         line.ml,
                    quantity:   line.quantity,
                })?;
            }
        }

        // 2. Refund wallet usage proportionally, never more than was paid.
        let removed_total: u64 = order
            .lines
            .iter()
            .filter(|l| removed.contains(&l.id))
            .map(|l| l.line_total())
            .sum();
        let wallet_refund = removed_total.min(order.wallet_used);
        if wallet_refund > 0 {
            self.wallet.credit(
                &order.user_id,
                wallet_refund,
                format!("Refund for order {}", order.code),
            )?;
            order.wallet_used -= wallet_refund;
        }

        // 3+4. Recompute monetary totals for the remaining billable lines
        // from live catalog prices, then re-evaluate the coupon against
        // the remaining base total.
        let (remaining_base, remaining_offer) = self.live_billable_totals(order);

        if let Some(code) = order.coupon_code.clone() {
            let original_base = order.total_price;
            let original_coupon_discount = order.coupon_discount;

            let min_cart_value = match self.coupons.find_coupon(&code) {
                Ok(coupon) => coupon.min_cart_value,
                Err(_) => {
                    tracing::warn!(code = %code, order = %order.code, "applied coupon no longer exists");
                    u64::MAX // force release below
                },
            };

            if remaining_base < min_cart_value {
                // The remaining order no longer qualifies; the customer
                // loses the discount.
                self.coupons.release_usage(&code, &order.id)?;
                order.coupon_code = None;
                order.coupon_id = None;
                order.coupon_discount = 0;
            } else {
                order.coupon_discount = crate::types::money::proportional(
                    original_coupon_discount,
                    remaining_base,
                    original_base,
                );
            }
        }

        if order.lines.iter().any(|l| l.status.is_billable()) {
            order.total_price = remaining_base;
            order.discount = remaining_base - remaining_offer;
            order.final_amount = remaining_base
                .saturating_sub(order.discount)
                .saturating_sub(order.coupon_discount)
                + order.shipping_charge;
        } else {
            // Full cancellation/return: everything resets.
            order.total_price = 0;
            order.discount = 0;
            order.shipping_charge = 0;
            order.final_amount = 0;
            order.wallet_used = 0;
        }

        // 5. Derived statuses, always together.
        order.refresh_derived_state(now);
        Ok(())
    }

    /// Live base (list) and offer totals over the still-billable lines.
    ///
    /// A line whose product or variant can no longer be resolved keeps
    /// its frozen price and is logged as a data-integrity warning.
    fn live_billable_totals(&self, order: &Order) -> (u64, u64) {
        let mut base: u64 = 0;
        let mut offer: u64 = 0;

        for line in order.lines.iter().filter(|l| l.status.is_billable()) {
            let (unit_base, unit_offer) = match self.catalog.find_product(&line.product_id) {
                Ok(product) => {
                    match resolve_variant(&product, line.variant_id.as_ref(), line.ml) {
                        Some(variant) => (variant.price, variant.effective_price()),
                        None if line.variant_id.is_none() && line.ml.is_none() => {
                            (product.price, product.effective_price())
                        },
                        None => {
                            tracing::warn!(
                                order = %order.code,
                                product = %line.product_id,
                                variant = ?line.variant_id,
                                "variant unresolvable during recomputation; using frozen price"
                            );
                            (line.unit_price, line.unit_price)
                        },
                    }
                },
                Err(_) => {
                    tracing::warn!(
                        order = %order.code,
                        product = %line.product_id,
                        "product missing during recomputation; using frozen price"
                    );
                    (line.unit_price, line.unit_price)
                },
            };

            base += line_total(unit_base, line.quantity);
            offer += line_total(unit_offer, line.quantity);
        }

        (base, offer)
    }
}
