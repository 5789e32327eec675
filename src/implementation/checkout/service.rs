//! Checkout orchestrator implementation.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::gateway::{sign_payload, signature_matches, PaymentGateway, PaymentIntent, VerifyPaymentRequest};
use crate::config::CheckoutConfig;
use crate::errors::{StoreError, StoreResult};
use crate::implementation::catalog::{CatalogService, StockLine};
use crate::implementation::coupon::CouponService;
use crate::implementation::order_management::{
    LinePaymentStatus, Order, OrderId, OrderPaymentStatus, OrderService,
};
use crate::implementation::pricing::{price_items, PricedCart, PricingItem};
use crate::implementation::wallet::WalletService;
use crate::types::catalog::{Product, ProductId, VariantId};
use crate::types::{PaymentMethod, ShippingAddress, UserId};

/// One line in a checkout draft, addressed by catalog references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    /// Product to purchase.
    pub product_id: ProductId,
    /// Requested variant, possibly stale.
    pub variant_id: Option<VariantId>,
    /// Volume discriminator fallback.
    pub ml:         Option<u32>,
    /// Quantity (>= 1).
    pub quantity:   u32,
}

/// The checkout a user is building: either their cart or a single
/// buy-now item, plus any coupon they have applied.
///
/// An explicit per-user entity; nothing about the checkout in progress
/// lives in ambient session state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CheckoutDraft {
    /// Items staged for purchase.
    pub items:       Vec<CheckoutItem>,
    /// Whether this draft is a buy-now slot rather than the cart.
    pub buy_now:     bool,
    /// Applied coupon code, normalized uppercase.
    pub coupon_code: Option<String>,
}

/// The order-placement orchestrator.
///
/// Owns the per-user checkout drafts and drives pricing, payment,
/// stock, coupon, and order persistence as one unit per placement.
#[derive(Debug)]
pub struct CheckoutService {
    catalog: Arc<CatalogService>,
    wallet:  Arc<WalletService>,
    coupons: Arc<CouponService>,
    orders:  Arc<OrderService>,
    gateway: Arc<dyn PaymentGateway>,
    drafts:  Arc<Mutex<HashMap<UserId, CheckoutDraft>>>,
    config:  CheckoutConfig,
}

impl CheckoutService {
    /// Creates a new checkout service.
    #[must_use]
    pub fn new(
        catalog: Arc<CatalogService>, wallet: Arc<WalletService>, coupons: Arc<CouponService>,
        orders: Arc<OrderService>, gateway: Arc<dyn PaymentGateway>, config: CheckoutConfig,
    ) -> Self {
        Self {
            catalog,
            wallet,
            coupons,
            orders,
            gateway,
            drafts: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    // ========================================================================
    // DRAFT MANAGEMENT
    // ========================================================================

    /// Stages the user's cart for checkout, replacing any existing draft.
    pub fn stage_cart(&self, user_id: &UserId, items: Vec<CheckoutItem>) -> StoreResult<()> {
        if items.is_empty() {
            return Err(StoreError::EmptyCart);
        }
        for item in &items {
            if item.quantity == 0 {
                return Err(StoreError::ValidationError(format!(
                    "zero quantity for product {}",
                    item.product_id
                )));
            }
        }

        let mut drafts = self.drafts.lock().map_err(|_| StoreError::LockError)?;
        drafts.insert(
            user_id.clone(),
            CheckoutDraft { items, buy_now: false, coupon_code: None },
        );
        Ok(())
    }

    /// Stages a single buy-now item, replacing any existing draft.
    pub fn stage_buy_now(&self, user_id: &UserId, item: CheckoutItem) -> StoreResult<()> {
        if item.quantity == 0 {
            return Err(StoreError::ValidationError(format!(
                "zero quantity for product {}",
                item.product_id
            )));
        }

        let mut drafts = self.drafts.lock().map_err(|_| StoreError::LockError)?;
        drafts.insert(
            user_id.clone(),
            CheckoutDraft { items: vec![item], buy_now: true, coupon_code: None },
        );
        Ok(())
    }

    /// Applies a coupon to the user's draft after validating it against
    /// the draft's current subtotal.
    pub fn apply_coupon(&self, user_id: &UserId, code: &str) -> StoreResult<PricedCart> {
        let mut draft = self.draft(user_id)?;
        draft.coupon_code = Some(code.trim().to_uppercase());

        // Prices and validates in one pass; a bad coupon never sticks.
        let priced = self.price_draft(user_id, &draft)?;

        let mut drafts = self.drafts.lock().map_err(|_| StoreError::LockError)?;
        if let Some(stored) = drafts.get_mut(user_id) {
            stored.coupon_code = draft.coupon_code;
        }
        Ok(priced)
    }

    /// Removes any applied coupon from the user's draft.
    pub fn remove_coupon(&self, user_id: &UserId) -> StoreResult<()> {
        let mut drafts = self.drafts.lock().map_err(|_| StoreError::LockError)?;
        if let Some(draft) = drafts.get_mut(user_id) {
            draft.coupon_code = None;
        }
        Ok(())
    }

    /// The user's current draft.
    pub fn draft(&self, user_id: &UserId) -> StoreResult<CheckoutDraft> {
        let drafts = self.drafts.lock().map_err(|_| StoreError::LockError)?;
        drafts.get(user_id).cloned().ok_or(StoreError::EmptyCart)
    }

    fn clear_draft(&self, user_id: &UserId) -> StoreResult<()> {
        let mut drafts = self.drafts.lock().map_err(|_| StoreError::LockError)?;
        drafts.remove(user_id);
        Ok(())
    }

    // ========================================================================
    // PRICING
    // ========================================================================

    /// Prices the user's draft without side effects.
    pub fn checkout_preview(&self, user_id: &UserId) -> StoreResult<PricedCart> {
        let draft = self.draft(user_id)?;
        self.price_draft(user_id, &draft)
    }

    /// Resolves the draft against the live catalog and runs the pricing
    /// pipeline, including coupon eligibility and the per-user cap.
    fn price_draft(&self, user_id: &UserId, draft: &CheckoutDraft) -> StoreResult<PricedCart> {
        let mut products: Vec<Product> = Vec::with_capacity(draft.items.len());
        for item in &draft.items {
            products.push(self.catalog.find_product(&item.product_id)?);
        }

        let items: Vec<PricingItem<'_>> = draft
            .items
            .iter()
            .zip(products.iter())
            .map(|(item, product)| PricingItem {
                product,
                variant_id: item.variant_id.as_ref(),
                ml: item.ml,
                quantity: item.quantity,
            })
            .collect();

        let coupon = match &draft.coupon_code {
            Some(code) => Some(self.coupons.find_coupon(code).map_err(|_| {
                StoreError::CouponIneligible { reason: "unknown coupon code".to_string() }
            })?),
            None => None,
        };

        let priced = price_items(&items, coupon.as_ref(), Utc::now(), &self.config)?;

        // The pipeline covers the pure checks; the per-user cap needs the
        // usage log.
        if let Some(code) = &draft.coupon_code {
            self.coupons.validate(code, user_id, priced.subtotal)?;
        }
        Ok(priced)
    }

    // ========================================================================
    // ORDER PLACEMENT
    // ========================================================================

    /// Places an order from the user's staged draft.
    ///
    /// Runs the pricing pipeline, enforces the payment-method rules, and
    /// commits stock, wallet, coupon, and order effects together; a
    /// failure after validation leaves nothing partially applied. The
    /// gateway path defers stock to payment verification.
    pub fn place_order(
        &self, user_id: &UserId, address: ShippingAddress, payment_method: PaymentMethod,
    ) -> StoreResult<Order> {
        let draft = self.draft(user_id)?;
        let priced = self.price_draft(user_id, &draft)?;

        if priced.has_out_of_stock {
            return Err(StoreError::OutOfStock);
        }

        if payment_method == PaymentMethod::CashOnDelivery
            && priced.final_amount > self.config.cod_ceiling
        {
            return Err(StoreError::CodNotAllowed {
                amount:  priced.final_amount,
                ceiling: self.config.cod_ceiling,
            });
        }

        let coupon = match &draft.coupon_code {
            Some(code) => {
                let c = self.coupons.find_coupon(code)?;
                Some((c.id, c.code))
            },
            None => None,
        };

        let code = self.orders.next_order_code()?;
        let stock_lines = stock_lines(&priced);

        let mut order = match payment_method {
            PaymentMethod::CashOnDelivery => {
                self.catalog.decrement_stock(&stock_lines)?;
                Order::from_priced_cart(
                    code,
                    user_id.clone(),
                    address,
                    payment_method,
                    &priced,
                    coupon,
                    0,
                    None,
                )
            },
            PaymentMethod::Wallet => {
                self.catalog.decrement_stock(&stock_lines)?;
                if let Err(err) = self.wallet.debit(
                    user_id,
                    priced.final_amount,
                    format!("Payment for order {code}"),
                ) {
                    // Put the stock back; the placement never happened.
                    for line in &stock_lines {
                        self.catalog.increment_stock(line)?;
                    }
                    return Err(err);
                }

                let mut order = Order::from_priced_cart(
                    code,
                    user_id.clone(),
                    address,
                    payment_method,
                    &priced,
                    coupon,
                    priced.final_amount,
                    None,
                );
                for line in &mut order.lines {
                    line.payment_status = LinePaymentStatus::Paid;
                }
                order
            },
            PaymentMethod::Online => {
                // Intent first: a gateway failure must not leave an order
                // referencing a non-existent intent. Stock is taken at
                // verification time, not here.
                let intent = self.gateway.create_intent(
                    priced.final_amount,
                    &self.config.currency,
                    &code,
                )?;
                Order::from_priced_cart(
                    code,
                    user_id.clone(),
                    address,
                    payment_method,
                    &priced,
                    coupon,
                    0,
                    Some(intent.id),
                )
            },
        };

        order.refresh_payment_status(Utc::now());

        if let Some(coupon_code) = &order.coupon_code {
            self.coupons.record_usage(coupon_code, user_id, &order.id)?;
        }
        self.orders.insert_order(order.clone())?;
        self.clear_draft(user_id)?;

        tracing::info!(
            order = %order.code,
            user = %user_id,
            method = payment_method.display_name(),
            amount = order.final_amount,
            "order placed"
        );
        Ok(order)
    }

    // ========================================================================
    // ONLINE PAYMENT LIFECYCLE
    // ========================================================================

    /// Verifies a gateway payment callback and collects the payment.
    ///
    /// Checks the HMAC signature in constant time, then decrements stock
    /// and marks the payment collected. Losing the deferred-stock race
    /// fails the payment with `OutOfStock` instead of overselling.
    pub fn verify_payment(
        &self, order_id: &OrderId, request: &VerifyPaymentRequest,
    ) -> StoreResult<Order> {
        let secret = self.gateway.webhook_secret().ok_or(StoreError::NotConfigured)?;

        // Guard, signature check, and stock decrement all run under the
        // per-order lock: two concurrent callbacks for the same order
        // must not both pass the not-yet-paid check and double-collect.
        self.orders.with_order_mut(order_id, |o| {
            let Some(gateway_order_id) = &o.gateway_order_id else {
                return Err(StoreError::ValidationError(format!(
                    "order {} has no gateway payment",
                    o.code
                )));
            };
            if o.payment_status == OrderPaymentStatus::Paid {
                return Err(StoreError::AlreadyVerified);
            }
            if gateway_order_id != &request.gateway_order_id {
                return Err(StoreError::SignatureMismatch);
            }

            let expected =
                sign_payload(secret, &request.gateway_order_id, &request.gateway_payment_id)?;
            if !signature_matches(&expected, &request.signature) {
                return Err(StoreError::SignatureMismatch);
            }

            // Stock was deliberately not reserved at intent creation; take
            // it now or fail the payment.
            let stock_lines: Vec<StockLine> = o
                .lines
                .iter()
                .filter(|l| l.status.is_billable())
                .map(|l| StockLine {
                    product_id: l.product_id.clone(),
                    variant_id: l.variant_id.clone(),
                    ml:         l.ml,
                    quantity:   l.quantity,
                })
                .collect();

            if let Err(err) = self.catalog.decrement_stock(&stock_lines) {
                tracing::warn!(order = %o.code, %err, "stock lost between intent and verification");
                for line in o.lines.iter_mut().filter(|l| l.status.is_billable()) {
                    line.payment_status = LinePaymentStatus::Failed;
                }
                o.refresh_payment_status(Utc::now());
                return Err(StoreError::OutOfStock);
            }

            for line in o.lines.iter_mut().filter(|l| l.status.is_billable()) {
                line.payment_status = LinePaymentStatus::Paid;
            }
            o.refresh_payment_status(Utc::now());
            tracing::info!(order = %o.code, "payment verified");
            Ok(o.clone())
        })
    }

    /// Marks an online payment as failed, as reported by the gateway.
    pub fn mark_payment_failed(&self, order_id: &OrderId) -> StoreResult<Order> {
        self.orders.with_order_mut(order_id, |o| {
            if o.gateway_order_id.is_none() {
                return Err(StoreError::ValidationError(format!(
                    "order {} has no gateway payment",
                    o.code
                )));
            }
            for line in o.lines.iter_mut().filter(|l| l.status.is_billable()) {
                line.payment_status = LinePaymentStatus::Failed;
            }
            o.refresh_payment_status(Utc::now());
            Ok(o.clone())
        })
    }

    /// Retries a failed online payment with a fresh gateway intent.
    ///
    /// Reprices the still-billable lines from the live catalog so the new
    /// intent reflects current economics; bounded by the configured
    /// retry budget.
    pub fn retry_payment(&self, order_id: &OrderId) -> StoreResult<PaymentIntent> {
        let order = self.orders.get_order(order_id)?;

        if order.payment_status != OrderPaymentStatus::Failed {
            return Err(StoreError::NotFailed);
        }
        if order.retry_attempts >= self.config.max_retry_attempts {
            return Err(StoreError::RetryLimitExceeded {
                attempts: order.retry_attempts,
                max:      self.config.max_retry_attempts,
            });
        }

        let billable: Vec<_> = order.lines.iter().filter(|l| l.status.is_billable()).collect();
        let mut products: Vec<Product> = Vec::with_capacity(billable.len());
        for line in &billable {
            products.push(self.catalog.find_product(&line.product_id)?);
        }
        let items: Vec<PricingItem<'_>> = billable
            .iter()
            .zip(products.iter())
            .map(|(line, product)| PricingItem {
                product,
                variant_id: line.variant_id.as_ref(),
                ml: line.ml,
                quantity: line.quantity,
            })
            .collect();

        let coupon = match &order.coupon_code {
            Some(code) => Some(self.coupons.find_coupon(code)?),
            None => None,
        };
        let priced = price_items(&items, coupon.as_ref(), Utc::now(), &self.config)?;

        let intent =
            self.gateway.create_intent(priced.final_amount, &self.config.currency, &order.code)?;

        self.orders.with_order_mut(order_id, |o| {
            o.retry_attempts += 1;
            o.last_retry_at = Some(Utc::now());
            o.gateway_order_id = Some(intent.id.clone());
            // The fresh intent reflects current catalog economics, so the
            // whole monetary breakdown moves with it, not just the total.
            o.total_price = priced.total_price;
            o.discount = priced.discount;
            o.coupon_discount = priced.coupon_discount;
            o.shipping_charge = priced.shipping_charge;
            o.final_amount = priced.final_amount;
            for line in o.lines.iter_mut().filter(|l| l.status.is_billable()) {
                line.payment_status = LinePaymentStatus::Pending;
            }
            o.refresh_payment_status(Utc::now());
            tracing::info!(
                order = %o.code,
                attempt = o.retry_attempts,
                intent = %intent.id,
                "payment retry issued"
            );
            Ok(())
        })?;

        Ok(intent)
    }
}

fn stock_lines(priced: &PricedCart) -> Vec<StockLine> {
    priced
        .lines
        .iter()
        .map(|l| StockLine {
            product_id: l.product_id.clone(),
            variant_id: l.variant_id.clone(),
            ml:         l.ml,
            quantity:   l.quantity,
        })
        .collect()
}
