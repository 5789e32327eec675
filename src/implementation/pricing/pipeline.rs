//! The pricing computation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::CheckoutConfig;
use crate::errors::{StoreError, StoreResult};
use crate::implementation::coupon::{check_eligibility, Coupon};
use crate::types::catalog::{resolve_variant, Product, ProductId, VariantId};
use crate::types::money::line_total;

/// One line submitted for pricing.
#[derive(Debug, Clone)]
pub struct PricingItem<'a> {
    /// The product being purchased.
    pub product:    &'a Product,
    /// Requested variant id, possibly stale.
    pub variant_id: Option<&'a VariantId>,
    /// Volume discriminator fallback.
    pub ml:         Option<u32>,
    /// Quantity (>= 1).
    pub quantity:   u32,
}

/// Priced breakdown for one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    /// Product reference.
    pub product_id:          ProductId,
    /// Resolved variant id, if a variant matched.
    pub variant_id:          Option<VariantId>,
    /// Resolved volume discriminator.
    pub ml:                  Option<u32>,
    /// Quantity.
    pub quantity:            u32,
    /// Unit list price.
    pub unit_original_price: u64,
    /// Unit offer price actually charged.
    pub unit_offer_price:    u64,
    /// List price times quantity.
    pub line_original_total: u64,
    /// Offer price times quantity.
    pub line_total:          u64,
    /// Catalog discount on this line.
    pub line_discount:       u64,
    /// Units available at pricing time.
    pub available:           u32,
    /// Whether the requested quantity is coverable by stock.
    pub in_stock:            bool,
}

/// Aggregate pricing output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedCart {
    /// Per-line breakdowns, in input order.
    pub lines:            Vec<PricedLine>,
    /// Sum of offer-price line totals.
    pub subtotal:         u64,
    /// Sum of list-price line totals.
    pub total_price:      u64,
    /// Sum of per-line catalog discounts.
    pub discount:         u64,
    /// Coupon discount, capped at the subtotal.
    pub coupon_discount:  u64,
    /// Shipping charge.
    pub shipping_charge:  u64,
    /// `max(0, subtotal - coupon_discount) + shipping_charge`.
    pub final_amount:     u64,
    /// Whether any line exceeds available stock.
    pub has_out_of_stock: bool,
}

/// Prices a set of line items. Pure: no side effects, no persistence.
///
/// The caller is responsible for validating the coupon's per-user usage
/// cap; the pure checks (active, expiry, minimum cart value) are
/// re-applied here against the computed subtotal.
pub fn price_items(
    items: &[PricingItem<'_>], coupon: Option<&Coupon>, now: DateTime<Utc>,
    config: &CheckoutConfig,
) -> StoreResult<PricedCart> {
    if items.is_empty() {
        return Err(StoreError::EmptyCart);
    }

    let mut lines = Vec::with_capacity(items.len());
    let mut subtotal: u64 = 0;
    let mut total_price: u64 = 0;
    let mut has_out_of_stock = false;

    for item in items {
        if item.quantity == 0 {
            return Err(StoreError::ValidationError(format!(
                "zero quantity for product {}",
                item.product.id
            )));
        }

        let resolved = resolve_variant(item.product, item.variant_id, item.ml);
        let (variant_id, ml, unit_original, unit_offer, available) = match resolved {
            Some(variant) => (
                Some(variant.id.clone()),
                Some(variant.ml),
                variant.price,
                variant.effective_price(),
                variant.quantity,
            ),
            None => (
                None,
                item.ml,
                item.product.price,
                item.product.effective_price(),
                item.product.stock,
            ),
        };

        let line_original_total = line_total(unit_original, item.quantity);
        let offer_total = line_total(unit_offer, item.quantity);
        let in_stock = available >= item.quantity;
        has_out_of_stock |= !in_stock;

        subtotal += offer_total;
        total_price += line_original_total;

        lines.push(PricedLine {
            product_id: item.product.id.clone(),
            variant_id,
            ml,
            quantity: item.quantity,
            unit_original_price: unit_original,
            unit_offer_price: unit_offer,
            line_original_total,
            line_total: offer_total,
            line_discount: line_original_total - offer_total,
            available,
            in_stock,
        });
    }

    let discount = total_price - subtotal;

    let shipping_charge = if subtotal >= config.free_shipping_threshold {
        0
    } else {
        config.flat_shipping_fee
    };

    let coupon_discount = match coupon {
        Some(coupon) => {
            check_eligibility(coupon, subtotal, now)?;
            coupon.discount_value.min(subtotal)
        },
        None => 0,
    };

    let final_amount = subtotal.saturating_sub(coupon_discount) + shipping_charge;

    Ok(PricedCart {
        lines,
        subtotal,
        total_price,
        discount,
        coupon_discount,
        shipping_charge,
        final_amount,
        has_out_of_stock,
    })
}
