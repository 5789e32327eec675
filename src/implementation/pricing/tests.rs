// ============================================================================
// TESTS
// ============================================================================

use chrono::{Duration, Utc};

use super::pipeline::{price_items, PricingItem};
use crate::config::CheckoutConfig;
use crate::errors::StoreError;
use crate::implementation::coupon::{Coupon, CouponId};
use crate::types::catalog::{Product, ProductId, Variant, VariantId};

fn product(id: &str, price: u64, offer: Option<u64>, stock: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: id.to_string(),
        price,
        offer_price: offer,
        stock,
        variants: Vec::new(),
    }
}

fn item(product: &Product, quantity: u32) -> PricingItem<'_> {
    PricingItem { product, variant_id: None, ml: None, quantity }
}

fn coupon(min_cart_value: u64, discount_value: u64) -> Coupon {
    Coupon {
        id: CouponId::generate(),
        code: "SAVE200".to_string(),
        min_cart_value,
        discount_value,
        active: true,
        expires_at: Utc::now() + Duration::days(30),
        max_usage_per_user: 1,
        usages: Vec::new(),
        total_usage: 0,
    }
}

#[test]
fn test_per_line_and_aggregate_breakdown() {
    let a = product("a", 400_00, Some(300_00), 10);
    let b = product("b", 200_00, None, 10);
    let config = CheckoutConfig::default();

    let priced =
        price_items(&[item(&a, 2), item(&b, 1)], None, Utc::now(), &config).expect("price");

    assert_eq!(priced.lines[0].line_original_total, 800_00);
    assert_eq!(priced.lines[0].line_total, 600_00);
    assert_eq!(priced.lines[0].line_discount, 200_00);
    assert_eq!(priced.subtotal, 800_00);
    assert_eq!(priced.total_price, 1000_00);
    assert_eq!(priced.discount, 200_00);
    assert_eq!(priced.shipping_charge, 0);
    assert_eq!(priced.final_amount, 800_00);
}

#[test]
fn test_flat_shipping_below_threshold() {
    let a = product("a", 300_00, None, 10);
    let config = CheckoutConfig::default();

    let priced = price_items(&[item(&a, 1)], None, Utc::now(), &config).expect("price");

    assert_eq!(priced.shipping_charge, config.flat_shipping_fee);
    assert_eq!(priced.final_amount, 300_00 + 50_00);
}

#[test]
fn test_scenario_a_coupon_cod_boundary() {
    // Subtotal 1200, coupon SAVE200 (min 1000, discount 200), shipping free.
    let a = product("a", 1200_00, None, 5);
    let config = CheckoutConfig::default();

    let priced =
        price_items(&[item(&a, 1)], Some(&coupon(1000_00, 200_00)), Utc::now(), &config)
            .expect("price");

    assert_eq!(priced.coupon_discount, 200_00);
    assert_eq!(priced.shipping_charge, 0);
    assert_eq!(priced.final_amount, 1000_00);
    // Exactly at the COD ceiling: still allowed by the orchestrator.
    assert!(priced.final_amount <= config.cod_ceiling);
}

#[test]
fn test_coupon_below_minimum_rejected() {
    let a = product("a", 900_00, None, 5);
    let config = CheckoutConfig::default();

    let result =
        price_items(&[item(&a, 1)], Some(&coupon(1000_00, 200_00)), Utc::now(), &config);
    assert!(matches!(result, Err(StoreError::CouponIneligible { .. })));
}

#[test]
fn test_coupon_discount_capped_at_subtotal() {
    let a = product("a", 150_00, None, 5);
    let mut c = coupon(100_00, 100_00);
    c.min_cart_value = 100_00;
    let config = CheckoutConfig::default();

    // Subtotal 150 with a flat 100 coupon: discount stays 100.
    let priced = price_items(&[item(&a, 1)], Some(&c), Utc::now(), &config).expect("price");
    assert_eq!(priced.coupon_discount, 100_00);
    assert_eq!(priced.final_amount, 50_00 + config.flat_shipping_fee);
}

#[test]
fn test_out_of_stock_flagged_per_line() {
    let a = product("a", 300_00, None, 1);
    let b = product("b", 300_00, None, 10);
    let config = CheckoutConfig::default();

    let priced =
        price_items(&[item(&a, 2), item(&b, 1)], None, Utc::now(), &config).expect("price");

    assert!(priced.has_out_of_stock);
    assert!(!priced.lines[0].in_stock);
    assert!(priced.lines[1].in_stock);
}

#[test]
fn test_variant_resolution_with_ml_fallback() {
    let mut a = product("a", 900_00, None, 0);
    a.variants = vec![Variant {
        id: VariantId::new("var-50"),
        ml: 50,
        price: 500_00,
        offer_price: Some(450_00),
        quantity: 3,
    }];
    let config = CheckoutConfig::default();

    let stale = VariantId::new("var-renamed");
    let items = [PricingItem { product: &a, variant_id: Some(&stale), ml: Some(50), quantity: 2 }];
    let priced = price_items(&items, None, Utc::now(), &config).expect("price");

    assert_eq!(priced.lines[0].variant_id, Some(VariantId::new("var-50")));
    assert_eq!(priced.lines[0].unit_offer_price, 450_00);
    assert_eq!(priced.subtotal, 900_00);
    assert!(priced.lines[0].in_stock);
}

#[test]
fn test_empty_cart_rejected() {
    let config = CheckoutConfig::default();
    assert_eq!(price_items(&[], None, Utc::now(), &config), Err(StoreError::EmptyCart));
}
