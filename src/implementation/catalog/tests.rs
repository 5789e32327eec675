// ============================================================================
// TESTS
// ============================================================================

use super::service::{CatalogService, StockLine};
use crate::errors::StoreError;
use crate::types::catalog::{Product, ProductId, Variant, VariantId};

fn seed_catalog() -> CatalogService {
    let service = CatalogService::new();
    service
        .add_product(Product {
            id: ProductId::new("prod-1"),
            name: "Oud Mist".to_string(),
            price: 700_00,
            offer_price: None,
            stock: 5,
            variants: vec![Variant {
                id: VariantId::new("var-50"),
                ml: 50,
                price: 400_00,
                offer_price: Some(350_00),
                quantity: 4,
            }],
        })
        .expect("add product");
    service
}

fn variant_line(quantity: u32) -> StockLine {
    StockLine {
        product_id: ProductId::new("prod-1"),
        variant_id: Some(VariantId::new("var-50")),
        ml:         Some(50),
        quantity,
    }
}

#[test]
fn test_decrement_and_restore_round_trip() {
    let service = seed_catalog();

    service.decrement_stock(&[variant_line(3)]).expect("decrement");
    assert_eq!(service.available_stock(&variant_line(0)).expect("stock"), 1);

    service.increment_stock(&variant_line(3)).expect("restore");
    assert_eq!(service.available_stock(&variant_line(0)).expect("stock"), 4);
}

#[test]
fn test_decrement_rejects_short_batch_atomically() {
    let service = seed_catalog();

    // 2 + 3 exceeds the 4 in stock even though each line alone fits.
    let lines = [variant_line(2), variant_line(3)];
    let result = service.decrement_stock(&lines);
    assert!(matches!(
        result,
        Err(StoreError::InsufficientStock { available: 2, requested: 3, .. })
    ));

    // First line must not have been applied
    assert_eq!(service.available_stock(&variant_line(0)).expect("stock"), 4);
}

#[test]
fn test_restore_falls_back_to_flat_stock() {
    let service = seed_catalog();

    let stale = StockLine {
        product_id: ProductId::new("prod-1"),
        variant_id: Some(VariantId::new("var-deleted")),
        ml:         Some(250),
        quantity:   2,
    };
    service.increment_stock(&stale).expect("restore");

    let product = service.find_product(&ProductId::new("prod-1")).expect("find");
    assert_eq!(product.stock, 7);
    assert_eq!(product.variants[0].quantity, 4);
}

#[test]
fn test_stale_variant_id_resolves_by_ml() {
    let service = seed_catalog();

    let renamed = StockLine {
        product_id: ProductId::new("prod-1"),
        variant_id: Some(VariantId::new("var-renamed")),
        ml:         Some(50),
        quantity:   1,
    };
    service.decrement_stock(std::slice::from_ref(&renamed)).expect("decrement");

    let product = service.find_product(&ProductId::new("prod-1")).expect("find");
    assert_eq!(product.variants[0].quantity, 3);
}

#[test]
fn test_offer_price_must_not_exceed_list_price() {
    let service = CatalogService::new();
    let result = service.add_product(Product {
        id: ProductId::new("prod-bad"),
        name: "Bad".to_string(),
        price: 100_00,
        offer_price: Some(150_00),
        stock: 1,
        variants: Vec::new(),
    });
    assert!(matches!(result, Err(StoreError::ValidationError(_))));
}
