//! Catalog types consumed by the order core.
//!
//! The catalog itself (CRUD, browsing) is an external collaborator; these
//! types cover only what pricing, checkout, and reconciliation need: list
//! and offer prices, per-variant stock, and variant resolution.

use serde::{Deserialize, Serialize};

/// Unique product identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    /// Creates a new product ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique variant identifier.
///
/// Variant ids may be renamed or deleted between cart-add and checkout,
/// so lookups fall back to the volume discriminator (see [`resolve_variant`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantId(pub String);

impl VariantId {
    /// Creates a new variant ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VariantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A purchasable product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant ID.
    pub id:          VariantId,
    /// Volume discriminator (millilitres); stable across id renames.
    pub ml:          u32,
    /// List price in minor units.
    pub price:       u64,
    /// Discounted offer price, if any (always <= price).
    pub offer_price: Option<u64>,
    /// Units in stock.
    pub quantity:    u32,
}

impl Variant {
    /// The unit price actually charged.
    #[must_use]
    pub fn effective_price(&self) -> u64 {
        self.offer_price.unwrap_or(self.price)
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id:          ProductId,
    /// Product name.
    pub name:        String,
    /// List price in minor units, used when no variant applies.
    pub price:       u64,
    /// Discounted offer price, if any (always <= price).
    pub offer_price: Option<u64>,
    /// Flat stock count, used when no variant applies.
    pub stock:       u32,
    /// Variants.
    pub variants:    Vec<Variant>,
}

impl Product {
    /// The unit price actually charged when no variant applies.
    #[must_use]
    pub fn effective_price(&self) -> u64 {
        self.offer_price.unwrap_or(self.price)
    }
}

/// Resolves the effective variant for a line.
///
/// Looks up by id first, then falls back to the `ml` volume discriminator
/// when the id is absent or stale. Returns `None` when neither matches;
/// callers then use the product's flat price and stock.
#[must_use]
pub fn resolve_variant<'a>(
    product: &'a Product, variant_id: Option<&VariantId>, ml: Option<u32>,
) -> Option<&'a Variant> {
    if let Some(id) = variant_id {
        if let Some(variant) = product.variants.iter().find(|v| &v.id == id) {
            return Some(variant);
        }
    }
    if let Some(ml) = ml {
        return product.variants.iter().find(|v| v.ml == ml);
    }
    None
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product {
            id: ProductId::new("prod-1"),
            name: "Rosewood Attar".to_string(),
            price: 900_00,
            offer_price: None,
            stock: 3,
            variants: vec![
                Variant {
                    id: VariantId::new("var-50"),
                    ml: 50,
                    price: 500_00,
                    offer_price: Some(450_00),
                    quantity: 10,
                },
                Variant {
                    id: VariantId::new("var-100"),
                    ml: 100,
                    price: 900_00,
                    offer_price: None,
                    quantity: 2,
                },
            ],
        }
    }

    #[test]
    fn test_resolve_by_id() {
        let product = sample_product();
        let variant = resolve_variant(&product, Some(&VariantId::new("var-100")), None)
            .expect("resolve by id");
        assert_eq!(variant.ml, 100);
    }

    #[test]
    fn test_resolve_falls_back_to_ml_on_stale_id() {
        let product = sample_product();
        let variant = resolve_variant(&product, Some(&VariantId::new("var-renamed")), Some(50))
            .expect("resolve by ml");
        assert_eq!(variant.id, VariantId::new("var-50"));
    }

    #[test]
    fn test_resolve_none_when_no_match() {
        let product = sample_product();
        assert!(resolve_variant(&product, None, Some(250)).is_none());
        assert!(resolve_variant(&product, None, None).is_none());
    }

    #[test]
    fn test_effective_price() {
        let product = sample_product();
        assert_eq!(product.variants[0].effective_price(), 450_00);
        assert_eq!(product.variants[1].effective_price(), 900_00);
    }
}
