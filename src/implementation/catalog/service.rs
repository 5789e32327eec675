//! Catalog service implementation.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::errors::{StoreError, StoreResult};
use crate::types::catalog::{resolve_variant, Product, ProductId, Variant, VariantId};

/// One stock movement, addressed like an order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLine {
    /// Product ID.
    pub product_id: ProductId,
    /// Variant ID, possibly stale.
    pub variant_id: Option<VariantId>,
    /// Volume discriminator fallback.
    pub ml:         Option<u32>,
    /// Units to move.
    pub quantity:   u32,
}

/// In-memory catalog store with atomic stock operations.
#[derive(Debug)]
pub struct CatalogService {
    products: Arc<Mutex<HashMap<ProductId, Product>>>,
}

impl CatalogService {
    /// Creates a new catalog service.
    #[must_use]
    pub fn new() -> Self {
        Self { products: Arc::new(Mutex::new(HashMap::new())) }
    }

    /// Adds a product.
    ///
    /// Enforces that every offer price is at most its list price.
    pub fn add_product(&self, product: Product) -> StoreResult<()> {
        if let Some(offer) = product.offer_price {
            if offer > product.price {
                return Err(StoreError::ValidationError(format!(
                    "offer price {} exceeds list price {} for {}",
                    offer, product.price, product.id
                )));
            }
        }
        for variant in &product.variants {
            if let Some(offer) = variant.offer_price {
                if offer > variant.price {
                    return Err(StoreError::ValidationError(format!(
                        "offer price {} exceeds list price {} for variant {}",
                        offer, variant.price, variant.id
                    )));
                }
            }
        }

        let mut products = self.products.lock().map_err(|_| StoreError::LockError)?;
        products.insert(product.id.clone(), product);
        Ok(())
    }

    /// Gets a product by ID.
    pub fn find_product(&self, id: &ProductId) -> StoreResult<Product> {
        let products = self.products.lock().map_err(|_| StoreError::LockError)?;
        products
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::ProductNotFound(id.0.clone()))
    }

    /// Current stock for a line's resolved variant (or flat product stock).
    pub fn available_stock(&self, line: &StockLine) -> StoreResult<u32> {
        let products = self.products.lock().map_err(|_| StoreError::LockError)?;
        let product = products
            .get(&line.product_id)
            .ok_or_else(|| StoreError::ProductNotFound(line.product_id.0.clone()))?;

        Ok(match resolve_variant(product, line.variant_id.as_ref(), line.ml) {
            Some(variant) => variant.quantity,
            None => product.stock,
        })
    }

    /// Atomically decrements stock for a batch of lines.
    ///
    /// Verifies every line against current stock first, then applies every
    /// decrement under the same lock; a short line rejects the whole batch
    /// with `InsufficientStock` and nothing is applied.
    pub fn decrement_stock(&self, lines: &[StockLine]) -> StoreResult<()> {
        let mut products = self.products.lock().map_err(|_| StoreError::LockError)?;

        // Verify pass. Demand is tracked cumulatively per resolved target
        // so two lines draining the same variant cannot both pass against
        // the same starting stock.
        let mut remaining: HashMap<(ProductId, Option<VariantId>), u32> = HashMap::new();
        for line in lines {
            let product = products
                .get(&line.product_id)
                .ok_or_else(|| StoreError::ProductNotFound(line.product_id.0.clone()))?;
            let (key, available) = match resolve_variant(product, line.variant_id.as_ref(), line.ml)
            {
                Some(variant) => ((line.product_id.clone(), Some(variant.id.clone())), variant.quantity),
                None => ((line.product_id.clone(), None), product.stock),
            };
            let left = remaining.entry(key).or_insert(available);
            if *left < line.quantity {
                return Err(StoreError::InsufficientStock {
                    product_id: line.product_id.0.clone(),
                    available:  *left,
                    requested:  line.quantity,
                });
            }
            *left -= line.quantity;
        }

        // Apply pass
        for line in lines {
            let product = products
                .get_mut(&line.product_id)
                .ok_or_else(|| StoreError::ProductNotFound(line.product_id.0.clone()))?;
            match resolve_variant_mut(product, line.variant_id.as_ref(), line.ml) {
                Some(variant) => variant.quantity -= line.quantity,
                None => product.stock -= line.quantity,
            }
        }

        Ok(())
    }

    /// Restores stock for a cancelled or returned line.
    ///
    /// Increments the resolved variant's quantity; when no variant matches
    /// any more, falls back to the product's flat stock field. A missing
    /// product is a data-integrity problem: logged, not fatal.
    pub fn increment_stock(&self, line: &StockLine) -> StoreResult<()> {
        let mut products = self.products.lock().map_err(|_| StoreError::LockError)?;

        let Some(product) = products.get_mut(&line.product_id) else {
            tracing::warn!(
                product_id = %line.product_id,
                "stock restore skipped: product no longer exists"
            );
            return Ok(());
        };

        match resolve_variant_mut(product, line.variant_id.as_ref(), line.ml) {
            Some(variant) => {
                variant.quantity = variant.quantity.saturating_add(line.quantity);
            },
            None => {
                tracing::warn!(
                    product_id = %line.product_id,
                    variant_id = ?line.variant_id,
                    "stock restore fell back to flat product stock"
                );
                product.stock = product.stock.saturating_add(line.quantity);
            },
        }

        Ok(())
    }
}

impl Default for CatalogService {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable counterpart of [`resolve_variant`], same id-then-ml fallback.
fn resolve_variant_mut<'a>(
    product: &'a mut Product, variant_id: Option<&VariantId>, ml: Option<u32>,
) -> Option<&'a mut Variant> {
    if let Some(id) = variant_id {
        if product.variants.iter().any(|v| &v.id == id) {
            return product.variants.iter_mut().find(|v| &v.id == id);
        }
    }
    if let Some(ml) = ml {
        return product.variants.iter_mut().find(|v| v.ml == ml);
    }
    None
}
