//! # Catalog & Inventory Ledger
//!
//! In-memory product store exposing the inventory operations the order
//! core depends on: atomic decrement-on-purchase and restore-on-cancel or
//! return, with a product-level flat-stock fallback when a variant no
//! longer resolves.

mod service;

#[cfg(test)]
mod tests;

pub use service::{CatalogService, StockLine};
