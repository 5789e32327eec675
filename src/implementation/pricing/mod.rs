//! # Pricing Pipeline
//!
//! One pure function prices a set of line items: per-line original and
//! offer totals, aggregate discounts, flat-or-free shipping, coupon
//! discount, and the final payable amount. Checkout preview, order
//! placement, and payment retry all call this same function so the three
//! sites can never drift apart.

mod pipeline;

#[cfg(test)]
mod tests;

pub use pipeline::{price_items, PricedCart, PricedLine, PricingItem};
