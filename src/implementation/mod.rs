//! Service implementations for the storefront core.

pub mod catalog;
pub mod checkout;
pub mod coupon;
pub mod order_management;
pub mod pricing;
pub mod wallet;
