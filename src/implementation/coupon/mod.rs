//! # Coupon Eligibility Service
//!
//! Validates promotional codes against cart value, expiry, active flag,
//! and the per-user usage cap; records a usage at order placement and
//! releases it again when the order that consumed it is cancelled or no
//! longer qualifies.

mod service;

#[cfg(test)]
mod tests;

pub use service::{Coupon, CouponId, CouponService, CouponUsage};

pub(crate) use service::check_eligibility;
