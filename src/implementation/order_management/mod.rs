//! # Order Lifecycle Management
//!
//! The order aggregate: per-line status state machines, derived
//! order-level statuses, and the reconciliation that keeps stock,
//! wallet, coupon, and monetary totals consistent whenever lines are
//! cancelled or returned.

pub mod implementations;
pub mod types;


pub use implementations::{
    allowed_next, recompute_order_payment_status, recompute_order_status, OrderService,
};
pub use types::{
    LineId, LinePaymentStatus, LineStatus, Order, OrderId, OrderLine, OrderPaymentStatus,
    OrderStatus,
};
