//! Business logic implementations for the order aggregate.

mod order_impl;
mod service_impl;
mod status;

pub use service_impl::OrderService;
pub use status::{allowed_next, recompute_order_payment_status, recompute_order_status};
