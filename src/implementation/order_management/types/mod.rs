//! Type definitions for the order aggregate.

mod basic_types;
mod main_order_types;
mod order_types;

pub use basic_types::{
    LineId, LinePaymentStatus, LineStatus, OrderId, OrderPaymentStatus, OrderStatus,
};
pub use main_order_types::Order;
pub use order_types::OrderLine;
