//! # Storefront Core
//!
//! Order lifecycle and monetary reconciliation engine for an e-commerce
//! storefront: checkout pricing, the order/line state machines, derived-state
//! recomputation, and the stock/wallet/coupon side-effect protocol.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod errors;
pub mod implementation;
pub mod types;

// Re-exports for public API
pub use config::CheckoutConfig;
pub use errors::{StoreError, StoreResult};
pub use implementation::catalog::CatalogService;
pub use implementation::checkout::{
    CheckoutDraft, CheckoutItem, CheckoutService, MockGateway, PaymentGateway, PaymentIntent,
    VerifyPaymentRequest,
};
pub use implementation::coupon::{Coupon, CouponService};
pub use implementation::order_management::{
    LineId, LineStatus, Order, OrderId, OrderLine, OrderPaymentStatus, OrderService, OrderStatus,
};
pub use implementation::pricing::{price_items, PricedCart, PricingItem};
pub use implementation::wallet::WalletService;
