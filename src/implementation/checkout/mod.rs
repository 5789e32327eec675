//! # Checkout Orchestrator
//!
//! Places orders from per-user checkout drafts: runs the pricing
//! pipeline, enforces the payment-method rules (COD ceiling, wallet
//! balance, gateway intents), and commits the stock, wallet, coupon,
//! and order side effects together. Also owns the online-payment
//! verification and retry lifecycle.

mod gateway;
mod service;


pub use gateway::{
    sign_payload, signature_matches, MockGateway, PaymentGateway, PaymentIntent,
    VerifyPaymentRequest,
};
pub use service::{CheckoutDraft, CheckoutItem, CheckoutService};
