//! # Wallet Ledger
//!
//! Per-user store credit: an append-only transaction log plus a derived
//! balance. Wallets are created lazily on first credit or debit and the
//! balance always equals the signed sum of the ledger.

mod service;

#[cfg(test)]
mod tests;

pub use service::{TransactionDirection, Wallet, WalletService, WalletTransaction};
