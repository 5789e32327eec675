//! Wallet service implementation.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{StoreError, StoreResult};
use crate::types::UserId;

/// Direction of a wallet movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionDirection {
    /// Money into the wallet.
    Credit,
    /// Money out of the wallet.
    Debit,
}

/// One entry in the append-only wallet ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletTransaction {
    /// Amount moved, in minor units.
    pub amount:      u64,
    /// Credit or debit.
    pub direction:   TransactionDirection,
    /// When the movement happened.
    pub at:          DateTime<Utc>,
    /// Human-readable description.
    pub description: String,
}

/// A user's wallet: derived balance plus its ledger.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Wallet {
    /// Current balance in minor units; never negative.
    pub balance:      u64,
    /// Ordered transaction log.
    pub transactions: Vec<WalletTransaction>,
}

/// In-memory wallet store with atomic credit/debit.
#[derive(Debug)]
pub struct WalletService {
    wallets: Arc<Mutex<HashMap<UserId, Wallet>>>,
}

impl WalletService {
    /// Creates a new wallet service.
    #[must_use]
    pub fn new() -> Self {
        Self { wallets: Arc::new(Mutex::new(HashMap::new())) }
    }

    /// Current balance for a user; 0 when no wallet exists yet.
    pub fn balance(&self, user_id: &UserId) -> StoreResult<u64> {
        let wallets = self.wallets.lock().map_err(|_| StoreError::LockError)?;
        Ok(wallets.get(user_id).map(|w| w.balance).unwrap_or(0))
    }

    /// Snapshot of a user's wallet; empty wallet when none exists yet.
    pub fn wallet(&self, user_id: &UserId) -> StoreResult<Wallet> {
        let wallets = self.wallets.lock().map_err(|_| StoreError::LockError)?;
        Ok(wallets.get(user_id).cloned().unwrap_or_default())
    }

    /// Credits a user's wallet, creating it lazily.
    pub fn credit(
        &self, user_id: &UserId, amount: u64, description: impl Into<String>,
    ) -> StoreResult<()> {
        if amount == 0 {
            return Ok(());
        }

        let mut wallets = self.wallets.lock().map_err(|_| StoreError::LockError)?;
        let wallet = wallets.entry(user_id.clone()).or_default();

        wallet.balance = wallet.balance.saturating_add(amount);
        wallet.transactions.push(WalletTransaction {
            amount,
            direction: TransactionDirection::Credit,
            at: Utc::now(),
            description: description.into(),
        });

        tracing::debug!(user = %user_id, amount, "wallet credited");
        Ok(())
    }

    /// Debits a user's wallet.
    ///
    /// Fails with `InsufficientWalletBalance` rather than letting the
    /// balance go negative; check and decrement happen under one lock.
    pub fn debit(
        &self, user_id: &UserId, amount: u64, description: impl Into<String>,
    ) -> StoreResult<()> {
        if amount == 0 {
            return Ok(());
        }

        let mut wallets = self.wallets.lock().map_err(|_| StoreError::LockError)?;
        let wallet = wallets.entry(user_id.clone()).or_default();

        if wallet.balance < amount {
            return Err(StoreError::InsufficientWalletBalance {
                required:  amount,
                available: wallet.balance,
            });
        }

        wallet.balance -= amount;
        wallet.transactions.push(WalletTransaction {
            amount,
            direction: TransactionDirection::Debit,
            at: Utc::now(),
            description: description.into(),
        });

        tracing::debug!(user = %user_id, amount, "wallet debited");
        Ok(())
    }
}

impl Default for WalletService {
    fn default() -> Self {
        Self::new()
    }
}
