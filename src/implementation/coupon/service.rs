//! Coupon service implementation.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{StoreError, StoreResult};
use crate::implementation::order_management::types::OrderId;
use crate::types::UserId;

/// Unique coupon identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CouponId(pub Uuid);

impl CouponId {
    /// Generates a new unique coupon ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for CouponId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Proof that a coupon was consumed by a specific order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponUsage {
    /// User who redeemed the coupon.
    pub user_id:  UserId,
    /// Order that consumed it.
    pub order_id: OrderId,
    /// When it was redeemed.
    pub at:       DateTime<Utc>,
}

/// A promotional code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Coupon ID.
    pub id:                 CouponId,
    /// Normalized uppercase code.
    pub code:               String,
    /// Minimum cart subtotal required to apply.
    pub min_cart_value:     u64,
    /// Flat discount amount (not a percentage).
    pub discount_value:     u64,
    /// Whether the coupon is currently usable.
    pub active:             bool,
    /// Expiry timestamp.
    pub expires_at:         DateTime<Utc>,
    /// Redemption cap per user, counted over non-cancelled orders.
    pub max_usage_per_user: u32,
    /// Usage records backing the cap.
    pub usages:             Vec<CouponUsage>,
    /// Total redemption counter.
    pub total_usage:        u64,
}

/// In-memory coupon store, keyed by normalized code.
#[derive(Debug)]
pub struct CouponService {
    coupons: Arc<Mutex<HashMap<String, Coupon>>>,
}

impl CouponService {
    /// Creates a new coupon service.
    #[must_use]
    pub fn new() -> Self {
        Self { coupons: Arc::new(Mutex::new(HashMap::new())) }
    }

    /// Registers a coupon.
    ///
    /// The code is normalized to uppercase. A coupon cannot discount more
    /// than the minimum cart it requires.
    pub fn create_coupon(
        &self, code: impl Into<String>, min_cart_value: u64, discount_value: u64,
        expires_at: DateTime<Utc>, max_usage_per_user: u32,
    ) -> StoreResult<Coupon> {
        let code = code.into().trim().to_uppercase();
        if code.is_empty() {
            return Err(StoreError::ValidationError("coupon code is empty".to_string()));
        }
        if discount_value > min_cart_value {
            return Err(StoreError::ValidationError(format!(
                "discount {} exceeds minimum cart value {}",
                discount_value, min_cart_value
            )));
        }

        let mut coupons = self.coupons.lock().map_err(|_| StoreError::LockError)?;
        if coupons.contains_key(&code) {
            return Err(StoreError::CouponAlreadyExists(code));
        }

        let coupon = Coupon {
            id: CouponId::generate(),
            code: code.clone(),
            min_cart_value,
            discount_value,
            active: true,
            expires_at,
            max_usage_per_user,
            usages: Vec::new(),
            total_usage: 0,
        };
        coupons.insert(code, coupon.clone());
        Ok(coupon)
    }

    /// Enables or disables a coupon.
    pub fn set_active(&self, code: &str, active: bool) -> StoreResult<()> {
        let code = code.trim().to_uppercase();
        let mut coupons = self.coupons.lock().map_err(|_| StoreError::LockError)?;
        let coupon = coupons
            .get_mut(&code)
            .ok_or_else(|| StoreError::CouponNotFound(code.clone()))?;
        coupon.active = active;
        Ok(())
    }

    /// Gets a coupon by code.
    pub fn find_coupon(&self, code: &str) -> StoreResult<Coupon> {
        let code = code.trim().to_uppercase();
        let coupons = self.coupons.lock().map_err(|_| StoreError::LockError)?;
        coupons
            .get(&code)
            .cloned()
            .ok_or_else(|| StoreError::CouponNotFound(code.clone()))
    }

    /// Validates a coupon for a user against a cart subtotal.
    ///
    /// Checks existence, active flag, expiry, minimum cart value, and the
    /// per-user usage cap; returns the coupon on success.
    pub fn validate(&self, code: &str, user_id: &UserId, subtotal: u64) -> StoreResult<Coupon> {
        let coupon = self
            .find_coupon(code)
            .map_err(|_| StoreError::CouponIneligible { reason: "unknown coupon code".to_string() })?;

        check_eligibility(&coupon, subtotal, Utc::now())?;

        let used = coupon.usages.iter().filter(|u| &u.user_id == user_id).count();
        if used as u32 >= coupon.max_usage_per_user {
            return Err(StoreError::CouponIneligible {
                reason: format!("usage cap of {} reached", coupon.max_usage_per_user),
            });
        }

        Ok(coupon)
    }

    /// Records a usage at order placement.
    pub fn record_usage(&self, code: &str, user_id: &UserId, order_id: &OrderId) -> StoreResult<()> {
        let code = code.trim().to_uppercase();
        let mut coupons = self.coupons.lock().map_err(|_| StoreError::LockError)?;
        let coupon = coupons
            .get_mut(&code)
            .ok_or_else(|| StoreError::CouponNotFound(code.clone()))?;

        coupon.usages.push(CouponUsage {
            user_id:  user_id.clone(),
            order_id: *order_id,
            at:       Utc::now(),
        });
        coupon.total_usage += 1;
        Ok(())
    }

    /// Releases the usage recorded for an order.
    ///
    /// Called when the order that consumed the coupon is fully cancelled
    /// or drops below the coupon's minimum cart value. Idempotent: a
    /// usage that was already released is a no-op.
    pub fn release_usage(&self, code: &str, order_id: &OrderId) -> StoreResult<()> {
        let code = code.trim().to_uppercase();
        let mut coupons = self.coupons.lock().map_err(|_| StoreError::LockError)?;
        let Some(coupon) = coupons.get_mut(&code) else {
            tracing::warn!(code = %code, "coupon release skipped: code no longer exists");
            return Ok(());
        };

        let before = coupon.usages.len();
        coupon.usages.retain(|u| &u.order_id != order_id);
        let released = before - coupon.usages.len();
        coupon.total_usage = coupon.total_usage.saturating_sub(released as u64);
        Ok(())
    }
}

impl Default for CouponService {
    fn default() -> Self {
        Self::new()
    }
}

/// Pure eligibility checks shared with the pricing pipeline: active flag,
/// expiry, and minimum cart value. The per-user cap needs the usage log
/// and stays on [`CouponService::validate`].
pub(crate) fn check_eligibility(
    coupon: &Coupon, subtotal: u64, now: DateTime<Utc>,
) -> StoreResult<()> {
    if !coupon.active {
        return Err(StoreError::CouponIneligible { reason: "coupon is inactive".to_string() });
    }
    if now > coupon.expires_at {
        return Err(StoreError::CouponIneligible { reason: "coupon has expired".to_string() });
    }
    if subtotal < coupon.min_cart_value {
        return Err(StoreError::CouponIneligible {
            reason: format!(
                "cart subtotal {} below minimum {}",
                subtotal, coupon.min_cart_value
            ),
        });
    }
    Ok(())
}
