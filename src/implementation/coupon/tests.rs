// ============================================================================
// TESTS
// ============================================================================

use chrono::{Duration, Utc};

use super::service::CouponService;
use crate::errors::StoreError;
use crate::implementation::order_management::types::OrderId;
use crate::types::UserId;

fn service_with_coupon(max_usage_per_user: u32) -> CouponService {
    let service = CouponService::new();
    service
        .create_coupon(
            "save200",
            1000_00,
            200_00,
            Utc::now() + Duration::days(30),
            max_usage_per_user,
        )
        .expect("create coupon");
    service
}

#[test]
fn test_code_is_normalized_uppercase() {
    let service = service_with_coupon(1);
    let coupon = service.find_coupon("  Save200 ").expect("find");
    assert_eq!(coupon.code, "SAVE200");
}

#[test]
fn test_discount_cannot_exceed_min_cart_value() {
    let service = CouponService::new();
    let result = service.create_coupon("BIG", 100_00, 500_00, Utc::now() + Duration::days(1), 1);
    assert!(matches!(result, Err(StoreError::ValidationError(_))));
}

#[test]
fn test_validate_rejects_below_minimum() {
    let service = service_with_coupon(1);
    let user = UserId::new("user-1");

    let result = service.validate("SAVE200", &user, 900_00);
    assert!(matches!(result, Err(StoreError::CouponIneligible { .. })));
}

#[test]
fn test_validate_rejects_inactive_and_expired() {
    let service = service_with_coupon(1);
    let user = UserId::new("user-1");

    service.set_active("SAVE200", false).expect("deactivate");
    assert!(service.validate("SAVE200", &user, 1500_00).is_err());
    service.set_active("SAVE200", true).expect("reactivate");

    let expired = CouponService::new();
    expired
        .create_coupon("OLD", 500_00, 100_00, Utc::now() - Duration::days(1), 1)
        .expect("create");
    assert!(expired.validate("OLD", &user, 1500_00).is_err());
}

#[test]
fn test_usage_cap_enforced_and_released() {
    let service = service_with_coupon(1);
    let user = UserId::new("user-1");
    let order = OrderId::generate();

    service.validate("SAVE200", &user, 1500_00).expect("eligible");
    service.record_usage("SAVE200", &user, &order).expect("record");

    let result = service.validate("SAVE200", &user, 1500_00);
    assert!(matches!(result, Err(StoreError::CouponIneligible { .. })));

    service.release_usage("SAVE200", &order).expect("release");
    service.validate("SAVE200", &user, 1500_00).expect("eligible again");

    let coupon = service.find_coupon("SAVE200").expect("find");
    assert_eq!(coupon.total_usage, 0);
    assert!(coupon.usages.is_empty());
}

#[test]
fn test_release_is_idempotent() {
    let service = service_with_coupon(2);
    let user = UserId::new("user-1");
    let order = OrderId::generate();

    service.record_usage("SAVE200", &user, &order).expect("record");
    service.release_usage("SAVE200", &order).expect("release");
    service.release_usage("SAVE200", &order).expect("release again");

    assert_eq!(service.find_coupon("SAVE200").expect("find").total_usage, 0);
}
