// ============================================================================
// TESTS
// ============================================================================

use super::service::{TransactionDirection, WalletService};
use crate::errors::StoreError;
use crate::types::UserId;

#[test]
fn test_wallet_created_lazily() {
    let service = WalletService::new();
    let user = UserId::new("user-1");

    assert_eq!(service.balance(&user).expect("balance"), 0);

    service.credit(&user, 500_00, "Signup bonus").expect("credit");
    assert_eq!(service.balance(&user).expect("balance"), 500_00);
}

#[test]
fn test_debit_rejects_overdraft() {
    let service = WalletService::new();
    let user = UserId::new("user-1");

    service.credit(&user, 100_00, "Top up").expect("credit");

    let result = service.debit(&user, 150_00, "Order payment");
    assert_eq!(
        result,
        Err(StoreError::InsufficientWalletBalance { required: 150_00, available: 100_00 })
    );
    assert_eq!(service.balance(&user).expect("balance"), 100_00);
}

#[test]
fn test_balance_equals_signed_ledger_sum() {
    let service = WalletService::new();
    let user = UserId::new("user-1");

    service.credit(&user, 300_00, "Refund").expect("credit");
    service.debit(&user, 120_00, "Order payment").expect("debit");
    service.credit(&user, 40_00, "Cancellation refund").expect("credit");

    let wallet = service.wallet(&user).expect("wallet");
    let signed_sum: i64 = wallet
        .transactions
        .iter()
        .map(|t| match t.direction {
            TransactionDirection::Credit => t.amount as i64,
            TransactionDirection::Debit => -(t.amount as i64),
        })
        .sum();

    assert_eq!(wallet.balance as i64, signed_sum);
    assert_eq!(wallet.transactions.len(), 3);
}

#[test]
fn test_zero_amounts_do_not_append_transactions() {
    let service = WalletService::new();
    let user = UserId::new("user-1");

    service.credit(&user, 0, "No-op").expect("credit");
    service.debit(&user, 0, "No-op").expect("debit");

    assert!(service.wallet(&user).expect("wallet").transactions.is_empty());
}
