//! Line state machine and order-level derived state.
//!
//! The transition table lives here, in one place; call sites never test
//! status strings ad hoc. The two recompute functions are pure and are
//! always invoked together after a line mutation, except the customer
//! return request which defers order-status recomputation.

use super::super::types::{LinePaymentStatus, LineStatus, OrderLine, OrderPaymentStatus, OrderStatus};

/// Legal next statuses from a line's current status, any actor.
///
/// `Shipped -> Cancelled` is deliberately not in the table: once an item
/// is with the carrier it can only move forward to `Delivered`.
#[must_use]
pub fn allowed_next(current: LineStatus) -> Vec<LineStatus> {
    match current {
        LineStatus::Pending => vec![LineStatus::Processing, LineStatus::Cancelled],
        LineStatus::Processing => vec![LineStatus::Shipped, LineStatus::Cancelled],
        LineStatus::Shipped => vec![LineStatus::Delivered],
        LineStatus::Delivered => vec![LineStatus::ReturnRequested],
        LineStatus::ReturnRequested => {
            vec![LineStatus::ReturnApproved, LineStatus::Delivered]
        },
        LineStatus::ReturnApproved => vec![LineStatus::Returned],
        LineStatus::Cancelled | LineStatus::Returned => Vec::new(),
    }
}

/// Derives the order status from the full line collection.
///
/// An order is only as done as its least-progressed still-active line;
/// lines mid-return are excluded so a pending return does not regress the
/// order status.
#[must_use]
pub fn recompute_order_status(lines: &[OrderLine]) -> OrderStatus {
    if lines.is_empty() {
        return OrderStatus::Pending;
    }

    let all_returned = lines.iter().all(|l| l.status == LineStatus::Returned);
    if all_returned {
        return OrderStatus::Returned;
    }

    let any_returned = lines.iter().any(|l| l.status == LineStatus::Returned);
    let all_terminal = lines.iter().all(|l| l.status.is_terminal());
    if any_returned && all_terminal {
        return OrderStatus::Returned;
    }

    if lines.iter().all(|l| l.status == LineStatus::Cancelled) {
        return OrderStatus::Cancelled;
    }

    let least_advanced = lines
        .iter()
        .filter(|l| l.status.is_active())
        .min_by_key(|l| l.status.flow_rank())
        .map(|l| l.status);

    match least_advanced {
        None => OrderStatus::Delivered,
        Some(LineStatus::Pending) => OrderStatus::Pending,
        Some(LineStatus::Processing) => OrderStatus::Processing,
        Some(LineStatus::Shipped) => OrderStatus::Shipped,
        Some(_) => OrderStatus::Delivered,
    }
}

/// Derives the order payment status from the full line collection.
#[must_use]
pub fn recompute_order_payment_status(lines: &[OrderLine]) -> OrderPaymentStatus {
    if lines.is_empty() {
        return OrderPaymentStatus::Pending;
    }

    let active: Vec<&OrderLine> = lines.iter().filter(|l| l.status.is_billable()).collect();

    if active.is_empty() {
        let all_cancelled = lines.iter().all(|l| l.status == LineStatus::Cancelled);
        let all_returned = lines.iter().all(|l| l.status == LineStatus::Returned);
        return if all_cancelled {
            OrderPaymentStatus::Pending
        } else if all_returned {
            OrderPaymentStatus::Refunded
        } else {
            OrderPaymentStatus::Paid
        };
    }

    let all_post_delivery = active.iter().all(|l| {
        matches!(
            l.status,
            LineStatus::Delivered | LineStatus::ReturnRequested | LineStatus::ReturnApproved
        )
    });
    if all_post_delivery {
        return OrderPaymentStatus::Paid;
    }

    if active.iter().any(|l| l.payment_status == LinePaymentStatus::Failed) {
        OrderPaymentStatus::Failed
    } else if active.iter().all(|l| l.payment_status == LinePaymentStatus::Refunded) {
        OrderPaymentStatus::Refunded
    } else if active.iter().any(|l| l.payment_status == LinePaymentStatus::RefundApproved) {
        OrderPaymentStatus::RefundApproved
    } else if active.iter().any(|l| l.payment_status == LinePaymentStatus::ReturnRequested) {
        OrderPaymentStatus::RefundProcessing
    } else if active.iter().any(|l| l.payment_status == LinePaymentStatus::Pending) {
        OrderPaymentStatus::Pending
    } else {
        OrderPaymentStatus::Paid
    }
}
