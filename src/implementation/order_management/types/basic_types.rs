//! Identifiers and status enumerations for orders and order lines.
//!
//! Statuses are closed tagged variants, never free-form strings; the
//! transition table is enforced centrally in the order service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// BASIC IDENTIFIERS
// ============================================================================

/// Unique internal order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    /// Generates a new unique order ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique order-line identifier, scoped to its order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineId(pub Uuid);

impl LineId {
    /// Generates a new unique line ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// STATUS ENUMS
// ============================================================================

/// Status of one order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineStatus {
    /// Awaiting fulfilment.
    #[default]
    Pending,
    /// Being prepared.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Delivered to the customer.
    Delivered,
    /// Cancelled before delivery. Terminal.
    Cancelled,
    /// Customer asked to return the item.
    ReturnRequested,
    /// Return accepted by an admin; refund amount frozen.
    ReturnApproved,
    /// Item returned and refunded. Terminal.
    Returned,
}

impl LineStatus {
    /// Whether the line can never transition again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Returned)
    }

    /// Whether the line still contributes to the order's charge.
    #[must_use]
    pub fn is_billable(&self) -> bool {
        !matches!(self, Self::Cancelled | Self::Returned)
    }

    /// Whether the line counts toward order-status derivation.
    ///
    /// Lines mid-return are excluded so a pending return does not regress
    /// the order status.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(
            self,
            Self::Cancelled | Self::Returned | Self::ReturnApproved | Self::ReturnRequested
        )
    }

    /// Position in the forward flow Pending < Processing < Shipped < Delivered.
    ///
    /// Only meaningful for active statuses.
    #[must_use]
    pub fn flow_rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Processing => 1,
            Self::Shipped => 2,
            Self::Delivered => 3,
            // Branch states never enter the flow minimum
            Self::Cancelled | Self::ReturnRequested | Self::ReturnApproved | Self::Returned => 4,
        }
    }

    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::ReturnRequested => "Return Requested",
            Self::ReturnApproved => "Return Approved",
            Self::Returned => "Returned",
        }
    }
}

impl std::fmt::Display for LineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Payment status of one order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LinePaymentStatus {
    /// Money not yet collected for this line.
    #[default]
    Pending,
    /// Collected.
    Paid,
    /// Online collection failed.
    Failed,
    /// Customer asked for the money back.
    ReturnRequested,
    /// Refund approved, amount frozen.
    RefundApproved,
    /// Refunded.
    Refunded,
}

impl LinePaymentStatus {
    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Failed => "Failed",
            Self::ReturnRequested => "Return Requested",
            Self::RefundApproved => "Refund Approved",
            Self::Refunded => "Refunded",
        }
    }
}

impl std::fmt::Display for LinePaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Order-level status, derived from the line statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    /// At least one active line is pending.
    #[default]
    Pending,
    /// Least-advanced active line is processing.
    Processing,
    /// Least-advanced active line is shipped.
    Shipped,
    /// Every active line is delivered.
    Delivered,
    /// Every line is cancelled.
    Cancelled,
    /// Every line is returned (or returned plus cancelled).
    Returned,
}

impl OrderStatus {
    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Returned => "Returned",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Order-level payment status, derived from the line payment statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderPaymentStatus {
    /// Money not yet collected.
    #[default]
    Pending,
    /// Collected in full for the billable lines.
    Paid,
    /// Online collection failed.
    Failed,
    /// A return is pending a refund decision.
    RefundProcessing,
    /// A refund has been approved but not completed.
    RefundApproved,
    /// Fully refunded.
    Refunded,
}

impl OrderPaymentStatus {
    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Failed => "Failed",
            Self::RefundProcessing => "Refund Processing",
            Self::RefundApproved => "Refund Approved",
            Self::Refunded => "Refunded",
        }
    }
}

impl std::fmt::Display for OrderPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
