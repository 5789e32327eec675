//! Order line type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::basic_types::{LineId, LinePaymentStatus, LineStatus};
use crate::types::catalog::{ProductId, VariantId};
use crate::types::money;

/// One product-variant-quantity purchased, embedded in its order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Line ID.
    pub id:                    LineId,
    /// Product reference.
    pub product_id:            ProductId,
    /// Variant reference; may go stale after catalog edits.
    pub variant_id:            Option<VariantId>,
    /// Volume discriminator used when the variant id is stale.
    pub ml:                    Option<u32>,
    /// Quantity ordered (>= 1).
    pub quantity:              u32,
    /// Unit offer price charged, frozen at purchase time.
    pub unit_price:            u64,
    /// Line status.
    pub status:                LineStatus,
    /// Line payment status.
    pub payment_status:        LinePaymentStatus,
    /// Reason given for cancellation.
    pub cancellation_reason:   Option<String>,
    /// Reason given for the return request.
    pub return_reason:         Option<String>,
    /// When the line was delivered.
    pub delivered_date:        Option<DateTime<Utc>>,
    /// When the return was approved.
    pub return_approval_date:  Option<DateTime<Utc>>,
    /// When a return request was rejected.
    pub return_rejection_date: Option<DateTime<Utc>>,
    /// When the item came back.
    pub returned_date:         Option<DateTime<Utc>>,
    /// Frozen refund amount; immutable once set.
    pub refund_amount:         Option<u64>,
    /// When the refund completed.
    pub refund_date:           Option<DateTime<Utc>>,
}

impl OrderLine {
    /// Creates a new pending line with a frozen unit price.
    #[must_use]
    pub fn new(
        product_id: ProductId, variant_id: Option<VariantId>, ml: Option<u32>, quantity: u32,
        unit_price: u64,
    ) -> Self {
        Self {
            id: LineId::generate(),
            product_id,
            variant_id,
            ml,
            quantity,
            unit_price,
            status: LineStatus::Pending,
            payment_status: LinePaymentStatus::Pending,
            cancellation_reason: None,
            return_reason: None,
            delivered_date: None,
            return_approval_date: None,
            return_rejection_date: None,
            returned_date: None,
            refund_amount: None,
            refund_date: None,
        }
    }

    /// Frozen line total: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> u64 {
        money::line_total(self.unit_price, self.quantity)
    }
}
