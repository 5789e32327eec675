//! Shared domain types.

pub mod catalog;
pub mod money;

use serde::{Deserialize, Serialize};

/// Customer identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Creates a new user ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shipping address snapshot, copied onto the order at placement time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Recipient name.
    pub name:    String,
    /// Street line.
    pub street:  String,
    /// City.
    pub city:    String,
    /// State or region.
    pub state:   String,
    /// Postal code.
    pub pincode: String,
    /// Contact phone.
    pub phone:   String,
}

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Cash collected on delivery.
    CashOnDelivery,
    /// Store-credit wallet.
    Wallet,
    /// External online payment gateway.
    Online,
}

impl PaymentMethod {
    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CashOnDelivery => "Cash on Delivery",
            Self::Wallet => "Wallet",
            Self::Online => "Online",
        }
    }
}

/// Who is performing a line-status mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    /// Store administrator.
    Admin,
    /// Order owner.
    Customer,
}
