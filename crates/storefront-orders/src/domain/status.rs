//! Payment methods and order statuses as the backend spells them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use storefront_core::error::StorefrontError;

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Credit card.
    CreditCard,
    /// Debit card.
    DebitCard,
    /// PIX instant transfer; requires a payment reference.
    Pix,
}

impl PaymentMethod {
    /// Wire name, e.g. `CREDIT_CARD`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreditCard => "CREDIT_CARD",
            Self::DebitCard => "DEBIT_CARD",
            Self::Pix => "PIX",
        }
    }

    /// Whether submissions with this method must carry a reference.
    #[must_use]
    pub fn requires_reference(&self) -> bool {
        matches!(self, Self::Pix)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = StorefrontError;

    /// Accepts the wire name or its kebab-case form (`credit-card`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "CREDIT_CARD" => Ok(Self::CreditCard),
            "DEBIT_CARD" => Ok(Self::DebitCard),
            "PIX" => Ok(Self::Pix),
            _ => Err(StorefrontError::Validation(format!(
                "unknown payment method: {s}"
            ))),
        }
    }
}

/// Server-reported order lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Created, not yet processed. The only status the client assigns.
    Pending,
    /// Being prepared.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer.
    #[serde(alias = "COMPLETED")]
    Delivered,
    /// Cancelled.
    Cancelled,
}

impl OrderStatus {
    /// Whether no further transitions are expected.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(name)
    }
}
