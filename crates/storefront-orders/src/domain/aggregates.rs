//! Aggregate roots for the Order context.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use storefront_cart::LineItem;
use storefront_core::error::StorefrontError;
use storefront_core::ids::{OrderId, ProductId};

use super::status::{OrderStatus, PaymentMethod};

/// A product line frozen into an order at placement time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    /// The ordered product.
    pub product_id: ProductId,
    /// Units ordered.
    pub quantity: u32,
    /// Price per unit charged.
    pub unit_price: Decimal,
}

impl OrderLine {
    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

impl From<&LineItem> for OrderLine {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id(),
            quantity: item.quantity(),
            unit_price: item.unit_price(),
        }
    }
}

/// A placed order.
///
/// Lines and total never change once created; only the status and its
/// timestamp follow server-reported updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    id: OrderId,
    items: Vec<OrderLine>,
    total_amount: Decimal,
    payment_method: PaymentMethod,
    payment_reference: Option<String>,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds an order from server-reported fields.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        id: OrderId,
        items: Vec<OrderLine>,
        total_amount: Decimal,
        payment_method: PaymentMethod,
        payment_reference: Option<String>,
        status: OrderStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            items,
            total_amount,
            payment_method,
            payment_reference,
            status,
            created_at,
            updated_at,
        }
    }

    /// Order identifier.
    #[must_use]
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Lines frozen at placement.
    #[must_use]
    pub fn items(&self) -> &[OrderLine] {
        &self.items
    }

    /// Server-computed total.
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    /// Payment method used.
    #[must_use]
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Payment reference, if one was submitted.
    #[must_use]
    pub fn payment_reference(&self) -> Option<&str> {
        self.payment_reference.as_deref()
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Creation time.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last status change.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Sets the lines of an order the server returned without them.
    ///
    /// Returns `false` and leaves the order unchanged if it already has lines.
    pub fn fill_missing_items(&mut self, items: Vec<OrderLine>) -> bool {
        if !self.items.is_empty() {
            return false;
        }
        self.items = items;
        true
    }

    /// Applies a server-reported status change.
    ///
    /// Returns `Ok(false)` without changing anything when the update is older
    /// than the order's current `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Validation` if the update targets a
    /// different order.
    pub fn apply_status_update(
        &mut self,
        order_id: OrderId,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StorefrontError> {
        if order_id != self.id {
            return Err(StorefrontError::Validation(format!(
                "status update for order {order_id} applied to order {}",
                self.id
            )));
        }
        if updated_at < self.updated_at {
            return Ok(false);
        }
        self.status = status;
        self.updated_at = updated_at;
        Ok(true)
    }
}
