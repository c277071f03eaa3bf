//! Port to the backend's order resource.

use async_trait::async_trait;
use storefront_core::error::StorefrontError;
use storefront_core::ids::OrderId;

use super::aggregates::Order;
use super::status::{OrderStatus, PaymentMethod};

/// Remote order operations.
///
/// Implementations fail with `Network`, `Auth`, `NotFound` or `Server`.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Create an order from the server-side cart. The server computes items
    /// and total; the returned order carries its frozen lines.
    async fn create_order(
        &self,
        payment_method: PaymentMethod,
        payment_reference: Option<&str>,
    ) -> Result<Order, StorefrontError>;

    /// All orders of the signed-in customer, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>, StorefrontError>;

    /// One order with its lines.
    async fn get_order(&self, order_id: OrderId) -> Result<Order, StorefrontError>;

    /// Change an order's status. Server-driven; the checkout never calls it.
    async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), StorefrontError>;
}
