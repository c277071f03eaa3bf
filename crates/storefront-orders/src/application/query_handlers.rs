//! Query handlers for the Order context.
//!
//! Read order history from the gateway and return serializable views.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use storefront_core::error::StorefrontError;
use storefront_core::ids::OrderId;

use crate::domain::aggregates::{Order, OrderLine};
use crate::domain::gateway::OrderGateway;
use crate::domain::status::{OrderStatus, PaymentMethod};

/// Read-only view of an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderView {
    /// The order identifier.
    pub order_id: OrderId,
    /// Current status.
    pub status: OrderStatus,
    /// Payment method used.
    pub payment_method: PaymentMethod,
    /// Payment reference, if any.
    pub payment_reference: Option<String>,
    /// Server-computed total.
    pub total_amount: Decimal,
    /// Sum of line quantities.
    pub item_count: u64,
    /// Frozen lines.
    pub items: Vec<OrderLine>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last status change.
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id(),
            status: order.status(),
            payment_method: order.payment_method(),
            payment_reference: order.payment_reference().map(str::to_owned),
            total_amount: order.total_amount(),
            item_count: order.items().iter().map(|line| u64::from(line.quantity)).sum(),
            items: order.items().to_vec(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        }
    }
}

/// Lists the customer's orders, newest first.
///
/// # Errors
///
/// Returns the gateway error.
pub async fn list_orders(gateway: &dyn OrderGateway) -> Result<Vec<OrderView>, StorefrontError> {
    let mut orders = gateway.list_orders().await?;
    orders.sort_by_key(|order| std::cmp::Reverse(order.created_at()));
    Ok(orders.iter().map(OrderView::from).collect())
}

/// Retrieves one order with its lines.
///
/// # Errors
///
/// Returns `StorefrontError::NotFound` if the order does not exist, or any
/// other gateway error.
pub async fn get_order_by_id(
    order_id: OrderId,
    gateway: &dyn OrderGateway,
) -> Result<OrderView, StorefrontError> {
    let order = gateway.get_order(order_id).await?;
    Ok(OrderView::from(&order))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use storefront_core::error::StorefrontError;
    use storefront_core::ids::{OrderId, ProductId};

    use super::*;

    #[derive(Debug)]
    struct StaticOrderGateway {
        orders: Vec<Order>,
    }

    #[async_trait]
    impl OrderGateway for StaticOrderGateway {
        async fn create_order(
            &self,
            _payment_method: PaymentMethod,
            _payment_reference: Option<&str>,
        ) -> Result<Order, StorefrontError> {
            Err(StorefrontError::Server {
                status: Some(405),
                message: "read only".into(),
            })
        }

        async fn list_orders(&self) -> Result<Vec<Order>, StorefrontError> {
            Ok(self.orders.clone())
        }

        async fn get_order(&self, order_id: OrderId) -> Result<Order, StorefrontError> {
            self.orders
                .iter()
                .find(|order| order.id() == order_id)
                .cloned()
                .ok_or_else(|| StorefrontError::NotFound(format!("order {order_id}")))
        }

        async fn update_status(
            &self,
            _order_id: OrderId,
            _status: OrderStatus,
        ) -> Result<(), StorefrontError> {
            Ok(())
        }
    }

    fn order(id: i64, day: u32) -> Order {
        let at = Utc.with_ymd_and_hms(2026, 1, day, 10, 0, 0).unwrap();
        Order::new(
            OrderId(id),
            vec![
                OrderLine {
                    product_id: ProductId(1),
                    quantity: 2,
                    unit_price: "5.00".parse().unwrap(),
                },
                OrderLine {
                    product_id: ProductId(2),
                    quantity: 1,
                    unit_price: "7.50".parse().unwrap(),
                },
            ],
            "17.50".parse().unwrap(),
            PaymentMethod::Pix,
            Some("PIX-abc".into()),
            OrderStatus::Pending,
            at,
            at,
        )
    }

    #[tokio::test]
    async fn test_list_orders_returns_newest_first() {
        // Arrange
        let gateway = StaticOrderGateway {
            orders: vec![order(1, 10), order(3, 12), order(2, 11)],
        };

        // Act
        let views = list_orders(&gateway).await.unwrap();

        // Assert
        let ids: Vec<i64> = views.iter().map(|view| view.order_id.0).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_get_order_by_id_returns_view_with_lines() {
        // Arrange
        let gateway = StaticOrderGateway {
            orders: vec![order(4, 15)],
        };

        // Act
        let view = get_order_by_id(OrderId(4), &gateway).await.unwrap();

        // Assert
        assert_eq!(view.order_id, OrderId(4));
        assert_eq!(view.item_count, 3);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.payment_reference.as_deref(), Some("PIX-abc"));
        assert_eq!(view.total_amount, "17.50".parse().unwrap());
    }

    #[tokio::test]
    async fn test_get_order_by_id_propagates_not_found() {
        let gateway = StaticOrderGateway { orders: Vec::new() };

        let result = get_order_by_id(OrderId(99), &gateway).await;

        match result.unwrap_err() {
            StorefrontError::NotFound(msg) => assert!(msg.contains("99")),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
