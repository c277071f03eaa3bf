//! Wire shapes of the backend's JSON API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_cart::LineItem;
use storefront_core::error::StorefrontError;
use storefront_core::ids::{OrderId, ProductId};
use storefront_orders::{Order, OrderLine, OrderStatus, PaymentMethod};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartItemDto {
    pub product_id: i64,
    #[serde(default)]
    pub product_title: String,
    #[serde(default)]
    pub product_image: String,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_at_adding: Decimal,
    pub added_at: DateTime<Utc>,
}

impl CartItemDto {
    /// `Ok(None)` for lines the server reports with no units left.
    pub fn into_line_item(self) -> Result<Option<LineItem>, StorefrontError> {
        if self.quantity <= 0 {
            return Ok(None);
        }
        let quantity = u32::try_from(self.quantity).map_err(|_| malformed("cart item quantity"))?;
        LineItem::new(
            ProductId(self.product_id),
            self.product_title,
            self.product_image,
            quantity,
            self.price_at_adding,
            self.added_at,
        )
        .map(Some)
        // Quantity was checked above.
        .map_err(|_| malformed("cart item price"))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateOrderRequest<'a> {
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderHistoryDto {
    pub id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderItemDto {
    pub product_id: i64,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderWithItemsDto {
    pub order: OrderHistoryDto,
    #[serde(default)]
    pub items: Option<Vec<OrderItemDto>>,
}

impl OrderHistoryDto {
    pub fn order_id(&self) -> OrderId {
        OrderId(self.id)
    }

    pub fn into_order(self, items: Vec<OrderItemDto>) -> Result<Order, StorefrontError> {
        let lines = items
            .into_iter()
            .map(|item| {
                Ok(OrderLine {
                    product_id: ProductId(item.product_id),
                    quantity: u32::try_from(item.quantity)
                        .map_err(|_| malformed("order item quantity"))?,
                    unit_price: item.price,
                })
            })
            .collect::<Result<Vec<_>, StorefrontError>>()?;
        let payment_reference = self.payment_id.filter(|id| !id.is_empty());
        Ok(Order::new(
            OrderId(self.id),
            lines,
            self.total_amount,
            self.payment_method,
            payment_reference,
            self.status,
            self.created_at,
            self.updated_at,
        ))
    }
}

impl OrderWithItemsDto {
    pub fn into_order(self) -> Result<Order, StorefrontError> {
        self.order.into_order(self.items.unwrap_or_default())
    }
}

fn malformed(field: &str) -> StorefrontError {
    StorefrontError::Server {
        status: None,
        message: format!("malformed {field} in response"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_item_decodes_backend_payload() {
        // Arrange
        let json = r#"{
            "cartId": 3,
            "productId": 12,
            "productTitle": "Mug",
            "productImage": "https://cdn.test/mug.png",
            "quantity": 2,
            "priceAtAdding": 10.5,
            "addedAt": "2026-01-15T10:00:00Z"
        }"#;

        // Act
        let dto: CartItemDto = serde_json::from_str(json).unwrap();
        let item = dto.into_line_item().unwrap().unwrap();

        // Assert
        assert_eq!(item.product_id(), ProductId(12));
        assert_eq!(item.title(), "Mug");
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.unit_price(), "10.50".parse::<Decimal>().unwrap());
        assert_eq!(item.line_total(), "21".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_cart_item_with_zero_quantity_is_skipped() {
        let json = r#"{"productId":1,"quantity":0,"priceAtAdding":1,"addedAt":"2026-01-15T10:00:00Z"}"#;

        let dto: CartItemDto = serde_json::from_str(json).unwrap();

        assert!(dto.into_line_item().unwrap().is_none());
    }

    #[test]
    fn test_cart_item_with_negative_price_is_a_server_fault() {
        // Arrange
        let json = r#"{"productId":1,"quantity":1,"priceAtAdding":-4.5,"addedAt":"2026-01-15T10:00:00Z"}"#;
        let dto: CartItemDto = serde_json::from_str(json).unwrap();

        // Act
        let result = dto.into_line_item();

        // Assert
        match result {
            Err(StorefrontError::Server { status, message }) => {
                assert_eq!(status, None);
                assert_eq!(message, "malformed cart item price in response");
            }
            other => panic!("expected Server, got {other:?}"),
        }
    }

    #[test]
    fn test_create_order_request_omits_missing_reference() {
        let card = CreateOrderRequest {
            payment_method: PaymentMethod::CreditCard,
            payment_id: None,
        };
        let pix = CreateOrderRequest {
            payment_method: PaymentMethod::Pix,
            payment_id: Some("PIX-1"),
        };

        assert_eq!(
            serde_json::to_string(&card).unwrap(),
            r#"{"paymentMethod":"CREDIT_CARD"}"#
        );
        assert_eq!(
            serde_json::to_string(&pix).unwrap(),
            r#"{"paymentMethod":"PIX","paymentId":"PIX-1"}"#
        );
    }

    #[test]
    fn test_order_with_null_items_and_empty_payment_id() {
        // Arrange
        let json = r#"{
            "order": {
                "id": 9,
                "userId": 1,
                "totalAmount": 42.0,
                "status": "PENDING",
                "paymentMethod": "DEBIT_CARD",
                "paymentId": "",
                "createdAt": "2026-01-15T10:00:00Z",
                "updatedAt": "2026-01-15T10:00:00Z"
            },
            "items": null
        }"#;

        // Act
        let order = serde_json::from_str::<OrderWithItemsDto>(json)
            .unwrap()
            .into_order()
            .unwrap();

        // Assert
        assert_eq!(order.id(), OrderId(9));
        assert!(order.items().is_empty());
        assert_eq!(order.payment_reference(), None);
        assert_eq!(order.total_amount(), "42".parse::<Decimal>().unwrap());
    }
}
