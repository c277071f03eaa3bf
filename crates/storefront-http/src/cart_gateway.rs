//! `CartGateway` over `/api/v1/cart`.

use async_trait::async_trait;
use reqwest::Method;
use storefront_cart::{CartGateway, LineItem};
use storefront_core::error::StorefrontError;
use storefront_core::ids::ProductId;
use tracing::{debug, instrument};

use crate::client::ApiClient;
use crate::dto::CartItemDto;

/// The signed-in customer's server cart.
#[derive(Debug, Clone)]
pub struct HttpCartGateway {
    client: ApiClient,
}

impl HttpCartGateway {
    /// Creates a gateway using `client`.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CartGateway for HttpCartGateway {
    #[instrument(skip(self))]
    async fn fetch_items(&self) -> Result<Vec<LineItem>, StorefrontError> {
        let items: Option<Vec<CartItemDto>> = self.client.get("cart/items").await?;
        let mut lines = Vec::new();
        for item in items.unwrap_or_default() {
            let product_id = item.product_id;
            match item.into_line_item()? {
                Some(line) => lines.push(line),
                None => debug!(product_id, "skipping empty cart line"),
            }
        }
        Ok(lines)
    }

    #[instrument(skip(self))]
    async fn add_unit(&self, product_id: ProductId) -> Result<(), StorefrontError> {
        self.client
            .send(Method::POST, &format!("cart/items/{product_id}"))
            .await
    }

    #[instrument(skip(self))]
    async fn remove_unit(&self, product_id: ProductId) -> Result<(), StorefrontError> {
        self.client
            .send(Method::DELETE, &format!("cart/items/{product_id}"))
            .await
    }

    #[instrument(skip(self))]
    async fn remove_line(&self, product_id: ProductId) -> Result<(), StorefrontError> {
        self.client
            .send(Method::DELETE, &format!("cart/items/{product_id}/remove"))
            .await
    }
}
