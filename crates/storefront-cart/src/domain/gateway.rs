//! Port to the backend's cart resource.

use async_trait::async_trait;
use storefront_core::error::StorefrontError;
use storefront_core::ids::ProductId;
use tracing::warn;

use super::aggregates::LineItem;

/// Remote cart operations.
///
/// Implementations fail with `Network`, `Auth`, `NotFound` or `Server`.
#[async_trait]
pub trait CartGateway: Send + Sync {
    /// Fetch every line currently in the server cart, in display order.
    async fn fetch_items(&self) -> Result<Vec<LineItem>, StorefrontError>;

    /// Add one unit of `product_id`. The server decides whether this creates
    /// a line or bumps an existing one.
    async fn add_unit(&self, product_id: ProductId) -> Result<(), StorefrontError>;

    /// Remove exactly one unit; the server deletes the line at zero.
    async fn remove_unit(&self, product_id: ProductId) -> Result<(), StorefrontError>;

    /// Remove the whole line for `product_id`.
    async fn remove_line(&self, product_id: ProductId) -> Result<(), StorefrontError>;

    /// Remove every line.
    ///
    /// The default fetches the server cart and removes each line in turn.
    /// A line that is already gone (`NotFound`) counts as removed.
    ///
    /// # Errors
    ///
    /// Propagates a failed fetch. Returns `StorefrontError::PartialClear`
    /// naming every line whose removal failed.
    async fn clear_all(&self) -> Result<(), StorefrontError> {
        let items = self.fetch_items().await?;
        let mut failed = Vec::new();
        let mut first_cause: Option<String> = None;
        for item in &items {
            match self.remove_line(item.product_id()).await {
                Ok(()) | Err(StorefrontError::NotFound(_)) => {}
                Err(err) => {
                    warn!(product_id = %item.product_id(), error = %err, "line removal failed during clear");
                    failed.push(item.product_id());
                    first_cause.get_or_insert_with(|| err.to_string());
                }
            }
        }
        match first_cause {
            None => Ok(()),
            Some(cause) => Err(StorefrontError::PartialClear { failed, cause }),
        }
    }
}
