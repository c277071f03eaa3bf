//! Commands for the Cart context.

use storefront_core::ids::ProductId;

/// A mutation the synchronization core writes to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartCommand {
    /// Add one unit of a product.
    Increment(ProductId),
    /// Remove one unit of a product; the line disappears at zero.
    DecrementOne(ProductId),
    /// Remove a product's line regardless of quantity.
    RemoveItem(ProductId),
    /// Remove every line.
    Clear,
}

impl CartCommand {
    /// The command type name (for logging).
    #[must_use]
    pub fn command_type(&self) -> &'static str {
        match self {
            Self::Increment(_) => "cart.increment",
            Self::DecrementOne(_) => "cart.decrement_one",
            Self::RemoveItem(_) => "cart.remove_item",
            Self::Clear => "cart.clear",
        }
    }

    /// The targeted product, if the command targets one.
    #[must_use]
    pub fn product_id(&self) -> Option<ProductId> {
        match self {
            Self::Increment(id) | Self::DecrementOne(id) | Self::RemoveItem(id) => Some(*id),
            Self::Clear => None,
        }
    }
}
