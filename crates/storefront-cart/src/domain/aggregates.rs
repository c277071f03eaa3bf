//! Aggregate roots for the Cart context.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use storefront_core::error::StorefrontError;
use storefront_core::ids::ProductId;

/// One distinct product held in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    product_id: ProductId,
    title: String,
    image_url: String,
    quantity: u32,
    /// Price captured when the product was first added.
    unit_price: Decimal,
    added_at: DateTime<Utc>,
}

impl LineItem {
    /// Creates a line item.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Validation` if `quantity` is zero,
    /// `unit_price` is negative, or the line total does not fit a `Decimal`.
    pub fn new(
        product_id: ProductId,
        title: impl Into<String>,
        image_url: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
        added_at: DateTime<Utc>,
    ) -> Result<Self, StorefrontError> {
        if quantity == 0 {
            return Err(StorefrontError::Validation(format!(
                "line for product {product_id} must hold at least one unit"
            )));
        }
        if unit_price.is_sign_negative() {
            return Err(StorefrontError::Validation(format!(
                "line for product {product_id} has negative price {unit_price}"
            )));
        }
        if checked_line_total(unit_price, quantity).is_none() {
            return Err(StorefrontError::Validation(format!(
                "line for product {product_id} overflows its total"
            )));
        }
        Ok(Self {
            product_id,
            title: title.into(),
            image_url: image_url.into(),
            quantity,
            unit_price,
            added_at,
        })
    }

    /// The product this line holds.
    #[must_use]
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Product image URL.
    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Units held; always at least one.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Price per unit at the time the product was first added.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// When the product was first added.
    #[must_use]
    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        // Overflowing lines are rejected on construction and when folded.
        checked_line_total(self.unit_price, self.quantity).unwrap_or(Decimal::MAX)
    }
}

fn checked_line_total(unit_price: Decimal, quantity: u32) -> Option<Decimal> {
    unit_price.checked_mul(Decimal::from(quantity))
}

fn out_of_range(what: &str) -> StorefrontError {
    StorefrontError::Server {
        status: None,
        message: format!("cart {what} out of range"),
    }
}

/// The client's view of the cart.
///
/// `total` and `item_count` are derived from `items` and only ever
/// recomputed inside [`CartAggregate::replace_items`], which assigns all
/// three together or none of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartAggregate {
    items: Vec<LineItem>,
    total: Decimal,
    item_count: u64,
}

impl CartAggregate {
    /// Creates an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cart holding `items`.
    ///
    /// # Errors
    ///
    /// See [`CartAggregate::replace_items`].
    pub fn from_items(items: Vec<LineItem>) -> Result<Self, StorefrontError> {
        let mut cart = Self::new();
        cart.replace_items(items)?;
        Ok(cart)
    }

    /// Replaces the whole item sequence and recomputes derived values.
    ///
    /// Lines repeating a product id are folded into the first occurrence so
    /// product ids stay unique; the first occurrence's price is kept.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Server` if a folded quantity or the cart
    /// total does not fit; the aggregate is left unchanged.
    pub fn replace_items(&mut self, items: Vec<LineItem>) -> Result<(), StorefrontError> {
        let mut merged: Vec<LineItem> = Vec::with_capacity(items.len());
        for item in items {
            match merged
                .iter_mut()
                .find(|line| line.product_id == item.product_id)
            {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .checked_add(item.quantity)
                        .ok_or_else(|| out_of_range("line quantity"))?;
                }
                None => merged.push(item),
            }
        }

        let total = merged.iter().try_fold(Decimal::ZERO, |sum, line| {
            checked_line_total(line.unit_price, line.quantity)
                .and_then(|line_total| sum.checked_add(line_total))
                .ok_or_else(|| out_of_range("total"))
        })?;
        let item_count = merged.iter().map(|line| u64::from(line.quantity)).sum();

        self.items = merged;
        self.total = total;
        self.item_count = item_count;
        Ok(())
    }

    /// Lines in display order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Sum of `unit_price * quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Sum of quantities over all lines (badge count).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The line for `product_id`, if present.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|line| line.product_id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn added_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn line(id: i64, quantity: u32, price: &str) -> LineItem {
        LineItem::new(
            ProductId(id),
            format!("Product {id}"),
            format!("https://cdn.example.com/{id}.png"),
            quantity,
            price.parse().unwrap(),
            added_at(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_line_rejects_zero_quantity() {
        // Act
        let result = LineItem::new(
            ProductId(1),
            "Mug",
            "",
            0,
            Decimal::ONE,
            added_at(),
        );

        // Assert
        match result.unwrap_err() {
            StorefrontError::Validation(msg) => assert!(msg.contains("product 1")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_new_line_rejects_negative_price() {
        let result = LineItem::new(
            ProductId(1),
            "Mug",
            "",
            1,
            Decimal::NEGATIVE_ONE,
            added_at(),
        );

        assert!(matches!(result, Err(StorefrontError::Validation(_))));
    }

    #[test]
    fn test_line_total_multiplies_price_by_quantity() {
        assert_eq!(line(1, 3, "7.50").line_total(), "22.50".parse().unwrap());
    }

    #[test]
    fn test_from_items_derives_total_and_item_count() {
        // Arrange
        let items = vec![line(1, 1, "5.00"), line(2, 2, "7.50")];

        // Act
        let cart = CartAggregate::from_items(items).unwrap();

        // Assert
        assert_eq!(cart.total(), "20.00".parse().unwrap());
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.items().len(), 2);
    }

    #[test]
    fn test_replace_items_drops_previous_lines() {
        // Arrange
        let mut cart = CartAggregate::from_items(vec![line(1, 2, "10.00")]).unwrap();

        // Act
        cart.replace_items(vec![line(2, 1, "3.25")]).unwrap();

        // Assert
        assert!(cart.line(ProductId(1)).is_none());
        assert_eq!(cart.total(), "3.25".parse().unwrap());
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_replace_with_empty_resets_derived_values() {
        let mut cart = CartAggregate::from_items(vec![line(1, 2, "10.00")]).unwrap();

        cart.replace_items(Vec::new()).unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_duplicate_product_lines_are_folded_into_first() {
        // Arrange
        let items = vec![line(1, 1, "10.00"), line(2, 1, "1.00"), line(1, 2, "12.00")];

        // Act
        let cart = CartAggregate::from_items(items).unwrap();

        // Assert
        assert_eq!(cart.items().len(), 2);
        let folded = cart.line(ProductId(1)).unwrap();
        assert_eq!(folded.quantity(), 3);
        assert_eq!(folded.unit_price(), "10.00".parse().unwrap());
        assert_eq!(cart.total(), "31.00".parse().unwrap());
    }

    #[test]
    fn test_display_order_follows_server_order() {
        let cart =
            CartAggregate::from_items(vec![line(3, 1, "1"), line(1, 1, "1"), line(2, 1, "1")])
                .unwrap();

        let order: Vec<i64> = cart.items().iter().map(|l| l.product_id().0).collect();

        assert_eq!(order, vec![3, 1, 2]);
    }

    fn priced_at_max(id: i64) -> LineItem {
        LineItem::new(ProductId(id), "Bullion", "", 1, Decimal::MAX, added_at()).unwrap()
    }

    #[test]
    fn test_new_line_rejects_total_that_overflows() {
        let result = LineItem::new(ProductId(1), "Bullion", "", 2, Decimal::MAX, added_at());

        assert!(matches!(result, Err(StorefrontError::Validation(_))));
    }

    #[test]
    fn test_replace_items_with_overflowing_total_keeps_previous_cart() {
        // Arrange
        let mut cart = CartAggregate::from_items(vec![line(1, 1, "5.00")]).unwrap();
        let before = cart.clone();

        // Act
        let result = cart.replace_items(vec![priced_at_max(2), priced_at_max(3)]);

        // Assert
        assert!(matches!(result, Err(StorefrontError::Server { status: None, .. })));
        assert_eq!(cart, before);
        assert_eq!(cart.total(), "5.00".parse().unwrap());
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_folding_duplicates_into_overflowing_line_keeps_previous_cart() {
        // Arrange
        let mut cart = CartAggregate::new();

        // Act
        let result = cart.replace_items(vec![priced_at_max(7), priced_at_max(7)]);

        // Assert
        assert!(matches!(result, Err(StorefrontError::Server { .. })));
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }
}
