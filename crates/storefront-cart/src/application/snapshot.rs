//! Read-only view of the cart handed to presentation code.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use storefront_core::error::StorefrontError;

use crate::domain::aggregates::{CartAggregate, LineItem};

/// Point-in-time copy of the cart and its synchronization status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartSnapshot {
    /// Lines in display order.
    pub items: Vec<LineItem>,
    /// Sum of line totals.
    pub total: Decimal,
    /// Sum of quantities.
    pub item_count: u64,
    /// Whether any cart operation is in flight.
    pub is_loading: bool,
    /// The most recent failure, cleared by the next applied refresh.
    #[serde(serialize_with = "serialize_error")]
    pub last_error: Option<StorefrontError>,
    /// Whether the server may hold a different cart than `items` shows.
    pub is_stale: bool,
}

impl CartSnapshot {
    pub(crate) fn capture(
        aggregate: &CartAggregate,
        is_loading: bool,
        last_error: Option<&StorefrontError>,
        is_stale: bool,
    ) -> Self {
        Self {
            items: aggregate.items().to_vec(),
            total: aggregate.total(),
            item_count: aggregate.item_count(),
            is_loading,
            last_error: last_error.cloned(),
            is_stale,
        }
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[allow(clippy::ref_option)]
fn serialize_error<S: Serializer>(
    error: &Option<StorefrontError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => serializer.collect_str(err),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use storefront_core::ids::ProductId;

    #[test]
    fn test_snapshot_serializes_error_as_message() {
        // Arrange
        let item = LineItem::new(
            ProductId(1),
            "Mug",
            "https://cdn.example.com/mug.png",
            2,
            "10.00".parse().unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        )
        .unwrap();
        let aggregate = CartAggregate::from_items(vec![item]).unwrap();
        let error = StorefrontError::Network("connection reset".into());

        // Act
        let snapshot = CartSnapshot::capture(&aggregate, false, Some(&error), true);
        let json = serde_json::to_value(&snapshot).unwrap();

        // Assert
        assert_eq!(json["total"], "20.00");
        assert_eq!(json["item_count"], 2);
        assert_eq!(json["last_error"], "network error: connection reset");
        assert_eq!(json["is_stale"], true);
        assert_eq!(json["items"][0]["product_id"], 1);
    }

    #[test]
    fn test_snapshot_without_error_serializes_null() {
        let snapshot = CartSnapshot::capture(&CartAggregate::new(), true, None, false);

        let json = serde_json::to_value(&snapshot).unwrap();

        assert!(json["last_error"].is_null());
        assert_eq!(json["is_loading"], true);
        assert!(snapshot.is_empty());
    }
}
