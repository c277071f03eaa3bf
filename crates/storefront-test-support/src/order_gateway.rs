//! In-memory order backend.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use storefront_core::error::StorefrontError;
use storefront_core::ids::OrderId;
use storefront_orders::{Order, OrderGateway, OrderLine, OrderStatus, PaymentMethod};

use crate::cart_gateway::InMemoryCartGateway;
use crate::clock::fixed_now;

#[derive(Debug, Default)]
struct OrderBook {
    orders: Vec<Order>,
    failures: VecDeque<StorefrontError>,
    submissions: Vec<(PaymentMethod, Option<String>)>,
    omit_lines_next: bool,
}

/// An `OrderGateway` that builds orders from an [`InMemoryCartGateway`].
///
/// Like the real backend it computes items and total from the server cart,
/// and it leaves clearing the cart to the client.
#[derive(Debug)]
pub struct InMemoryOrderGateway {
    cart: Arc<InMemoryCartGateway>,
    book: Mutex<OrderBook>,
}

impl InMemoryOrderGateway {
    /// Creates a gateway reading lines from `cart`.
    #[must_use]
    pub fn new(cart: Arc<InMemoryCartGateway>) -> Self {
        Self {
            cart,
            book: Mutex::new(OrderBook::default()),
        }
    }

    /// The next `create_order` fails with `err`.
    pub fn fail_next(&self, err: StorefrontError) {
        self.lock().failures.push_back(err);
    }

    /// The next created order is stored with its lines but returned without
    /// them, as when the backend cannot read the order back.
    pub fn omit_lines_next(&self) {
        self.lock().omit_lines_next = true;
    }

    /// Every `(method, reference)` submitted to `create_order`, failed ones
    /// included.
    #[must_use]
    pub fn submissions(&self) -> Vec<(PaymentMethod, Option<String>)> {
        self.lock().submissions.clone()
    }

    fn lock(&self) -> MutexGuard<'_, OrderBook> {
        self.book.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn placed_at(sequence: usize) -> DateTime<Utc> {
        let minutes = i64::try_from(sequence).unwrap_or(i64::MAX);
        fixed_now() + TimeDelta::minutes(minutes)
    }
}

#[async_trait]
impl OrderGateway for InMemoryOrderGateway {
    async fn create_order(
        &self,
        payment_method: PaymentMethod,
        payment_reference: Option<&str>,
    ) -> Result<Order, StorefrontError> {
        let mut book = self.lock();
        book.submissions
            .push((payment_method, payment_reference.map(str::to_owned)));
        if let Some(err) = book.failures.pop_front() {
            return Err(err);
        }

        let items: Vec<OrderLine> = self
            .cart
            .priced_lines()
            .into_iter()
            .map(|(product_id, quantity, unit_price)| OrderLine {
                product_id,
                quantity,
                unit_price,
            })
            .collect();
        if items.is_empty() {
            return Err(StorefrontError::Server {
                status: Some(400),
                message: "cart is empty".into(),
            });
        }

        let total: Decimal = items.iter().map(OrderLine::line_total).sum();
        let sequence = book.orders.len() + 1;
        let placed_at = Self::placed_at(sequence);
        let order = Order::new(
            OrderId(i64::try_from(sequence).unwrap_or(i64::MAX)),
            items,
            total,
            payment_method,
            payment_reference.map(str::to_owned),
            OrderStatus::Pending,
            placed_at,
            placed_at,
        );
        book.orders.push(order.clone());
        if std::mem::take(&mut book.omit_lines_next) {
            return Ok(Order::new(
                order.id(),
                Vec::new(),
                order.total_amount(),
                order.payment_method(),
                order.payment_reference().map(str::to_owned),
                order.status(),
                order.created_at(),
                order.updated_at(),
            ));
        }
        Ok(order)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StorefrontError> {
        let mut orders = self.lock().orders.clone();
        orders.sort_by_key(|order| std::cmp::Reverse(order.created_at()));
        Ok(orders)
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Order, StorefrontError> {
        self.lock()
            .orders
            .iter()
            .find(|order| order.id() == order_id)
            .cloned()
            .ok_or_else(|| StorefrontError::NotFound(format!("order {order_id}")))
    }

    async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), StorefrontError> {
        let mut book = self.lock();
        let order = book
            .orders
            .iter_mut()
            .find(|order| order.id() == order_id)
            .ok_or_else(|| StorefrontError::NotFound(format!("order {order_id}")))?;
        let updated_at = order.updated_at() + TimeDelta::hours(1);
        order.apply_status_update(order_id, status, updated_at)?;
        Ok(())
    }
}
