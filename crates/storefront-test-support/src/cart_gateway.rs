//! In-memory cart backend.
//!
//! Mirrors the server's cart semantics: prices are frozen when a line is
//! created, removing the last unit deletes the line, and touching a line
//! that does not exist answers `NotFound`. Failures and fetch delays can be
//! scripted per call.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rust_decimal::Decimal;
use storefront_cart::{CartGateway, LineItem};
use storefront_core::error::StorefrontError;
use storefront_core::ids::ProductId;
use tokio::sync::oneshot;

use crate::clock::fixed_now;

/// A gateway operation that can be scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOperation {
    /// `fetch_items`.
    Fetch,
    /// `add_unit`.
    AddUnit,
    /// `remove_unit`.
    RemoveUnit,
    /// `remove_line`.
    RemoveLine,
}

/// A recorded gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartCall {
    /// `fetch_items`.
    Fetch,
    /// `add_unit`.
    AddUnit(ProductId),
    /// `remove_unit`.
    RemoveUnit(ProductId),
    /// `remove_line`.
    RemoveLine(ProductId),
}

/// Test-side handle of a held fetch.
///
/// The fetch reads the server cart when it starts and only returns once
/// [`FetchGate::release`] is called (or the gate is dropped).
#[derive(Debug)]
pub struct FetchGate {
    started: oneshot::Receiver<()>,
    release: oneshot::Sender<()>,
}

impl FetchGate {
    /// Waits until the held fetch has read the server cart.
    pub async fn wait_started(&mut self) {
        let _ = (&mut self.started).await;
    }

    /// Lets the held fetch return.
    pub fn release(self) {
        let _ = self.release.send(());
    }
}

#[derive(Debug)]
struct HeldFetch {
    started: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

#[derive(Debug, Clone)]
struct Product {
    title: String,
    price: Decimal,
}

#[derive(Debug, Clone)]
struct ServerLine {
    product_id: ProductId,
    title: String,
    quantity: u32,
    unit_price: Decimal,
}

#[derive(Debug, Default)]
struct ServerCart {
    catalog: HashMap<ProductId, Product>,
    lines: Vec<ServerLine>,
    failures: VecDeque<(CartOperation, StorefrontError)>,
    rejected_removals: HashMap<ProductId, StorefrontError>,
    held_fetches: VecDeque<HeldFetch>,
    calls: Vec<CartCall>,
}

impl ServerCart {
    fn take_failure(&mut self, operation: CartOperation) -> Result<(), StorefrontError> {
        match self.failures.iter().position(|(op, _)| *op == operation) {
            Some(index) => match self.failures.remove(index) {
                Some((_, err)) => Err(err),
                None => Ok(()),
            },
            None => Ok(()),
        }
    }

    fn position(&self, product_id: ProductId) -> Result<usize, StorefrontError> {
        self.lines
            .iter()
            .position(|line| line.product_id == product_id)
            .ok_or_else(|| StorefrontError::NotFound(format!("cart item {product_id}")))
    }

    fn line_items(&self) -> Result<Vec<LineItem>, StorefrontError> {
        self.lines
            .iter()
            .map(|line| {
                LineItem::new(
                    line.product_id,
                    line.title.clone(),
                    format!("https://cdn.example.com/products/{}.png", line.product_id),
                    line.quantity,
                    line.unit_price,
                    fixed_now(),
                )
            })
            .collect()
    }
}

/// A `CartGateway` backed by an in-memory server cart.
#[derive(Debug, Default)]
pub struct InMemoryCartGateway {
    server: Mutex<ServerCart>,
}

impl InMemoryCartGateway {
    /// Creates a gateway with an empty catalog and an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product to the catalog.
    #[must_use]
    pub fn with_product(self, product_id: i64, title: &str, price: Decimal) -> Self {
        self.lock().catalog.insert(
            ProductId(product_id),
            Product {
                title: title.to_owned(),
                price,
            },
        );
        self
    }

    /// Puts `quantity` units of a catalog product into the server cart at
    /// its current catalog price.
    ///
    /// # Panics
    ///
    /// Panics if the product is not in the catalog.
    #[must_use]
    pub fn with_line(self, product_id: i64, quantity: u32) -> Self {
        {
            let mut server = self.lock();
            let id = ProductId(product_id);
            let product = server
                .catalog
                .get(&id)
                .cloned()
                .unwrap_or_else(|| panic!("product {id} is not in the catalog"));
            server.lines.push(ServerLine {
                product_id: id,
                title: product.title,
                quantity,
                unit_price: product.price,
            });
        }
        self
    }

    /// Changes a catalog price. Lines already in the cart keep their price.
    pub fn set_price(&self, product_id: i64, price: Decimal) {
        if let Some(product) = self.lock().catalog.get_mut(&ProductId(product_id)) {
            product.price = price;
        }
    }

    /// The next call of `operation` fails with `err`.
    pub fn fail_next(&self, operation: CartOperation, err: StorefrontError) {
        self.lock().failures.push_back((operation, err));
    }

    /// Every `remove_line` of `product_id` fails with `err`.
    pub fn reject_removal_of(&self, product_id: i64, err: StorefrontError) {
        self.lock()
            .rejected_removals
            .insert(ProductId(product_id), err);
    }

    /// Holds the next fetch until the returned gate is released.
    #[must_use]
    pub fn gate_next_fetch(&self) -> FetchGate {
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.lock().held_fetches.push_back(HeldFetch {
            started: started_tx,
            release: release_rx,
        });
        FetchGate {
            started: started_rx,
            release: release_tx,
        }
    }

    /// `(product, quantity)` for every line in the server cart.
    #[must_use]
    pub fn server_lines(&self) -> Vec<(ProductId, u32)> {
        self.lock()
            .lines
            .iter()
            .map(|line| (line.product_id, line.quantity))
            .collect()
    }

    /// `(product, quantity, unit price)` for every line in the server cart.
    pub(crate) fn priced_lines(&self) -> Vec<(ProductId, u32, Decimal)> {
        self.lock()
            .lines
            .iter()
            .map(|line| (line.product_id, line.quantity, line.unit_price))
            .collect()
    }

    /// Every call received, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<CartCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ServerCart> {
        self.server.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CartGateway for InMemoryCartGateway {
    async fn fetch_items(&self) -> Result<Vec<LineItem>, StorefrontError> {
        let (fetched, held) = {
            let mut server = self.lock();
            server.calls.push(CartCall::Fetch);
            let held = server.held_fetches.pop_front();
            let fetched = server
                .take_failure(CartOperation::Fetch)
                .and_then(|()| server.line_items());
            (fetched, held)
        };
        if let Some(held) = held {
            let _ = held.started.send(());
            let _ = held.release.await;
        }
        fetched
    }

    async fn add_unit(&self, product_id: ProductId) -> Result<(), StorefrontError> {
        let mut server = self.lock();
        server.calls.push(CartCall::AddUnit(product_id));
        server.take_failure(CartOperation::AddUnit)?;
        if let Ok(index) = server.position(product_id) {
            server.lines[index].quantity += 1;
            return Ok(());
        }
        let product = server
            .catalog
            .get(&product_id)
            .cloned()
            .ok_or_else(|| StorefrontError::NotFound(format!("product {product_id}")))?;
        server.lines.push(ServerLine {
            product_id,
            title: product.title,
            quantity: 1,
            unit_price: product.price,
        });
        Ok(())
    }

    async fn remove_unit(&self, product_id: ProductId) -> Result<(), StorefrontError> {
        let mut server = self.lock();
        server.calls.push(CartCall::RemoveUnit(product_id));
        server.take_failure(CartOperation::RemoveUnit)?;
        let index = server.position(product_id)?;
        if server.lines[index].quantity <= 1 {
            server.lines.remove(index);
        } else {
            server.lines[index].quantity -= 1;
        }
        Ok(())
    }

    async fn remove_line(&self, product_id: ProductId) -> Result<(), StorefrontError> {
        let mut server = self.lock();
        server.calls.push(CartCall::RemoveLine(product_id));
        server.take_failure(CartOperation::RemoveLine)?;
        if let Some(err) = server.rejected_removals.get(&product_id) {
            return Err(err.clone());
        }
        let index = server.position(product_id)?;
        server.lines.remove(index);
        Ok(())
    }
}
