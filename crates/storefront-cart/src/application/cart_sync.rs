//! Cart synchronization core.
//!
//! Every mutation is write-then-refetch: the gateway call is made first and
//! the local aggregate is only replaced by a fresh read of the server cart.
//! Mutations are serialized through a FIFO async lock, and each refresh is
//! stamped from a monotonically increasing counter so that a response
//! arriving after a newer request was issued is discarded.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use storefront_core::error::StorefrontError;
use storefront_core::ids::ProductId;
use tracing::{debug, info, instrument, warn};

use super::snapshot::CartSnapshot;
use super::subscriptions::{Subscribers, Subscription};
use crate::domain::aggregates::CartAggregate;
use crate::domain::commands::CartCommand;
use crate::domain::gateway::CartGateway;

#[derive(Debug, Default)]
struct SyncState {
    aggregate: CartAggregate,
    in_flight: usize,
    last_error: Option<StorefrontError>,
    stale: bool,
}

impl SyncState {
    fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::capture(
            &self.aggregate,
            self.in_flight > 0,
            self.last_error.as_ref(),
            self.stale,
        )
    }
}

/// Whether a refresh result was applied to the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The result replaced the aggregate.
    Applied,
    /// A newer refresh was issued before this one resolved; its result was
    /// dropped.
    Superseded,
}

/// Single owner and mutator of the client's cart.
///
/// Construct one per signed-in cart and share it by `Arc`.
pub struct CartSync {
    gateway: Arc<dyn CartGateway>,
    state: Mutex<SyncState>,
    /// Orders snapshot delivery so listeners see transitions in sequence.
    delivery: Mutex<()>,
    mutations: tokio::sync::Mutex<()>,
    issued: AtomicU64,
    subscribers: Arc<Subscribers>,
}

impl fmt::Debug for CartSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartSync")
            .field("issued", &self.issued.load(Ordering::SeqCst))
            .field("subscribers", &self.subscribers)
            .finish_non_exhaustive()
    }
}

/// Keeps the loading flag raised while an operation is in flight.
struct Busy<'a> {
    sync: &'a CartSync,
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.sync.update(|state| {
            state.in_flight = state.in_flight.saturating_sub(1);
        });
    }
}

impl CartSync {
    /// Creates a core with an empty aggregate. Call [`CartSync::refresh`] to
    /// load the server cart.
    #[must_use]
    pub fn new(gateway: Arc<dyn CartGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(SyncState::default()),
            delivery: Mutex::new(()),
            mutations: tokio::sync::Mutex::new(()),
            issued: AtomicU64::new(0),
            subscribers: Arc::new(Subscribers::default()),
        }
    }

    /// Returns a copy of the current cart and its status.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    /// Registers `listener` to be called with every new snapshot.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CartSnapshot) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(Arc::new(listener))
    }

    /// Replaces the aggregate with the server's cart.
    ///
    /// # Errors
    ///
    /// Returns the gateway error, or `Server` when the fetched lines cannot
    /// be totalled; the aggregate is left untouched and the error is
    /// recorded in the snapshot. A refresh overtaken by a newer one resolves
    /// to `Ok(RefreshOutcome::Superseded)` whether or not its fetch failed.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<RefreshOutcome, StorefrontError> {
        let _busy = self.begin();
        self.fetch_and_apply().await
    }

    /// Adds one unit of `product_id`, then refreshes.
    ///
    /// # Errors
    ///
    /// Returns the gateway error. `NotFound` is returned after a corrective
    /// refresh; any other write failure leaves the aggregate unchanged.
    #[instrument(skip_all, fields(%product_id))]
    pub async fn increment(&self, product_id: ProductId) -> Result<(), StorefrontError> {
        self.execute(CartCommand::Increment(product_id)).await
    }

    /// Removes one unit of `product_id`, then refreshes. A line at quantity
    /// one disappears.
    ///
    /// # Errors
    ///
    /// See [`CartSync::increment`].
    #[instrument(skip_all, fields(%product_id))]
    pub async fn decrement_one(&self, product_id: ProductId) -> Result<(), StorefrontError> {
        self.execute(CartCommand::DecrementOne(product_id)).await
    }

    /// Removes the whole line for `product_id`, then refreshes.
    ///
    /// # Errors
    ///
    /// See [`CartSync::increment`].
    #[instrument(skip_all, fields(%product_id))]
    pub async fn remove_item(&self, product_id: ProductId) -> Result<(), StorefrontError> {
        self.execute(CartCommand::RemoveItem(product_id)).await
    }

    /// Removes every line and refreshes, even when some removals fail.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::PartialClear` if any line could not be
    /// removed, the fetch error if the server cart could not be read, or the
    /// refresh error if removal succeeded but the refresh did not.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), StorefrontError> {
        self.execute(CartCommand::Clear).await
    }

    async fn execute(&self, command: CartCommand) -> Result<(), StorefrontError> {
        let _serial = self.mutations.lock().await;
        let _busy = self.begin();
        // Anything issued before this write is older than its effect.
        self.issued.fetch_add(1, Ordering::SeqCst);

        let written = match command {
            CartCommand::Increment(id) => self.gateway.add_unit(id).await,
            CartCommand::DecrementOne(id) => self.gateway.remove_unit(id).await,
            CartCommand::RemoveItem(id) => self.gateway.remove_line(id).await,
            CartCommand::Clear => self.gateway.clear_all().await,
        };

        match (command, written) {
            (_, Ok(())) => {
                info!(command = command.command_type(), "cart mutation confirmed");
                self.fetch_and_apply().await.map(|_| ())
            }
            (CartCommand::Clear, Err(err)) => {
                warn!(error = %err, "cart clear incomplete; resynchronizing");
                if let Err(refresh_err) = self.fetch_and_apply().await {
                    debug!(error = %refresh_err, "refresh after incomplete clear failed");
                }
                self.record_error(err.clone());
                Err(err)
            }
            (_, Err(err @ StorefrontError::NotFound(_))) => {
                warn!(
                    command = command.command_type(),
                    product_id = ?command.product_id(),
                    "line missing on server; resynchronizing"
                );
                if let Err(refresh_err) = self.fetch_and_apply().await {
                    debug!(error = %refresh_err, "corrective refresh failed");
                }
                self.record_error(err.clone());
                Err(err)
            }
            (_, Err(err)) => {
                debug!(command = command.command_type(), error = %err, "cart mutation rejected");
                self.record_error(err.clone());
                Err(err)
            }
        }
    }

    async fn fetch_and_apply(&self) -> Result<RefreshOutcome, StorefrontError> {
        let stamp = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let fetched = self.gateway.fetch_items().await;

        let mut outcome = Ok(RefreshOutcome::Superseded);
        self.update(|state| {
            let latest = self.issued.load(Ordering::SeqCst);
            if stamp != latest {
                debug!(stamp, latest, failed = fetched.is_err(), "discarding superseded refresh");
                return;
            }
            match fetched.and_then(|items| state.aggregate.replace_items(items)) {
                Ok(()) => {
                    state.last_error = None;
                    state.stale = false;
                    outcome = Ok(RefreshOutcome::Applied);
                }
                Err(err) => {
                    state.last_error = Some(err.clone());
                    state.stale = true;
                    outcome = Err(err);
                }
            }
        });

        outcome
    }

    fn begin(&self) -> Busy<'_> {
        self.update(|state| state.in_flight += 1);
        Busy { sync: self }
    }

    fn record_error(&self, err: StorefrontError) {
        self.update(|state| state.last_error = Some(err));
    }

    /// Applies `change` under the state lock, then notifies listeners with
    /// the resulting snapshot.
    fn update(&self, change: impl FnOnce(&mut SyncState)) {
        let _delivery = self
            .delivery
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let snapshot = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            change(&mut state);
            state.snapshot()
        };
        self.subscribers.notify(&snapshot);
    }
}
