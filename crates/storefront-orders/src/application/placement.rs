//! Order placement.
//!
//! Creation and cart clearing are two independent network operations. The
//! cart is only cleared after the server confirmed the order, and a failed
//! clear never turns a placed order into a failed one.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rust_decimal::Decimal;
use storefront_cart::CartSync;
use storefront_core::clock::Clock;
use storefront_core::error::StorefrontError;
use storefront_core::reference::PaymentReferenceGenerator;
use tracing::{info, instrument, warn};

use crate::domain::aggregates::{Order, OrderLine};
use crate::domain::gateway::OrderGateway;
use crate::domain::status::PaymentMethod;

/// Result of a successful placement.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    /// The order as created by the server, with the submitted cart lines
    /// when the server did not report any.
    pub order: Order,
    /// Set when the order was placed but the cart could not be fully
    /// cleared afterwards. The order stands; do not retry placement.
    pub clear_warning: Option<StorefrontError>,
    /// The client's cart total at submission. Advisory only.
    pub local_total: Decimal,
}

/// Submits the synchronized cart as an order.
pub struct OrderPlacement {
    orders: Arc<dyn OrderGateway>,
    cart: Arc<CartSync>,
    clock: Arc<dyn Clock>,
    references: Arc<dyn PaymentReferenceGenerator>,
    submitting: AtomicBool,
}

impl fmt::Debug for OrderPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderPlacement")
            .field("cart", &self.cart)
            .field("submitting", &self.submitting.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Lowers the single-flight flag when placement finishes or is abandoned.
struct Submission<'a> {
    flag: &'a AtomicBool,
}

impl Drop for Submission<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl OrderPlacement {
    /// Creates a placement service over `cart`.
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrderGateway>,
        cart: Arc<CartSync>,
        clock: Arc<dyn Clock>,
        references: Arc<dyn PaymentReferenceGenerator>,
    ) -> Self {
        Self {
            orders,
            cart,
            clock,
            references,
            submitting: AtomicBool::new(false),
        }
    }

    /// Places an order for the current cart.
    ///
    /// For `PIX` without a reference (or with a blank one) a reference is
    /// generated from the submission time. On success the cart is cleared
    /// and refreshed. If the server confirms the order without its lines,
    /// the lines of the submitted cart are recorded on the returned order.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Validation` before any network call if no
    /// payment method was given, the cart is empty, or another placement is
    /// in flight. Otherwise returns the order gateway's error unchanged, with
    /// the cart untouched.
    #[instrument(skip(self, payment_reference))]
    pub async fn place_order(
        &self,
        payment_method: Option<PaymentMethod>,
        payment_reference: Option<String>,
    ) -> Result<PlacedOrder, StorefrontError> {
        let Some(payment_method) = payment_method else {
            return Err(StorefrontError::Validation(
                "a payment method is required".into(),
            ));
        };
        let cart = self.cart.snapshot();
        if cart.is_empty() {
            return Err(StorefrontError::Validation("cart is empty".into()));
        }
        let _submission = self.begin()?;

        let reference = self.resolve_reference(payment_method, payment_reference);
        let mut order = self
            .orders
            .create_order(payment_method, reference.as_deref())
            .await
            .inspect_err(|err| warn!(error = %err, "order creation failed; cart left untouched"))?;

        info!(order_id = %order.id(), total = %order.total_amount(), "order placed");
        if order.items().is_empty()
            && order.fill_missing_items(cart.items.iter().map(OrderLine::from).collect())
        {
            warn!(
                order_id = %order.id(),
                lines = order.items().len(),
                "order returned without lines; recorded the submitted cart lines"
            );
        }
        if order.total_amount() != cart.total {
            warn!(
                order_id = %order.id(),
                server_total = %order.total_amount(),
                local_total = %cart.total,
                "server total differs from cart total"
            );
        }

        let clear_warning = match self.cart.clear().await {
            Ok(()) => None,
            Err(err) => {
                warn!(order_id = %order.id(), error = %err, "order placed but cart not cleared");
                Some(err)
            }
        };

        Ok(PlacedOrder {
            order,
            clear_warning,
            local_total: cart.total,
        })
    }

    fn begin(&self) -> Result<Submission<'_>, StorefrontError> {
        self.submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| {
                StorefrontError::Validation("an order is already being placed".into())
            })?;
        Ok(Submission {
            flag: &self.submitting,
        })
    }

    fn resolve_reference(
        &self,
        payment_method: PaymentMethod,
        supplied: Option<String>,
    ) -> Option<String> {
        let supplied = supplied.filter(|reference| !reference.trim().is_empty());
        match supplied {
            Some(reference) => Some(reference),
            None if payment_method.requires_reference() => {
                Some(self.references.next_reference(self.clock.now()))
            }
            None => None,
        }
    }
}
