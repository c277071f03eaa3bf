//! Subcommands and their execution against the cart and order cores.

use std::fmt;
use std::sync::Arc;

use clap::Subcommand;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use storefront_cart::{CartGateway, CartSync};
use storefront_core::clock::SystemClock;
use storefront_core::ids::{OrderId, ProductId};
use storefront_core::reference::{PaymentReferenceGenerator, TimeOrderedReferences};
use storefront_http::{ApiClient, HttpCartGateway, HttpConfig, HttpOrderGateway};
use storefront_orders::application::query_handlers::{self, OrderView};
use storefront_orders::{OrderGateway, OrderPlacement, PaymentMethod, PlacedOrder};
use tracing::info;

use crate::error::AppError;

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect or change the cart
    #[command(subcommand)]
    Cart(CartCommand),

    /// Place an order for the current cart
    Checkout {
        /// Payment method: credit-card, debit-card or pix
        #[arg(long)]
        method: PaymentMethod,

        /// Payment reference; generated for pix when omitted
        #[arg(long)]
        reference: Option<String>,
    },

    /// Browse order history
    #[command(subcommand)]
    Orders(OrdersCommand),
}

/// Cart subcommands.
#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Print the cart
    Show,
    /// Add one unit of a product
    Add { product_id: ProductId },
    /// Remove one unit of a product
    Decrement { product_id: ProductId },
    /// Remove a product's whole line
    Remove { product_id: ProductId },
    /// Empty the cart
    Clear,
}

/// Order history subcommands.
#[derive(Debug, Subcommand)]
pub enum OrdersCommand {
    /// List orders, newest first
    List,
    /// Print one order with its lines
    Show { order_id: OrderId },
}

#[derive(Debug, Serialize)]
struct CheckoutReport {
    order: OrderView,
    local_total: Decimal,
    clear_warning: Option<String>,
}

impl From<&PlacedOrder> for CheckoutReport {
    fn from(placed: &PlacedOrder) -> Self {
        Self {
            order: OrderView::from(&placed.order),
            local_total: placed.local_total,
            clear_warning: placed.clear_warning.as_ref().map(ToString::to_string),
        }
    }
}

/// The cores a command runs against.
pub struct Session {
    cart: Arc<CartSync>,
    orders: Arc<dyn OrderGateway>,
    placement: OrderPlacement,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("cart", &self.cart)
            .field("placement", &self.placement)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wires the cores over the given gateways.
    pub fn new(
        cart_gateway: Arc<dyn CartGateway>,
        orders: Arc<dyn OrderGateway>,
        references: Arc<dyn PaymentReferenceGenerator>,
    ) -> Self {
        let cart = Arc::new(CartSync::new(cart_gateway));
        let placement = OrderPlacement::new(
            orders.clone(),
            cart.clone(),
            Arc::new(SystemClock),
            references,
        );
        Self {
            cart,
            orders,
            placement,
        }
    }

    /// Wires the cores over the REST backend.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn connect(config: &HttpConfig) -> Result<Self, AppError> {
        let client = ApiClient::new(config).map_err(|e| AppError::Config(e.to_string()))?;
        info!(base_url = client.base_url(), "connecting to storefront backend");
        Ok(Self::new(
            Arc::new(HttpCartGateway::new(client.clone())),
            Arc::new(HttpOrderGateway::new(client)),
            Arc::new(TimeOrderedReferences),
        ))
    }

    /// Runs `command` and returns its result as JSON.
    ///
    /// # Errors
    ///
    /// Returns the core's error, or a serialization error.
    pub async fn execute(&self, command: Command) -> Result<Value, AppError> {
        match command {
            Command::Cart(command) => self.cart(command).await,
            Command::Checkout { method, reference } => {
                self.cart.refresh().await?;
                let placed = self.placement.place_order(Some(method), reference).await?;
                Ok(serde_json::to_value(CheckoutReport::from(&placed))?)
            }
            Command::Orders(OrdersCommand::List) => {
                let orders = query_handlers::list_orders(self.orders.as_ref()).await?;
                Ok(serde_json::to_value(orders)?)
            }
            Command::Orders(OrdersCommand::Show { order_id }) => {
                let order = query_handlers::get_order_by_id(order_id, self.orders.as_ref()).await?;
                Ok(serde_json::to_value(order)?)
            }
        }
    }

    async fn cart(&self, command: CartCommand) -> Result<Value, AppError> {
        self.cart.refresh().await?;
        match command {
            CartCommand::Show => {}
            CartCommand::Add { product_id } => self.cart.increment(product_id).await?,
            CartCommand::Decrement { product_id } => self.cart.decrement_one(product_id).await?,
            CartCommand::Remove { product_id } => self.cart.remove_item(product_id).await?,
            CartCommand::Clear => self.cart.clear().await?,
        }
        Ok(serde_json::to_value(self.cart.snapshot())?)
    }
}

#[cfg(test)]
mod tests {
    use storefront_core::error::StorefrontError;
    use storefront_test_support::{InMemoryCartGateway, InMemoryOrderGateway, SequenceReferences};

    use super::*;

    fn session(cart: InMemoryCartGateway) -> (Session, Arc<InMemoryCartGateway>) {
        let cart = Arc::new(cart);
        let orders = Arc::new(InMemoryOrderGateway::new(cart.clone()));
        let session = Session::new(cart.clone(), orders, Arc::new(SequenceReferences::default()));
        (session, cart)
    }

    fn stocked() -> InMemoryCartGateway {
        InMemoryCartGateway::new()
            .with_product(1, "Mug", "10.00".parse().unwrap())
            .with_product(2, "Pen", "2.50".parse().unwrap())
            .with_line(1, 1)
    }

    #[tokio::test]
    async fn test_cart_add_prints_refreshed_snapshot() {
        // Arrange
        let (session, _) = session(stocked());

        // Act
        let output = session
            .execute(Command::Cart(CartCommand::Add {
                product_id: ProductId(2),
            }))
            .await
            .unwrap();

        // Assert
        assert_eq!(output["total"], "12.50");
        assert_eq!(output["item_count"], 2);
        assert_eq!(output["is_loading"], false);
        assert_eq!(output["items"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_checkout_reports_order_and_empties_cart() {
        // Arrange
        let (session, cart) = session(stocked());

        // Act
        let output = session
            .execute(Command::Checkout {
                method: PaymentMethod::Pix,
                reference: None,
            })
            .await
            .unwrap();

        // Assert
        assert_eq!(output["order"]["payment_reference"], "PIX-TEST-1");
        assert_eq!(output["order"]["status"], "PENDING");
        assert_eq!(output["local_total"], "10.00");
        assert!(output["clear_warning"].is_null());
        assert!(cart.server_lines().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_of_empty_cart_fails_with_validation() {
        let (session, _) = session(InMemoryCartGateway::new());

        let result = session
            .execute(Command::Checkout {
                method: PaymentMethod::CreditCard,
                reference: None,
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            AppError::Storefront(StorefrontError::Validation(_))
        ));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_orders_show_unknown_order_is_not_found() {
        let (session, _) = session(stocked());

        let result = session
            .execute(Command::Orders(OrdersCommand::Show {
                order_id: OrderId(5),
            }))
            .await;

        assert!(matches!(
            result,
            Err(AppError::Storefront(StorefrontError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_orders_list_after_checkout() {
        let (session, _) = session(stocked());
        session
            .execute(Command::Checkout {
                method: PaymentMethod::CreditCard,
                reference: None,
            })
            .await
            .unwrap();

        let output = session
            .execute(Command::Orders(OrdersCommand::List))
            .await
            .unwrap();

        let orders = output.as_array().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0]["payment_method"], "CREDIT_CARD");
        assert_eq!(orders[0]["item_count"], 1);
    }
}
