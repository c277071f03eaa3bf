//! Storefront — Order bounded context.
//!
//! Turns the synchronized cart into a submitted order and reads back order
//! history. Order totals and lines are always the server's; the client's
//! cart total is advisory.

pub mod application;
pub mod domain;

pub use application::placement::{OrderPlacement, PlacedOrder};
pub use domain::aggregates::{Order, OrderLine};
pub use domain::gateway::OrderGateway;
pub use domain::status::{OrderStatus, PaymentMethod};
