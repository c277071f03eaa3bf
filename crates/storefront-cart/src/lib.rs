//! Storefront — Cart bounded context.
//!
//! Holds the client's view of the cart and keeps it consistent with the
//! backend: every mutation is written to the server first and the view is
//! only ever replaced by re-reading the server's cart.

pub mod application;
pub mod domain;

pub use application::cart_sync::{CartSync, RefreshOutcome};
pub use application::snapshot::CartSnapshot;
pub use application::subscriptions::Subscription;
pub use domain::aggregates::{CartAggregate, LineItem};
pub use domain::gateway::CartGateway;
