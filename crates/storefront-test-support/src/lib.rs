//! Shared test fakes and utilities for the storefront client.

mod cart_gateway;
mod clock;
mod order_gateway;
mod reference;

pub use cart_gateway::{CartCall, CartOperation, FetchGate, InMemoryCartGateway};
pub use clock::{FixedClock, fixed_now};
pub use order_gateway::InMemoryOrderGateway;
pub use reference::SequenceReferences;
