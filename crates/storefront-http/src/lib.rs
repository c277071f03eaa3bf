//! Storefront — REST backend gateways.
//!
//! Implements the cart and order gateway ports against the storefront's
//! `/api/v1` JSON API.

pub mod cart_gateway;
pub mod client;
pub mod config;
mod dto;
pub mod order_gateway;

pub use cart_gateway::HttpCartGateway;
pub use client::ApiClient;
pub use config::HttpConfig;
pub use order_gateway::HttpOrderGateway;
