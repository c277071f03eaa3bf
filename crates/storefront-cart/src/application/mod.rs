//! Application layer for the Cart context.

pub mod cart_sync;
pub mod snapshot;
pub mod subscriptions;
