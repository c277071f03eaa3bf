//! Application layer for the Order context.

pub mod placement;
pub mod query_handlers;
