//! Domain layer for the Order context.

pub mod aggregates;
pub mod gateway;
pub mod status;
