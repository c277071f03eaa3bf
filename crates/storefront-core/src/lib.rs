//! Storefront Core — shared domain abstractions.
//!
//! This crate defines the identifiers, error taxonomy and determinism seams
//! (clock, payment references) that the cart and order contexts depend on.
//! It contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod ids;
pub mod reference;
