//! Backend identifiers.
//!
//! The REST backend keys products and orders by integer ids. They are wrapped
//! so a product id can never be passed where an order id is expected.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a catalogue product; unique within a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

/// Identifier of a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub i64);

macro_rules! integer_id {
    ($name:ident) => {
        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

integer_id!(ProductId);
integer_id!(OrderId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_parses_from_cli_argument() {
        assert_eq!(" 17 ".parse::<OrderId>().unwrap(), OrderId(17));
        assert!("abc".parse::<OrderId>().is_err());
    }

    #[test]
    fn test_display_prints_inner_value() {
        assert_eq!(ProductId(7).to_string(), "7");
        assert_eq!(OrderId(9).to_string(), "9");
    }
}
