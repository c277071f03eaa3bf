//! Client configuration.

use std::time::Duration;

use clap::Parser;
use storefront_http::HttpConfig;

use crate::commands::Command;

/// Storefront cart and checkout client.
#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront cart and checkout client", long_about = None)]
pub struct ClientConfig {
    /// API root of the storefront backend
    #[arg(
        long,
        env = "STOREFRONT_API_URL",
        default_value = "http://localhost:8080/api/v1/",
        global = true
    )]
    pub api_url: String,

    /// Bearer token of the signed-in customer
    #[arg(long, env = "STOREFRONT_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "STOREFRONT_TIMEOUT_SECS", default_value_t = 15, global = true)]
    pub timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl ClientConfig {
    /// Load configuration from `.env`, the environment and CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed.
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Settings for the HTTP gateways.
    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::new(self.api_url.clone())
            .with_auth_token(self.token.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use storefront_core::ids::ProductId;
    use storefront_orders::PaymentMethod;

    use super::*;
    use crate::commands::CartCommand;

    #[test]
    fn test_parses_cart_add_with_global_flags() {
        // Act
        let config = ClientConfig::try_parse_from([
            "storefront",
            "cart",
            "add",
            "42",
            "--api-url",
            "http://shop.test/api/v1",
            "--token",
            "abc",
            "--timeout-secs",
            "3",
        ])
        .unwrap();

        // Assert
        assert!(matches!(
            config.command,
            Command::Cart(CartCommand::Add { product_id }) if product_id == ProductId(42)
        ));
        let http = config.http_config();
        assert_eq!(http.base_url, "http://shop.test/api/v1");
        assert_eq!(http.auth_token.as_deref(), Some("abc"));
        assert_eq!(http.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_parses_checkout_method_in_kebab_case() {
        let config = ClientConfig::try_parse_from([
            "storefront",
            "checkout",
            "--method",
            "debit-card",
        ])
        .unwrap();

        match config.command {
            Command::Checkout { method, reference } => {
                assert_eq!(method, PaymentMethod::DebitCard);
                assert!(reference.is_none());
            }
            other => panic!("expected checkout, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_payment_method() {
        let result = ClientConfig::try_parse_from([
            "storefront",
            "checkout",
            "--method",
            "cash",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_non_numeric_product_id() {
        let result = ClientConfig::try_parse_from(["storefront", "cart", "remove", "mug"]);

        assert!(result.is_err());
    }
}
