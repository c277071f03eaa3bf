//! Command failures and their exit codes.

use storefront_core::error::{ErrorKind, StorefrontError};

/// Why a command failed.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Invalid client settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// The cart or order core rejected the command.
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    /// The result could not be rendered as JSON.
    #[error("could not render output: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing the result failed.
    #[error("could not write output: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Process exit code for this failure.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 78,
            Self::Storefront(err) => match err.kind() {
                ErrorKind::Validation => 2,
                ErrorKind::Auth => 3,
                ErrorKind::NotFound => 4,
                ErrorKind::Network => 5,
                ErrorKind::PartialClear | ErrorKind::Server => 1,
            },
            Self::Serialization(_) | Self::Io(_) => 74,
        }
    }
}
