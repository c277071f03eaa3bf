//! Error taxonomy shared by gateways and the synchronization core.

use thiserror::Error;

use crate::ids::ProductId;

/// Top-level storefront error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorefrontError {
    /// A client-side precondition failed. Never sent over the network.
    #[error("validation error: {0}")]
    Validation(String),

    /// Transport failure or timeout.
    #[error("network error: {0}")]
    Network(String),

    /// The credential was rejected; the caller must re-authenticate.
    #[error("authentication error: {0}")]
    Auth(String),

    /// The targeted resource no longer exists server-side.
    #[error("not found: {0}")]
    NotFound(String),

    /// Some, but not necessarily all, line removals of a clear failed.
    #[error("cart only partially cleared: {} line(s) failed ({cause})", .failed.len())]
    PartialClear {
        /// Products whose line could not be removed.
        failed: Vec<ProductId>,
        /// Description of the first failure.
        cause: String,
    },

    /// Unexpected server response.
    #[error("server error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Server {
        /// HTTP status, when one was received.
        status: Option<u16>,
        /// Server-supplied or decoding message.
        message: String,
    },
}

/// Coarse classification used by presentation code to pick a message and an
/// affordance (retry button, sign-in redirect, inline correction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`StorefrontError::Validation`].
    Validation,
    /// See [`StorefrontError::Network`].
    Network,
    /// See [`StorefrontError::Auth`].
    Auth,
    /// See [`StorefrontError::NotFound`].
    NotFound,
    /// See [`StorefrontError::PartialClear`].
    PartialClear,
    /// See [`StorefrontError::Server`].
    Server,
}

impl StorefrontError {
    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Network(_) => ErrorKind::Network,
            Self::Auth(_) => ErrorKind::Auth,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::PartialClear { .. } => ErrorKind::PartialClear,
            Self::Server { .. } => ErrorKind::Server,
        }
    }

    /// Whether offering the user a retry makes sense.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Server { .. })
    }

    /// Whether the caller must force the user back through sign-in.
    #[must_use]
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}
