//! Payment reference generation.
//!
//! PIX payments need a reference the backend can reconcile against. When the
//! caller does not supply one, the checkout generates it from the submission
//! time. Tests inject a deterministic generator.

use chrono::{DateTime, Utc};
use uuid::{NoContext, Timestamp, Uuid};

/// Produces collision-resistant payment references.
pub trait PaymentReferenceGenerator: Send + Sync {
    /// Returns a fresh reference tied to `submitted_at`.
    fn next_reference(&self, submitted_at: DateTime<Utc>) -> String;
}

/// Prefix carried by generated PIX references.
pub const PIX_REFERENCE_PREFIX: &str = "PIX-";

/// Generates `PIX-<uuidv7>` references.
///
/// The UUIDv7 embeds the submission time at millisecond precision and fills
/// the remaining bits randomly, so references sort by submission time and two
/// submissions in the same millisecond still differ.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeOrderedReferences;

impl PaymentReferenceGenerator for TimeOrderedReferences {
    fn next_reference(&self, submitted_at: DateTime<Utc>) -> String {
        let seconds = u64::try_from(submitted_at.timestamp()).unwrap_or(0);
        let timestamp = Timestamp::from_unix(
            NoContext,
            seconds,
            submitted_at.timestamp_subsec_nanos(),
        );
        format!("{PIX_REFERENCE_PREFIX}{}", Uuid::new_v7(timestamp).simple())
    }
}
