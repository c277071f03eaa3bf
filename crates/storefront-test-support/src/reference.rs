//! Deterministic payment references.

use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use storefront_core::reference::PaymentReferenceGenerator;

/// Hands out `PIX-TEST-1`, `PIX-TEST-2`, ... and ignores the submission time.
#[derive(Debug, Default)]
pub struct SequenceReferences {
    issued: AtomicU32,
}

impl SequenceReferences {
    /// Number of references handed out so far.
    #[must_use]
    pub fn issued(&self) -> u32 {
        self.issued.load(Ordering::SeqCst)
    }
}

impl PaymentReferenceGenerator for SequenceReferences {
    fn next_reference(&self, _submitted_at: DateTime<Utc>) -> String {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        format!("PIX-TEST-{n}")
    }
}
