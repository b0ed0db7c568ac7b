//! Payment-reference idempotency store.
//!
//! Webhook delivery is at-least-once; this in-memory set answers "have
//! we already acted on this payment reference" fast, before any order
//! state is touched. The durable record is the reference written onto
//! the order's payment record; that one survives restarts and is
//! checked inside the store transaction.

use std::collections::HashSet;

use parking_lot::Mutex;

pub struct DedupeStore {
    seen: Mutex<HashSet<String>>,
}

impl Default for DedupeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DedupeStore {
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
        }
    }

    pub fn seen(&self, reference: &str) -> bool {
        self.seen.lock().contains(reference)
    }

    /// Record a reference once it has been acted on.
    pub fn record(&self, reference: String) {
        self.seen.lock().insert(reference);
    }
}
