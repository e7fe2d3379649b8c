//! Unique destination identifiers.
use std::sync::atomic::{AtomicU64, Ordering};

/// A strictly increasing counter starting at 0. Safe to share between threads;
/// no two calls ever observe the same value.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

static GLOBAL_IDS: IdGenerator = IdGenerator::new();

/// Next value of the process-wide identifier sequence.
pub fn next_id() -> u64 {
    GLOBAL_IDS.next()
}
