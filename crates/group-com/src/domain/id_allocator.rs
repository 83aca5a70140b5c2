//! # Process Id Allocator
//!
//! One per group. Hands out 0, 1, 2, ... in call order. Group admission uses
//! [`ProcessIdAllocator::next_below`], so a rejected join never consumes an id.

use std::sync::atomic::{AtomicU32, Ordering};

use shared_types::ProcessId;

/// Consecutive id source shared by the members of one group.
#[derive(Debug, Default)]
pub struct ProcessIdAllocator {
    next: AtomicU32,
}

impl ProcessIdAllocator {
    /// Allocator starting at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Next free id.
    pub fn next(&self) -> ProcessId {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// Next free id if it is below `limit`, else `None` with the counter
    /// left where it was.
    pub fn next_below(&self, limit: u32) -> Option<ProcessId> {
        self.next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| {
                (id < limit).then_some(id + 1)
            })
            .ok()
    }

    /// How many ids were handed out since creation or the last reset.
    pub fn issued(&self) -> u32 {
        self.next.load(Ordering::SeqCst)
    }

    /// Start over from 0.
    ///
    /// Only meaningful in test setup: ids already held by live processes are
    /// not revoked and will be handed out again.
    pub fn reset(&self) {
        self.next.store(0, Ordering::SeqCst);
    }
}
