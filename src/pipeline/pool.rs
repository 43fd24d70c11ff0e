//! # Byte-Buffer Pool
//!
//! Recycles frame-sized byte buffers across a batch to avoid repeated
//! allocation.
//!
//! ## Contract
//!
//! Buffers are bucketed by their exact capacity-relevant size. `acquire`
//! hands out a buffer and the holder owns it until it calls `release` —
//! there is no reference counting; caller discipline is the contract. A
//! released buffer may be handed to the next `acquire` of the same size.
//!
//! The pool serializes access with a `Mutex` so the pipeline's parallel
//! per-frame path can share it; contention is negligible because acquire
//! and release happen once per frame, not per pixel.
//!
//! Pooling is an optimization, never a correctness requirement — dropping
//! a buffer instead of releasing it only costs a future allocation.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

/// Buffers kept per size bucket. Batches process groups one at a time, so
/// a handful per size covers the steady state.
const MAX_PER_SIZE: usize = 8;

/// A pool of reusable byte buffers, keyed by exact buffer size.
#[derive(Debug, Default)]
pub struct BufferPool {
    buckets: Mutex<HashMap<usize, Vec<Vec<u8>>>>,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a zeroed buffer of exactly `len` bytes, reusing pooled storage
    /// when available.
    pub fn acquire(&self, len: usize) -> Vec<u8> {
        let recycled = {
            let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
            buckets.get_mut(&len).and_then(|bucket| bucket.pop())
        };
        match recycled {
            Some(mut buf) => {
                buf.clear();
                buf.resize(len, 0);
                buf
            }
            None => vec![0u8; len],
        }
    }

    /// Return a buffer to the pool.
    ///
    /// The buffer is bucketed by its current length; buckets are bounded,
    /// so surplus buffers are simply dropped.
    pub fn release(&self, buf: Vec<u8>) {
        if buf.is_empty() {
            return;
        }
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        let bucket = buckets.entry(buf.len()).or_default();
        if bucket.len() < MAX_PER_SIZE {
            bucket.push(buf);
        }
    }

    /// Drop all pooled storage (between batch chunks).
    pub fn trim(&self) {
        let released = {
            let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
            let bytes: usize = buckets
                .values()
                .flat_map(|b| b.iter().map(|v| v.len()))
                .sum();
            buckets.clear();
            bytes
        };
        if released > 0 {
            debug!(released_bytes = released, "buffer pool trimmed");
        }
    }

    /// Total bytes currently held by the pool.
    pub fn pooled_bytes(&self) -> usize {
        let buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        buckets
            .values()
            .flat_map(|b| b.iter().map(|v| v.len()))
            .sum()
    }
}
