//! Sample ring: fixed-capacity capture buffer
//!
//! Append-only with a single write cursor and no wraparound: once the
//! cursor reaches capacity, capture halts until the ring is drained or a
//! new run resets it. Written only by the sampler; drained by the server.

use crate::types::Sample;

/// Fixed-capacity append-only sample buffer
#[derive(Debug)]
pub struct SampleRing {
    samples: Vec<Sample>,
    capacity: usize,
}

impl SampleRing {
    /// Create a ring holding at most `capacity` samples
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of samples the ring can hold
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current write cursor (number of recorded samples)
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when no samples have been recorded
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// True once the cursor has reached capacity
    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    /// Append one sample; returns false (and records nothing) when full
    pub fn push(&mut self, sample: Sample) -> bool {
        if self.is_full() {
            return false;
        }
        self.samples.push(sample);
        true
    }

    /// Take all recorded samples and reset the cursor to zero
    ///
    /// The replacement buffer is preallocated to capacity; the sampler
    /// must never allocate mid-capture.
    pub fn drain(&mut self) -> Vec<Sample> {
        std::mem::replace(&mut self.samples, Vec::with_capacity(self.capacity))
    }

    /// Reset the cursor to zero, discarding recorded samples
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Read-only view of the recorded samples
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}
