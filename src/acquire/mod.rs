//! Acquisition engine: channel table, trigger, sample ring, sampler
//!
//! All mutable capture state lives in one owned [`AcquisitionContext`].
//! Two independently scheduled contexts operate on it: the periodic
//! sampler under the host's real-time schedule, and the command server on
//! its worker thread. Both take the same short-held lock; hold time is
//! bounded by one cycle's work so the sampler is never starved.

pub mod channels;
pub mod ring;
pub mod sampler;
pub mod trigger;

pub use channels::ChannelTable;
pub use ring::SampleRing;
pub use sampler::run_cycle;
pub use trigger::Trigger;

use crate::directory::ProcessDirectory;

use std::sync::{Arc, Mutex, MutexGuard};

/// All capture state shared between the sampler and the server
#[derive(Debug)]
pub struct AcquisitionContext {
    /// Capture slots bound to directory entries
    pub channels: ChannelTable,
    /// Trigger configuration and run phase
    pub trigger: Trigger,
    /// Bounded capture buffer
    pub ring: SampleRing,
}

impl AcquisitionContext {
    /// Create a context with the given capacities, all idle and empty
    pub fn new(channel_count: usize, sample_capacity: usize) -> Self {
        Self {
            channels: ChannelTable::new(channel_count),
            trigger: Trigger::new(),
            ring: SampleRing::new(sample_capacity),
        }
    }

    /// STOP semantics: trigger back to Idle, cursor back to zero
    pub fn stop(&mut self) {
        self.trigger.stop();
        self.ring.reset();
    }
}

/// Context handle shared between the sampler and server threads
pub type SharedContext = Arc<Mutex<AcquisitionContext>>;

/// Directory handle shared between the sampler and server threads
pub type SharedDirectory = Arc<Mutex<dyn ProcessDirectory>>;

/// Lock a mutex, riding through poisoning
///
/// Capture state stays meaningful even if a holder panicked; dropping the
/// whole service over a poisoned lock would kill the control path.
pub(crate) fn lock_shared<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
