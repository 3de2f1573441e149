//! Channel table: capture slots bound to directory entries
//!
//! A fixed-size array mapping a channel index to a chosen directory entry.
//! Empty slot = inactive. Mutated only by the command server; the sampler
//! reads it.

use crate::types::{ChannelBinding, DirectoryHandle, SourceKind};

/// Fixed-size table of capture slots
#[derive(Debug, Clone)]
pub struct ChannelTable {
    slots: Vec<Option<ChannelBinding>>,
}

impl ChannelTable {
    /// Create a table with the given number of slots, all inactive
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Number of slots in the table
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Bind a slot to a directory entry
    ///
    /// An out-of-range index is ignored: misconfiguration from a remote
    /// client must never disturb the control cycle. A null handle clears
    /// the slot (the wire convention for terminating a configured set).
    pub fn configure(&mut self, index: usize, handle: DirectoryHandle, kind: SourceKind) {
        if index >= self.slots.len() {
            tracing::warn!(index, capacity = self.slots.len(), "channel index out of range, ignored");
            return;
        }
        if handle.is_null() {
            self.slots[index] = None;
        } else {
            self.slots[index] = Some(ChannelBinding { handle, kind });
        }
    }

    /// Active slots in index order
    pub fn active(&self) -> impl Iterator<Item = (usize, ChannelBinding)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|binding| (index, binding)))
    }
}
