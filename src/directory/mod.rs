//! Process-data directory interface
//!
//! The directory is owned by the host runtime and exposed to the core as a
//! narrow read-only interface: enumerate the named entries of one kind, and
//! read the raw cell behind a handle. The core never sees raw addresses,
//! only opaque [`DirectoryHandle`]s.
//!
//! [`SimDirectory`] is an in-memory implementation used by the binary and
//! the test suite; the real directory lives in the host process.

pub mod sim;

pub use sim::{SimDirectory, SimPattern};

use crate::codec::RawCell;
use crate::error::Result;
use crate::types::{Direction, DirectoryHandle, SourceKind, ValueType};

/// Metadata of one directory entry, as reported by LIST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Opaque handle used to read the entry
    pub handle: DirectoryHandle,
    /// Namespace the entry lives in
    pub kind: SourceKind,
    /// Declared type of the entry's cell
    pub value_type: ValueType,
    /// Data direction of the entry
    pub direction: Direction,
    /// Dotted entry name
    pub name: String,
}

/// Read-only view of the host's process-data directory
///
/// Implementations must be `Send`: the sampler thread and the server
/// worker both read through this interface (behind the shared context
/// lock).
pub trait ProcessDirectory: Send {
    /// Enumerate all entries of one kind, in directory order
    fn enumerate(&self, kind: SourceKind) -> Vec<EntryInfo>;

    /// Read the current raw cell of an entry
    ///
    /// Fails only if the directory does not know the handle; interpreting
    /// the cell is the codec's job.
    fn read_cell(&mut self, handle: DirectoryHandle, kind: SourceKind) -> Result<RawCell>;
}
