//! Simulated process-data directory
//!
//! An in-memory directory used by the demo binary and the test suite. Each
//! entry holds a settable value; an entry may also carry a waveform pattern
//! that regenerates the value on every read, which gives the demo binary
//! something to capture without a real control process.
//!
//! The directory is cheaply cloneable: clones share the same entry table,
//! so a test can hand one clone to the service and keep another to script
//! values cycle by cycle.

use crate::codec::{self, RawCell};
use crate::error::{Result, ScopeError};
use crate::types::{Direction, DirectoryHandle, SourceKind, TypedValue, ValueType};

use super::{EntryInfo, ProcessDirectory};

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// First handle assigned to a simulated entry
const HANDLE_BASE: u64 = 0x1000;

/// Handle stride between entries; resembles cell spacing in a shared region
const HANDLE_STRIDE: u64 = 0x40;

/// Waveform pattern for a simulated entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimPattern {
    /// Fixed value
    Constant(f64),
    /// Sinusoid over elapsed wall time
    Sine {
        frequency: f64,
        amplitude: f64,
        offset: f64,
    },
    /// Counter advancing on every read, wrapping between min and max
    Counter { step: f64, min: f64, max: f64 },
    /// Square wave over elapsed wall time
    Square { period: f64, amplitude: f64 },
}

impl SimPattern {
    /// Generate the next value for this pattern
    fn generate(&self, elapsed_secs: f64, counter: &mut f64) -> f64 {
        match *self {
            SimPattern::Constant(v) => v,
            SimPattern::Sine {
                frequency,
                amplitude,
                offset,
            } => offset + amplitude * (2.0 * std::f64::consts::PI * frequency * elapsed_secs).sin(),
            SimPattern::Counter { step, min, max } => {
                *counter += step;
                if *counter > max {
                    *counter = min;
                } else if *counter < min {
                    *counter = max;
                }
                *counter
            }
            SimPattern::Square { period, amplitude } => {
                if (elapsed_secs % period) < period / 2.0 {
                    amplitude
                } else {
                    -amplitude
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
struct SimEntry {
    handle: DirectoryHandle,
    kind: SourceKind,
    value_type: ValueType,
    direction: Direction,
    name: String,
    value: TypedValue,
    pattern: Option<SimPattern>,
    counter: f64,
}

#[derive(Debug)]
struct SimState {
    entries: Vec<SimEntry>,
    next_handle: u64,
    started: Instant,
}

/// Simulated directory; clones share one entry table
#[derive(Debug, Clone)]
pub struct SimDirectory {
    inner: Arc<Mutex<SimState>>,
}

impl SimDirectory {
    /// Create an empty simulated directory
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SimState {
                entries: Vec::new(),
                next_handle: HANDLE_BASE,
                started: Instant::now(),
            })),
        }
    }

    /// Create a directory pre-populated with demo waveforms
    pub fn with_demo_entries() -> Self {
        let dir = Self::new();
        let wave = dir.add_entry("demo.wave", SourceKind::Pin, ValueType::Float, Direction::Out);
        dir.set_pattern(
            wave,
            SimPattern::Sine {
                frequency: 0.5,
                amplitude: 10.0,
                offset: 0.0,
            },
        );
        let count = dir.add_entry("demo.count", SourceKind::Pin, ValueType::Signed32, Direction::Out);
        dir.set_pattern(
            count,
            SimPattern::Counter {
                step: 1.0,
                min: 0.0,
                max: 1000.0,
            },
        );
        let gate = dir.add_entry("demo.gate", SourceKind::Signal, ValueType::Bit, Direction::InOut);
        dir.set_pattern(
            gate,
            SimPattern::Square {
                period: 2.0,
                amplitude: 1.0,
            },
        );
        dir.add_entry(
            "demo.mask",
            SourceKind::Parameter,
            ValueType::Unsigned32,
            Direction::ReadWrite,
        );
        dir
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Add an entry and return its assigned handle
    pub fn add_entry(
        &self,
        name: impl Into<String>,
        kind: SourceKind,
        value_type: ValueType,
        direction: Direction,
    ) -> DirectoryHandle {
        let mut state = self.lock();
        let handle = DirectoryHandle(state.next_handle);
        state.next_handle += HANDLE_STRIDE;
        let value = match value_type {
            ValueType::Bit => TypedValue::Bit(false),
            ValueType::Float => TypedValue::Float(0.0),
            ValueType::Signed32 => TypedValue::Signed32(0),
            ValueType::Unsigned32 => TypedValue::Unsigned32(0),
        };
        state.entries.push(SimEntry {
            handle,
            kind,
            value_type,
            direction,
            name: name.into(),
            value,
            pattern: None,
            counter: 0.0,
        });
        handle
    }

    /// Set an entry's current value; clears any pattern
    pub fn set_value(&self, handle: DirectoryHandle, value: TypedValue) {
        let mut state = self.lock();
        if let Some(entry) = state.entries.iter_mut().find(|e| e.handle == handle) {
            entry.value = value;
            entry.pattern = None;
        }
    }

    /// Attach a waveform pattern regenerating the value on every read
    pub fn set_pattern(&self, handle: DirectoryHandle, pattern: SimPattern) {
        let mut state = self.lock();
        if let Some(entry) = state.entries.iter_mut().find(|e| e.handle == handle) {
            entry.pattern = Some(pattern);
        }
    }
}

impl Default for SimDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessDirectory for SimDirectory {
    fn enumerate(&self, kind: SourceKind) -> Vec<EntryInfo> {
        let state = self.lock();
        state
            .entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| EntryInfo {
                handle: e.handle,
                kind: e.kind,
                value_type: e.value_type,
                direction: e.direction,
                name: e.name.clone(),
            })
            .collect()
    }

    fn read_cell(&mut self, handle: DirectoryHandle, kind: SourceKind) -> Result<RawCell> {
        let mut state = self.lock();
        let elapsed = state.started.elapsed().as_secs_f64();
        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.handle == handle && e.kind == kind)
            .ok_or_else(|| ScopeError::directory(handle.0, format!("unknown {kind} handle")))?;

        if let Some(pattern) = entry.pattern {
            let raw = pattern.generate(elapsed, &mut entry.counter);
            entry.value = match entry.value_type {
                ValueType::Bit => TypedValue::Bit(raw > 0.5),
                ValueType::Float => TypedValue::Float(raw),
                ValueType::Signed32 => TypedValue::Signed32(raw as i64),
                ValueType::Unsigned32 => TypedValue::Unsigned32(raw.max(0.0) as u64),
            };
        }
        Ok(codec::encode(entry.value))
    }
}
