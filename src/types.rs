//! Core data types for rtscope
//!
//! This module contains the fundamental data structures shared between the
//! acquisition engine and the command server.
//!
//! # Main Types
//!
//! - [`SourceKind`] - The three namespaces of the process-data directory
//! - [`ValueType`] - Declared type of a directory cell (bit, float, s32, u32)
//! - [`TypedValue`] - A tagged value produced by the codec from a raw cell
//! - [`TriggerMode`] - Trigger arm selector and run phase, one shared enum
//! - [`Sample`] - One captured (channel, value) pair in the sample ring
//!
//! # Wire codes
//!
//! The numeric codes carried by [`SourceKind`], [`ValueType`],
//! [`TriggerMode`] and [`Direction`] are part of the command protocol and
//! must not be renumbered; remote clients decode them literally.

use serde::{Deserialize, Serialize};

/// Opaque identifier of a directory entry
///
/// Owned by the directory; the core only passes it back when reading.
/// Handle value 0 is reserved and means "no entry" on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectoryHandle(pub u64);

impl DirectoryHandle {
    /// The reserved null handle used to clear a channel slot
    pub const NULL: DirectoryHandle = DirectoryHandle(0);

    /// Returns true for the reserved null handle
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for DirectoryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

/// The kind of directory entry a channel or trigger is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// A component pin
    Pin,
    /// A signal connecting pins
    Signal,
    /// A component parameter
    Parameter,
}

impl SourceKind {
    /// Decode a wire code (0, 1, 2) into a kind
    pub fn from_code(code: u8) -> Option<SourceKind> {
        match code {
            0 => Some(SourceKind::Pin),
            1 => Some(SourceKind::Signal),
            2 => Some(SourceKind::Parameter),
            _ => None,
        }
    }

    /// The wire code of this kind
    pub fn code(&self) -> u8 {
        match self {
            SourceKind::Pin => 0,
            SourceKind::Signal => 1,
            SourceKind::Parameter => 2,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Pin => write!(f, "pin"),
            SourceKind::Signal => write!(f, "signal"),
            SourceKind::Parameter => write!(f, "parameter"),
        }
    }
}

/// Declared type of a directory cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    /// Single bit
    Bit,
    /// Double-precision float
    Float,
    /// 32-bit signed integer
    Signed32,
    /// 32-bit unsigned integer
    Unsigned32,
}

impl ValueType {
    /// Decode a directory type code into a value type
    pub fn from_code(code: u8) -> Option<ValueType> {
        match code {
            1 => Some(ValueType::Bit),
            2 => Some(ValueType::Float),
            3 => Some(ValueType::Signed32),
            4 => Some(ValueType::Unsigned32),
            _ => None,
        }
    }

    /// The numeric type code reported in LIST lines
    pub fn code(&self) -> u8 {
        match self {
            ValueType::Bit => 1,
            ValueType::Float => 2,
            ValueType::Signed32 => 3,
            ValueType::Unsigned32 => 4,
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::Bit => write!(f, "bit"),
            ValueType::Float => write!(f, "float"),
            ValueType::Signed32 => write!(f, "s32"),
            ValueType::Unsigned32 => write!(f, "u32"),
        }
    }
}

/// Data direction of a directory entry, reported in LIST lines
///
/// Codes follow the original process-data conventions: pins are In/Out/IO,
/// parameters are RO/RW.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Input pin
    In,
    /// Output pin
    Out,
    /// Bidirectional pin
    InOut,
    /// Read-only parameter
    ReadOnly,
    /// Read-write parameter
    ReadWrite,
}

impl Direction {
    /// The numeric direction code reported in LIST lines
    pub fn code(&self) -> u8 {
        match self {
            Direction::In => 16,
            Direction::Out => 32,
            Direction::InOut => 48,
            Direction::ReadOnly => 64,
            Direction::ReadWrite => 192,
        }
    }
}

/// A tagged process value
///
/// Produced by the value codec from a raw directory cell; immutable once
/// produced. Carries its own kind, so no external type code is needed to
/// interpret it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypedValue {
    /// Boolean bit value
    Bit(bool),
    /// 32-bit signed integer (widened for arithmetic)
    Signed32(i64),
    /// 32-bit unsigned integer (widened for arithmetic)
    Unsigned32(u64),
    /// Floating point value
    Float(f64),
}

impl TypedValue {
    /// Numeric view used for trigger comparison (bit as 0/1)
    pub fn as_f64(&self) -> f64 {
        match self {
            TypedValue::Bit(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            TypedValue::Signed32(v) => *v as f64,
            TypedValue::Unsigned32(v) => *v as f64,
            TypedValue::Float(v) => *v,
        }
    }

    /// The declared type matching this value
    pub fn value_type(&self) -> ValueType {
        match self {
            TypedValue::Bit(_) => ValueType::Bit,
            TypedValue::Signed32(_) => ValueType::Signed32,
            TypedValue::Unsigned32(_) => ValueType::Unsigned32,
            TypedValue::Float(_) => ValueType::Float,
        }
    }
}

/// Trigger state
///
/// A single enum intentionally serves both as the arm selector (which edge
/// to wait for) and the current run phase; remote clients poll it verbatim
/// through CHECK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerMode {
    /// Not armed, not capturing
    #[default]
    Idle,
    /// Actively recording samples into the ring
    Capturing,
    /// Ring filled; terminal until the next run
    Complete,
    /// Waiting for an upward threshold crossing
    ArmedHigh,
    /// Waiting for a downward threshold crossing
    ArmedLow,
    /// Waiting for a crossing in either direction
    ArmedChange,
}

impl TriggerMode {
    /// Decode a wire mode code
    pub fn from_code(code: u8) -> Option<TriggerMode> {
        match code {
            0 => Some(TriggerMode::Idle),
            1 => Some(TriggerMode::Capturing),
            2 => Some(TriggerMode::Complete),
            3 => Some(TriggerMode::ArmedHigh),
            4 => Some(TriggerMode::ArmedLow),
            5 => Some(TriggerMode::ArmedChange),
            _ => None,
        }
    }

    /// The wire code reported by CHECK
    pub fn code(&self) -> u8 {
        match self {
            TriggerMode::Idle => 0,
            TriggerMode::Capturing => 1,
            TriggerMode::Complete => 2,
            TriggerMode::ArmedHigh => 3,
            TriggerMode::ArmedLow => 4,
            TriggerMode::ArmedChange => 5,
        }
    }

    /// True for the three edge-waiting states
    pub fn is_armed(&self) -> bool {
        matches!(
            self,
            TriggerMode::ArmedHigh | TriggerMode::ArmedLow | TriggerMode::ArmedChange
        )
    }
}

/// A channel or trigger binding to one directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelBinding {
    /// Directory entry handle
    pub handle: DirectoryHandle,
    /// Namespace the handle belongs to
    pub kind: SourceKind,
}

/// One recorded sample: which channel produced it and the tagged value
///
/// Only the ordinal position in the ring is preserved; samples carry no
/// timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Index of the channel that produced this sample
    pub channel: usize,
    /// The tagged value read on that cycle
    pub value: TypedValue,
}
