//! Wire protocol: fixed-size binary requests, line-based text responses
//!
//! A request is exactly [`REQUEST_SIZE`] bytes, in host byte order:
//!
//! | offset | size | field                                   |
//! |--------|------|-----------------------------------------|
//! | 0      | 8    | control word (process identity)         |
//! | 8      | 1    | command code                            |
//! | 9      | 1    | selector (kind, mode, or packed channel)|
//! | 10     | 6    | padding                                 |
//! | 16     | 8    | value (i64 or f64, per command)         |
//!
//! The layout matches the native struct packing remote clients use.
//! Responses are plain ASCII, one newline-terminated line per logical
//! item; the connection close marks the end.
//!
//! For CHANNEL the selector packs `index * 10 + kind`; for RUN it carries
//! the requested trigger mode and the value holds the float threshold.

use crate::error::{Result, ScopeError};
use crate::types::DirectoryHandle;

/// Exact size of every request packet
pub const REQUEST_SIZE: usize = 24;

/// Command codes, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandCode {
    /// Reset trigger and ring
    Stop,
    /// Enumerate directory entries of one kind
    List,
    /// Read one entry's current value
    State,
    /// Bind a capture channel
    Channel,
    /// Select the trigger source
    Trig,
    /// Start a capture run
    Run,
    /// Poll the trigger mode
    Check,
    /// Drain the sample ring
    Get,
}

impl CommandCode {
    /// Decode a wire command code
    pub fn from_code(code: u8) -> Option<CommandCode> {
        match code {
            0 => Some(CommandCode::Stop),
            1 => Some(CommandCode::List),
            2 => Some(CommandCode::State),
            3 => Some(CommandCode::Channel),
            4 => Some(CommandCode::Trig),
            5 => Some(CommandCode::Run),
            6 => Some(CommandCode::Check),
            7 => Some(CommandCode::Get),
            _ => None,
        }
    }

    /// The wire code of this command
    pub fn code(&self) -> u8 {
        match self {
            CommandCode::Stop => 0,
            CommandCode::List => 1,
            CommandCode::State => 2,
            CommandCode::Channel => 3,
            CommandCode::Trig => 4,
            CommandCode::Run => 5,
            CommandCode::Check => 6,
            CommandCode::Get => 7,
        }
    }
}

/// Value field of a request, typed by the sender
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RequestValue {
    /// Integer payload (handles, zero filler)
    Int(i64),
    /// Float payload (RUN threshold)
    Float(f64),
}

/// A parsed fixed-size request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Request {
    /// Control word; must match the service's expected identity
    pub control: i64,
    /// Decoded command
    pub command: CommandCode,
    /// Kind code, mode code, or packed channel/kind field
    pub selector: u8,
    value: [u8; 8],
}

impl Request {
    /// Parse an exactly-sized request buffer
    ///
    /// Fails on an unknown command code; the control word is validated by
    /// the server against its configured identity, not here.
    pub fn parse(buf: &[u8; REQUEST_SIZE]) -> Result<Request> {
        let control = i64::from_ne_bytes(buf[0..8].try_into().unwrap_or_default());
        let command = CommandCode::from_code(buf[8])
            .ok_or_else(|| ScopeError::Protocol(format!("unknown command code {}", buf[8])))?;
        let selector = buf[9];
        let value = buf[16..24].try_into().unwrap_or_default();
        Ok(Request {
            control,
            command,
            selector,
            value,
        })
    }

    /// Pack a request buffer; the client-side mirror of [`Request::parse`]
    pub fn pack(control: i64, command: CommandCode, selector: u8, value: RequestValue) -> [u8; REQUEST_SIZE] {
        let mut buf = [0u8; REQUEST_SIZE];
        buf[0..8].copy_from_slice(&control.to_ne_bytes());
        buf[8] = command.code();
        buf[9] = selector;
        let value_bytes = match value {
            RequestValue::Int(v) => v.to_ne_bytes(),
            RequestValue::Float(v) => v.to_ne_bytes(),
        };
        buf[16..24].copy_from_slice(&value_bytes);
        buf
    }

    /// Value field as a signed integer
    pub fn value_i64(&self) -> i64 {
        i64::from_ne_bytes(self.value)
    }

    /// Value field as a float
    pub fn value_f64(&self) -> f64 {
        f64::from_ne_bytes(self.value)
    }

    /// Value field as a directory handle
    pub fn value_handle(&self) -> DirectoryHandle {
        DirectoryHandle(self.value_i64() as u64)
    }

    /// Unpack a CHANNEL selector into (slot index, kind code)
    pub fn channel_slot(&self) -> (usize, u8) {
        ((self.selector / 10) as usize, self.selector % 10)
    }
}
