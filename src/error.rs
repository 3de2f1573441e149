//! Error handling for rtscope
//!
//! This module defines the service-wide error type and a Result alias used
//! throughout the crate.

use thiserror::Error;

/// Main error type for rtscope operations
#[derive(Error, Debug)]
pub enum ScopeError {
    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or rejected command requests
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Errors reported by the process-data directory
    #[error("Directory error for handle 0x{handle:08X}: {message}")]
    Directory { handle: u64, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ScopeError>,
    },
}

impl ScopeError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ScopeError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a directory error for the given handle
    pub fn directory(handle: u64, message: impl Into<String>) -> Self {
        ScopeError::Directory {
            handle,
            message: message.into(),
        }
    }
}

/// Result type alias for rtscope operations
pub type Result<T> = std::result::Result<T, ScopeError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
