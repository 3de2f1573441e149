//! # rtscope: Embedded Oscilloscope Service
//!
//! A software oscilloscope for real-time control processes. The service
//! samples values from a process directory (the control process's live
//! pins, signals, and parameters) on the control cycle, gates capture on
//! a configurable trigger, and serves captured waveforms to clients over
//! a small fixed-size TCP command protocol.
//!
//! ## Architecture
//!
//! - **Directory**: the [`directory::ProcessDirectory`] trait abstracts
//!   the source of live values; [`directory::sim::SimDirectory`] backs
//!   it with generated waveforms for development and testing
//! - **Acquisition**: channel table, trigger state machine, and sample
//!   ring, advanced once per control cycle by the sampler
//! - **Server**: one-request-per-connection TCP command protocol
//! - **Service**: thread lifecycle tying the two together
//!
//! ## Example
//!
//! ```ignore
//! use rtscope::{
//!     config::ScopeConfig,
//!     directory::sim::SimDirectory,
//!     service::ScopeService,
//! };
//! use std::sync::{Arc, Mutex};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ScopeConfig::load_or_default();
//!     let directory = Arc::new(Mutex::new(SimDirectory::with_demo_entries()));
//!     let mut service = ScopeService::start(&config, directory)?;
//!     // ... wait for shutdown ...
//!     service.stop();
//!     Ok(())
//! }
//! ```

pub mod acquire;
pub mod codec;
pub mod config;
pub mod directory;
pub mod error;
pub mod server;
pub mod service;
pub mod types;

pub use config::ScopeConfig;
pub use error::{Result, ScopeError};
pub use service::ScopeService;
