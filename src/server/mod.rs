//! Command server: one connection, one request, one response
//!
//! The server runs on its own worker thread, polling a non-blocking
//! listener with a bounded interval so it can observe the cooperative
//! shutdown flag. Each accepted connection carries exactly one fixed-size
//! request; the full response is written and the connection closed before
//! the next accept, so there are never concurrent sessions.

pub mod handler;
pub mod protocol;
pub mod worker;

pub use handler::CommandHandler;
pub use protocol::{CommandCode, Request, RequestValue, REQUEST_SIZE};
pub use worker::{bind_listener, ServerWorker};
