//! Command execution against the shared acquisition state
//!
//! One handler instance serves every connection; it holds the shared
//! context and directory handles and produces the full response text for a
//! single request. Lock order is always context before directory.

use crate::acquire::{lock_shared, SharedContext, SharedDirectory};
use crate::codec;
use crate::error::{Result, ScopeError};
use crate::server::protocol::{CommandCode, Request};
use crate::types::{ChannelBinding, SourceKind, TriggerMode};

use std::fmt::Write as _;
use std::time::Duration;

/// Executes parsed requests and renders their responses
pub struct CommandHandler {
    ctx: SharedContext,
    directory: SharedDirectory,
    cycle_period: Duration,
}

impl CommandHandler {
    /// Create a handler over the shared capture state
    pub fn new(ctx: SharedContext, directory: SharedDirectory, cycle_period: Duration) -> Self {
        Self {
            ctx,
            directory,
            cycle_period,
        }
    }

    /// Execute one request, returning the response text (possibly empty)
    pub fn execute(&self, request: &Request) -> Result<String> {
        match request.command {
            CommandCode::Stop => self.stop(),
            CommandCode::List => self.list(request),
            CommandCode::State => self.state(request),
            CommandCode::Channel => self.channel(request),
            CommandCode::Trig => self.trig(request),
            CommandCode::Run => self.run(request),
            CommandCode::Check => self.check(),
            CommandCode::Get => self.get(),
        }
    }

    fn stop(&self) -> Result<String> {
        let mut ctx = lock_shared(&self.ctx);
        ctx.stop();
        tracing::debug!("capture stopped");
        Ok(String::new())
    }

    fn list(&self, request: &Request) -> Result<String> {
        let kind = source_kind(request.selector)?;
        let directory = lock_shared(&self.directory);
        let mut response = String::new();
        for entry in directory.enumerate(kind) {
            let _ = writeln!(
                response,
                "{} {:>2} {:>3} {}",
                entry.handle,
                entry.value_type.code(),
                entry.direction.code(),
                entry.name
            );
        }
        Ok(response)
    }

    fn state(&self, request: &Request) -> Result<String> {
        let kind = source_kind(request.selector)?;
        let handle = request.value_handle();
        let mut directory = lock_shared(&self.directory);
        let cell = directory.read_cell(handle, kind)?;
        Ok(format!("{}\n", codec::format_cell(cell)))
    }

    fn channel(&self, request: &Request) -> Result<String> {
        let (index, kind_code) = request.channel_slot();
        let kind = source_kind(kind_code)?;
        let mut ctx = lock_shared(&self.ctx);
        ctx.channels.configure(index, request.value_handle(), kind);
        Ok(String::new())
    }

    fn trig(&self, request: &Request) -> Result<String> {
        let kind = source_kind(request.selector)?;
        let handle = request.value_handle();
        let source = (!handle.is_null()).then_some(ChannelBinding { handle, kind });
        let mut ctx = lock_shared(&self.ctx);
        ctx.trigger.configure(source);
        Ok(String::new())
    }

    fn run(&self, request: &Request) -> Result<String> {
        let mode = TriggerMode::from_code(request.selector)
            .filter(|m| *m == TriggerMode::Capturing || m.is_armed())
            .ok_or_else(|| {
                ScopeError::Protocol(format!("invalid run mode {}", request.selector))
            })?;
        let threshold = request.value_f64();

        let mut ctx = lock_shared(&self.ctx);
        ctx.ring.reset();
        // Baseline for edge detection is read at run time
        let start_value = match ctx.trigger.source() {
            Some(source) => {
                let mut directory = lock_shared(&self.directory);
                match directory
                    .read_cell(source.handle, source.kind)
                    .ok()
                    .and_then(codec::decode)
                {
                    Some(value) => value.as_f64(),
                    None => {
                        tracing::warn!(handle = %source.handle, "trigger source unreadable, baseline 0");
                        0.0
                    }
                }
            }
            None => 0.0,
        };
        ctx.trigger.run(mode, threshold, start_value);
        tracing::debug!(mode = mode.code(), threshold, "run started");
        Ok(String::new())
    }

    fn check(&self) -> Result<String> {
        let ctx = lock_shared(&self.ctx);
        Ok(format!("{}\n", ctx.trigger.mode().code()))
    }

    fn get(&self) -> Result<String> {
        let mut ctx = lock_shared(&self.ctx);
        let samples = ctx.ring.drain();
        let mut response = format!(
            "Samples {} Thread {}\n",
            samples.len(),
            self.cycle_period.as_nanos()
        );
        for sample in &samples {
            let _ = writeln!(response, "{} {}", sample.channel, codec::format_value(&sample.value));
        }
        Ok(response)
    }
}

fn source_kind(code: u8) -> Result<SourceKind> {
    SourceKind::from_code(code)
        .ok_or_else(|| ScopeError::Protocol(format!("unrecognized source kind {code}")))
}
