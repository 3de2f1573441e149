//! Service lifecycle: spawns the sampler and command-server threads
//!
//! [`ScopeService::start`] binds the listener, builds the shared capture
//! context, and spawns both threads. [`ScopeService::stop`] flips the
//! shared running flag and joins them; the server notices within one
//! accept-poll interval, the sampler within one tick.

use crate::acquire::{lock_shared, run_cycle, AcquisitionContext, SharedContext, SharedDirectory};
use crate::config::ScopeConfig;
use crate::error::{Result, ResultExt};
use crate::server::{bind_listener, CommandHandler, ServerWorker};

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// A running acquisition service
pub struct ScopeService {
    ctx: SharedContext,
    local_addr: SocketAddr,
    running: Arc<AtomicBool>,
    server_thread: Option<JoinHandle<()>>,
    sampler_thread: Option<JoinHandle<()>>,
}

impl ScopeService {
    /// Bind the listener and start the sampler and server threads
    pub fn start(config: &ScopeConfig, directory: SharedDirectory) -> Result<Self> {
        config.validate()?;

        let ctx: SharedContext = Arc::new(Mutex::new(AcquisitionContext::new(
            config.channel_count,
            config.sample_capacity,
        )));
        let listener = bind_listener(config.port)
            .with_context(|| format!("failed to bind command port {}", config.port))?;
        let local_addr = listener.local_addr()?;
        let running = Arc::new(AtomicBool::new(true));

        let handler = CommandHandler::new(
            Arc::clone(&ctx),
            Arc::clone(&directory),
            config.cycle_period(),
        );
        let mut worker = ServerWorker::new(
            listener,
            handler,
            config.control_word,
            Arc::clone(&running),
        );
        let server_thread = std::thread::Builder::new()
            .name("rtscope-server".to_string())
            .spawn(move || worker.run())?;

        let sampler_ctx = Arc::clone(&ctx);
        let sampler_running = Arc::clone(&running);
        let period = config.cycle_period();
        let sampler_thread = std::thread::Builder::new()
            .name("rtscope-sampler".to_string())
            .spawn(move || sampler_loop(sampler_ctx, directory, sampler_running, period))?;

        tracing::info!(addr = %local_addr, period_us = config.cycle_period_us, "service started");
        Ok(Self {
            ctx,
            local_addr,
            running,
            server_thread: Some(server_thread),
            sampler_thread: Some(sampler_thread),
        })
    }

    /// Address the command server is listening on
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Shared capture context, for in-process inspection
    pub fn context(&self) -> SharedContext {
        Arc::clone(&self.ctx)
    }

    /// Signal both threads to stop and wait for them
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.sampler_thread.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.server_thread.take() {
            let _ = handle.join();
        }
        tracing::info!("service stopped");
    }
}

impl Drop for ScopeService {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Run the capture cycle on every tick until shutdown
///
/// Lock order is context then directory, same as the command handler.
fn sampler_loop(
    ctx: SharedContext,
    directory: SharedDirectory,
    running: Arc<AtomicBool>,
    period: Duration,
) {
    tracing::info!("sampler started");
    let ticker = crossbeam_channel::tick(period);
    while running.load(Ordering::SeqCst) {
        if ticker.recv().is_err() {
            break;
        }
        let mut ctx = lock_shared(&ctx);
        let mut directory = lock_shared(&directory);
        run_cycle(&mut ctx, &mut *directory);
    }
    tracing::info!("sampler stopped");
}
