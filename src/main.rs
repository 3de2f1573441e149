//! Embedded oscilloscope service - main entry point
//!
//! Runs the acquisition service against the simulated process directory
//! and serves the command protocol until stdin closes or reads a line.

use rtscope::{
    config::ScopeConfig,
    directory::sim::SimDirectory,
    service::ScopeService,
};
use std::io::BufRead;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Load config first; the log directory comes from it
    let config = match std::env::args().nth(1) {
        Some(path) => ScopeConfig::load(&path)?,
        None => ScopeConfig::load_or_default(),
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rtscope=debug"));

    // The file-appender guard must outlive the service
    let _log_guard = if let Some(log_dir) = &config.log_dir {
        let appender = tracing_appender::rolling::daily(log_dir, "rtscope.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
            .init();
        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
        None
    };

    tracing::info!("starting oscilloscope service");

    let directory = Arc::new(Mutex::new(SimDirectory::with_demo_entries()));
    let mut service = ScopeService::start(&config, directory)?;
    tracing::info!(addr = %service.local_addr(), "listening; press Enter to stop");

    // Block until stdin yields a line or closes
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);

    service.stop();
    Ok(())
}
