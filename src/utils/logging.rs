//! Logging utilities
//!
//! Traffic logger seam and subscriber setup for host applications

use crate::config::LoggingConfig;
use anyhow::Result;
use tracing::info;

/// Receives free-text traffic messages from the API client
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
}

/// [`Logger`] that forwards to `tracing` at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        info!(target: "apiconnector::traffic", "{}", message);
    }
}

/// Initialize logging system
///
/// Installs a global `tracing` subscriber; fails if one is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if config.format == "json" {
        // JSON format logs (production environment)
        Box::new(tracing_subscriber::fmt()
            .with_env_filter(config.level.as_str())
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .finish())
    } else {
        // Human readable format (development environment)
        Box::new(tracing_subscriber::fmt()
            .with_env_filter(config.level.as_str())
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .finish())
    };

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    info!("Logging system initialized");
    Ok(())
}
