//! Process-wide tracing subscriber setup

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::TracingConfig;
use crate::layer::ScopeLayer;
use crate::scope::LoggerScope;

/// RUST_LOG takes precedence over the configured default.
pub fn env_filter(config: &TracingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_filter))
}

/// Install the global subscriber: a compact console layer, an optional
/// daily rolling file under `config.log_dir`, and, when `scope` is given, a
/// [`ScopeLayer`] persisting events into it.
///
/// Keep the returned guard alive for as long as file output should be flushed.
pub fn init_tracing(
    config: &TracingConfig,
    scope: Option<Arc<LoggerScope>>,
) -> Result<Option<WorkerGuard>> {
    // Console layer: colored, compact
    let console_layer = fmt::layer()
        .with_ansi(config.ansi)
        .compact()
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true);

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {:?}", dir))?;

            // Creates files like: scopelog.2026-01-22.log
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(&config.file_prefix)
                .filename_suffix("log")
                .build(dir)
                .context("Failed to create log file appender")?;
            let (writer, guard) = tracing_appender::non_blocking(appender);

            // File layer: no colors, more detail
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(console_layer)
        .with(file_layer)
        .with(scope.map(ScopeLayer::new))
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    tracing::info!("Tracing initialized");
    Ok(guard)
}
