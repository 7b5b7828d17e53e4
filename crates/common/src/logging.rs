//! Logging and tracing initialization.

use std::sync::Arc;

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber with the given configuration.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if let Some(path) = &config.file {
        match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let subscriber = builder.with_ansi(false).with_writer(Arc::new(file)).finish();
                tracing::subscriber::set_global_default(subscriber).ok();
                return;
            }
            Err(e) => {
                eprintln!("Failed to open log file {}: {e}", path.display());
            }
        }
    }

    if config.json {
        let subscriber = builder.json().finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = builder.finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}
