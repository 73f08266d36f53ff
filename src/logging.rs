//! Tracing initialization.

use tracing_subscriber::EnvFilter;

use crate::config::default_log_filter;

/// Install the global tracing subscriber. `RUST_LOG` wins when set;
/// otherwise the built-in filter applies. Safe to call once per process.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
