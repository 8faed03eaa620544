use std::io::IsTerminal;

use ctxlog_logger::ContextLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Diagnostics only: `RUST_LOG`-filtered, on stderr so stdout stays the log stream.
pub fn init_cli_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .compact()
        .try_init();
}

/// Diagnostics on stderr plus the bridge that turns third-party `tracing`
/// events (HTTP tracing included) into context-aware log records.
pub fn init_serve_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .compact()
        .with_filter(EnvFilter::from_default_env());

    let _ = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(ContextLayer::global())
        .try_init();
}
