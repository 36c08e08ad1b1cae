// Tracing initialization for the CLI. Diagnostics go to stderr so SDL and
// query output on stdout stay machine readable.
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub fn init_logging(level: &str) {
    // Prefer RUST_LOG from env, otherwise use provided level string.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
