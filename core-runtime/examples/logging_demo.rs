//! Logging system demonstration
//!
//! Run with:
//! ```bash
//! # Compact format (default)
//! cargo run --example logging_demo
//!
//! # JSON format
//! cargo run --example logging_demo -- json
//!
//! # With custom filter
//! cargo run --example logging_demo -- pretty "core_runtime=trace"
//! ```

use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
use std::env;
use tracing::{debug, error, info, instrument, trace, warn};

fn main() {
    let args: Vec<String> = env::args().collect();

    let format = match args.get(1).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("pretty") => LogFormat::Pretty,
        _ => LogFormat::Compact,
    };

    let mut config = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Trace);
    if let Some(filter) = args.get(2) {
        config = config.with_filter(filter.clone());
    }

    init_logging(config).expect("failed to initialize logging");

    info!(?format, "logging initialized");

    trace!("trace: raw signal values");
    debug!("debug: derivation internals");
    info!("info: state transitions");
    warn!("warn: lagged streams, tolerated failures");
    error!("error: unrecoverable conditions");

    info!(state = "playing", elapsed = 42.5, "structured fields");

    load_stream("https://streams.example.com/demo");
}

#[instrument]
fn load_stream(url: &str) {
    info!("loading");
    debug!(buffered = 3.2, "buffer status");
    info!("ready");
}
