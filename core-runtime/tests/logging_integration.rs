//! Integration tests for the logging system.

use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};

#[test]
fn config_builder_chains() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Json)
        .with_level(LogLevel::Debug)
        .with_filter("core_playback=trace");

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, LogLevel::Debug);
    assert_eq!(config.filter.as_deref(), Some("core_playback=trace"));
    assert!(config.display_target);
}

#[test]
fn second_initialization_is_rejected() {
    // Only one global subscriber per process.
    let first = init_logging(LoggingConfig::default());
    assert!(first.is_ok());

    let second = init_logging(LoggingConfig::default());
    assert!(second.is_err());
}
