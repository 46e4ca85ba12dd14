//! Tracing subscriber setup.
//!
//! Logs go to stderr so command output on stdout stays machine readable.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Picks the filter directive.
///
/// `RUST_LOG` wins, then `--log-level`, then `-v` (debug, or trace when
/// repeated), then the config file level.
pub fn filter_directive(
    rust_log: Option<&str>,
    cli_level: Option<&str>,
    verbose: u8,
    config_level: &str,
) -> String {
    if let Some(value) = rust_log.filter(|v| !v.trim().is_empty()) {
        return value.to_string();
    }
    if let Some(level) = cli_level {
        return level.to_string();
    }
    match verbose {
        0 => config_level.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Installs the global subscriber.
///
/// An unparseable directive falls back to `info`.
pub fn init(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
