use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Overrides the `--log-level` default with full filter directives.
pub const LOG_ENV: &str = "SCHEMAFIELD_LOG";

/// Log to stderr so reports on stdout stay machine-readable.
pub fn init(level: &str) {
    let default_level = parse_level(level).unwrap_or(LevelFilter::WARN);
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry().with(layer).try_init();
}

fn parse_level(level: &str) -> Option<LevelFilter> {
    level.parse().ok()
}
