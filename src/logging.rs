//! Diagnostic logging to stderr, kept apart from the reply stream on stdout.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_LEVEL: &str = "warn";
pub const DEBUG_LEVEL: &str = "debug";

/// `RUST_LOG` wins; otherwise `warn`, or `debug` when `debug` is set.
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        DEBUG_LEVEL
    } else {
        DEFAULT_LEVEL
    }
}

pub fn init(debug: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .ok();
}
