use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` directives still apply on top of the configured level.
/// A silent configuration installs nothing.
pub fn init_tracing(config: &LoggingConfig) {
    if config.silent {
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(config.level.into()))
        .init();
}
