//! Diagnostics subscriber setup.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::observability::RequestLogLayer;

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(level: &str) -> String {
    format!("request_logger={level},tower_http={level}")
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. With `bridge_tracing` set,
/// events are rendered by [`RequestLogLayer`] instead of the fmt layer.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(&config.diagnostics_level).into());

    let bridge = config.bridge_tracing.then(RequestLogLayer::new);
    let fmt = (!config.bridge_tracing).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt)
        .with(bridge)
        .try_init()
}
