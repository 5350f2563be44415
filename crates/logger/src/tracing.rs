use std::env::var;

use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber at `INFO`, overridable through `RUST_LOG`.
pub fn init() {
    init_with_level(LevelFilter::INFO);
}

/// Install the global subscriber with `level` as the default directive.
///
/// `RUST_LOG_FORMAT=json` switches to line-delimited JSON, anything else gets
/// the compact format.
pub fn init_with_level(level: LevelFilter) {
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let log_format = var("RUST_LOG_FORMAT").unwrap_or_default();

    let log_layer = match log_format.as_str() {
        "json" => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        "" | "compact" => {
            tracing_subscriber::fmt::layer().compact().with_filter(env_filter).boxed()
        }
        other => {
            let layer =
                tracing_subscriber::fmt::layer().compact().with_filter(env_filter).boxed();
            tracing_subscriber::registry().with(layer).init();
            warn!("Unknown RUST_LOG_FORMAT {other:?}, using compact output");
            return;
        }
    };

    tracing_subscriber::registry().with(log_layer).init();
}
