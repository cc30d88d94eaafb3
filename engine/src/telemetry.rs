//! Telemetry
//!
//! The dispatcher, intervention and accumulator modules only emit `tracing`
//! events; nothing is printed until the host installs a subscriber:
//!
//! - `debug`: each dispatch decision, each policy evaluation, usage/cost folds
//! - `info`: sessions finishing and batches held for approval
//! - `warn`: degraded paths (unknown phase, unregistered tool, unparseable
//!   tool arguments)
//!
//! Call one of the `init_*` functions once at startup. Later calls are no-ops.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Level used when neither `RUST_LOG` nor the config sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Filter directive scoping `level` to the engine crate and everything else
fn filter_directive(log_level: &str) -> String {
    format!("{level},helm_engine={level}", level = log_level)
}

/// Install the subscriber at `log_level`, unless `RUST_LOG` is set.
///
/// Debug builds print human-readable events; release builds print one JSON
/// object per event so executors can ship step decisions to a log pipeline.
pub fn init_telemetry_with_level(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(log_level)));

    #[cfg(debug_assertions)]
    let output = fmt::layer().pretty().with_target(false);

    #[cfg(not(debug_assertions))]
    let output = fmt::layer().json().with_current_span(true);

    // Err means a subscriber is already installed
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(output)
        .try_init();
}

/// Install the subscriber at the level of `[core] log_level`
pub fn init_telemetry_from_config(config: &Config) {
    init_telemetry_with_level(&config.core.log_level);
}

pub fn init_telemetry() {
    init_telemetry_with_level(DEFAULT_LOG_LEVEL);
}
