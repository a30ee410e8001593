//! Logging bootstrap

use tracing_subscriber::EnvFilter;

use crate::{NodeConfig, RuntimeError, RuntimeResult};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_level`. Fails if a subscriber is already set.
pub fn init_tracing(default_level: &str, json: bool) -> RuntimeResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| RuntimeError::Config(format!("log filter {default_level:?}: {e}")))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| RuntimeError::Telemetry(e.to_string()))
}

/// `init_tracing` with the node's log settings
pub fn init_tracing_from(config: &NodeConfig) -> RuntimeResult<()> {
    init_tracing(&config.log_level, config.json_logging)
}
