//! Log output for Graft processes.

use graft_foundation::{Error, ErrorKind, Result};
use tracing_subscriber::EnvFilter;

use crate::config::{LOG_ENV, RuntimeConfig};

/// Builds the filter: `GRAFT_LOG` if set and valid, else the configured
/// default.
///
/// # Errors
///
/// Returns an error if the configured default does not parse.
pub fn filter(config: &RuntimeConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.log_filter).map_err(|e| {
        Error::new(ErrorKind::Internal(format!(
            "invalid log filter '{}': {e}",
            config.log_filter
        )))
    })
}

/// Installs a formatted subscriber writing to stderr.
///
/// # Errors
///
/// Returns an error if the filter does not parse or a global subscriber is
/// already installed.
pub fn init(config: &RuntimeConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(config)?)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| Error::new(ErrorKind::Internal(format!("cannot install logger: {e}"))))
}
