//! Diagnostic logging
//!
//! Executor phases and adapter calls are reported through `tracing` on stderr.
//! Operator-facing output (PR links, prompts) is printed to stdout separately and
//! is not affected by the filter.

use crate::core::error::{ConfigError, ReleaseError, ReleaseResult};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Build the filter: `RUST_LOG` wins when set, otherwise `--log-level`
pub fn filter(level: &str, rust_log: Option<&str>) -> ReleaseResult<EnvFilter> {
  if let Some(directives) = rust_log.filter(|d| !d.trim().is_empty()) {
    return EnvFilter::try_new(directives).map_err(|e| {
      ReleaseError::Config(ConfigError::Invalid {
        field: "RUST_LOG".to_string(),
        reason: e.to_string(),
      })
    });
  }

  let level = level.to_ascii_lowercase();
  if !LEVELS.contains(&level.as_str()) {
    return Err(ReleaseError::Config(ConfigError::Invalid {
      field: "--log-level".to_string(),
      reason: format!("'{}' is not one of {}", level, LEVELS.join(", ")),
    }));
  }
  Ok(EnvFilter::new(level))
}

/// Install the global subscriber (compact, stderr)
pub fn init(level: &str, rust_log: Option<&str>) -> ReleaseResult<()> {
  let filter = filter(level, rust_log)?;

  tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().with_writer(std::io::stderr).compact())
    .try_init()
    .map_err(|e| ReleaseError::message(format!("Failed to initialize logging: {}", e)))
}
