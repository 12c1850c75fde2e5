//! Logger bootstrap for the `ged` binary.
//!
//! The core only emits `log` facade events; this installs the backend.
//! Log lines go to stderr so stdout stays machine-readable.

use anyhow::{Context, Result};
use flexi_logger::{Logger, LoggerHandle, WriteMode};

/// Environment variable consulted when `--log-level` is not given.
pub(crate) const LOG_ENV: &str = "GED_LOG";

const DEFAULT_SPEC: &str = "warn";

/// Pick the log spec: explicit flag, then [`LOG_ENV`], then `warn`.
pub(crate) fn resolve_spec(explicit: Option<&str>, env: Option<String>) -> String {
    explicit
        .map(str::to_string)
        .or(env)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SPEC.to_string())
}

/// Start the stderr logger. The returned handle must be kept alive for the
/// life of the process.
pub(crate) fn init(explicit: Option<&str>) -> Result<LoggerHandle> {
    let spec = resolve_spec(explicit, std::env::var(LOG_ENV).ok());
    Logger::try_with_str(&spec)
        .with_context(|| format!("invalid log spec `{spec}`"))?
        .log_to_stderr()
        .write_mode(WriteMode::Direct)
        .format(flexi_logger::default_format)
        .start()
        .context("failed to start logger")
}
