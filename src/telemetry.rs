// 📡 Telemetry - Process-wide tracing setup

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the process.
///
/// Log level defaults to `info` and is overridable via `RUST_LOG`. Events
/// go to stderr; stdout stays reserved for the CLI's own report. Safe to
/// call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
