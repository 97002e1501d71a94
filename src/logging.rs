use std::io::stderr;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` filters, default `info`.
/// Stdout stays free for JSON output.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(stderr)
        .with_target(false)
        .try_init();
}
