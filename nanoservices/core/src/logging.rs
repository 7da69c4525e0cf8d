/// Initialize the tracing subscriber for the tap.
///
/// Reads `RUST_LOG` from the environment (default level is `info`) and
/// installs a global subscriber that writes to stderr, leaving stdout to the
/// message stream. Safe to call more than once; later calls are no-ops.
pub fn init() {
    let env = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env))
        .with_writer(std::io::stderr)
        .try_init();
}
