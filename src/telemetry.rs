use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for host applications.
///
/// Filter defaults to `info` and can be overridden via `RUST_LOG`.
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
