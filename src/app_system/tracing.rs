use tracing_subscriber::EnvFilter;

/// Installs the global subscriber: compact output with uptime timestamps.
///
/// `RUST_LOG` wins over `filter` when it is set and parses.
pub fn setup_tracing(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .init();
}
