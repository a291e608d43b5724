use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over the CLI level so a
/// one-off `RUST_LOG=settle=trace settle` works without editing flags.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("settle={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
