use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub const LOG_ENV: &str = "UNBOUND_EXPORTER_LOG";

/// Installs the global subscriber. Output goes to stderr since stdout
/// carries the exposition text.
pub fn init(fallback: EnvFilter) {
    let configured = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(select_filter(configured, fallback))
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to set global default subscriber: {err}");
    }
}

fn select_filter(configured: Option<String>, fallback: EnvFilter) -> EnvFilter {
    match configured {
        Some(value) => EnvFilter::try_new(value).unwrap_or(fallback),
        None => fallback,
    }
}
