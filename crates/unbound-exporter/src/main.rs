use std::sync::Arc;

use tokio::io::{AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use unbound_metrics::{ExporterConfig, MetricsRegistry, StatsCollector, render_prometheus};

mod logging;

/// Reads one `unbound-control stats_noreset` dump from stdin and writes the
/// Prometheus exposition text to stdout, suitable for a textfile collector.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(EnvFilter::new("info"));

    let config = ExporterConfig::from_env()?;
    let registry = Arc::new(MetricsRegistry::with_unbound_defaults(&config)?);
    let collector = StatsCollector::new(registry);

    let mut samples = Vec::new();
    let summary = match collector
        .collect_from_async_reader(BufReader::new(tokio::io::stdin()), &mut samples)
        .await
    {
        Ok(summary) => summary,
        Err(err) => {
            error!(
                error = %err,
                error_class = err.error_class(),
                "stats collection pass failed"
            );
            return Err(err.into());
        }
    };

    let payload = render_prometheus(&samples);
    let mut stdout = tokio::io::stdout();
    stdout.write_all(payload.as_bytes()).await?;
    stdout.flush().await?;

    info!(
        namespace = %config.namespace,
        lines = summary.lines,
        samples = samples.len(),
        ignored_keys = summary.ignored_keys,
        "exported unbound stats"
    );
    Ok(())
}
