pub mod collector;
pub mod config;
pub mod defaults;
pub mod histogram;
pub mod parser;
pub mod registry;
pub mod render;
pub mod sink;
pub mod types;

pub use collector::{PassSummary, StatsCollector};
pub use config::ExporterConfig;
pub use histogram::{HistogramAccumulator, HistogramSnapshot};
pub use registry::{MetricsRegistry, ScalarMetric};
pub use render::render_prometheus;
pub use sink::MetricSink;
pub use types::{MetricDescriptor, MetricSample, MetricType, MetricValue, ScalarKind};
