use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
}

impl MetricType {
    pub fn as_prometheus_type(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
            Self::Histogram => "histogram",
        }
    }
}

/// Kinds a key pattern can map to. Histograms are assembled per pass and
/// never come from a single stats line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Counter,
    Gauge,
}

impl ScalarKind {
    pub fn metric_type(self) -> MetricType {
        match self {
            Self::Counter => MetricType::Counter,
            Self::Gauge => MetricType::Gauge,
        }
    }

    pub fn value(self, value: f64) -> MetricValue {
        match self {
            Self::Counter => MetricValue::Counter(value),
            Self::Gauge => MetricValue::Gauge(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptor {
    pub name: String,
    pub help: String,
    pub metric_type: MetricType,
    pub variable_labels: Vec<String>,
}

impl MetricDescriptor {
    pub fn new(
        namespace: &str,
        name: &str,
        help: &str,
        metric_type: MetricType,
        variable_labels: &[&str],
    ) -> Self {
        Self {
            name: fq_name(namespace, name),
            help: help.to_string(),
            metric_type,
            variable_labels: variable_labels.iter().map(|label| (*label).to_string()).collect(),
        }
    }
}

/// `buckets` hold cumulative counts in ascending bound order.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Counter(f64),
    Gauge(f64),
    Histogram {
        buckets: Vec<(f64, u64)>,
        count: u64,
        sum: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub descriptor: Arc<MetricDescriptor>,
    pub label_values: Vec<String>,
    pub value: MetricValue,
}

impl MetricSample {
    pub fn labels(&self) -> Vec<(String, String)> {
        self.descriptor
            .variable_labels
            .iter()
            .zip(self.label_values.iter())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

pub(crate) fn fq_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}_{name}")
    }
}
