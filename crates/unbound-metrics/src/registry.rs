use std::{collections::HashSet, sync::Arc};

use regex::Regex;
use unbound_common::error::{Result, UnboundError};

use crate::types::{MetricDescriptor, MetricType, MetricValue, ScalarKind};

pub const DEFAULT_HISTOGRAM_PATTERN: &str = r"^histogram\.\d+(?:\.\d+)?\.to\.(\d+\.\d+)$";
pub const DEFAULT_AVERAGE_KEY: &str = "total.recursion.time.avg";

/// A counter or gauge whose key pattern captures its label values.
#[derive(Debug)]
pub struct ScalarMetric {
    descriptor: Arc<MetricDescriptor>,
    kind: ScalarKind,
    pattern: Regex,
}

impl ScalarMetric {
    pub fn descriptor(&self) -> &Arc<MetricDescriptor> {
        &self.descriptor
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    pub fn value(&self, value: f64) -> MetricValue {
        self.kind.value(value)
    }

    /// Label values for `key`, or `None` when the pattern does not match.
    pub fn match_key(&self, key: &str) -> Option<Vec<String>> {
        let captures = self.pattern.captures(key)?;
        Some(
            captures
                .iter()
                .skip(1)
                .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        )
    }
}

/// Descriptor set consulted by every collection pass.
///
/// Scalar metrics are tried in registration order and the first matching
/// pattern wins. The registry is built once, then shared read-only.
#[derive(Debug)]
pub struct MetricsRegistry {
    namespace: String,
    scalars: Vec<ScalarMetric>,
    names: HashSet<String>,
    histogram: Arc<MetricDescriptor>,
    histogram_pattern: Regex,
    average_key: String,
}

impl MetricsRegistry {
    pub fn new(namespace: &str, histogram_name: &str, histogram_help: &str) -> Result<Self> {
        let histogram = Arc::new(MetricDescriptor::new(
            namespace,
            histogram_name,
            histogram_help,
            MetricType::Histogram,
            &[],
        ));
        let histogram_pattern = compile(&histogram.name, DEFAULT_HISTOGRAM_PATTERN)?;

        Ok(Self {
            namespace: namespace.to_string(),
            scalars: Vec::new(),
            names: HashSet::from([histogram.name.clone()]),
            histogram,
            histogram_pattern,
            average_key: DEFAULT_AVERAGE_KEY.to_string(),
        })
    }

    pub fn register_counter(
        &mut self,
        name: &str,
        help: &str,
        variable_labels: &[&str],
        pattern: &str,
    ) -> Result<()> {
        self.register(name, help, ScalarKind::Counter, variable_labels, pattern)
    }

    pub fn register_gauge(
        &mut self,
        name: &str,
        help: &str,
        variable_labels: &[&str],
        pattern: &str,
    ) -> Result<()> {
        self.register(name, help, ScalarKind::Gauge, variable_labels, pattern)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn scalars(&self) -> &[ScalarMetric] {
        &self.scalars
    }

    /// First registered scalar whose pattern matches `key`, with its label
    /// values.
    pub fn match_scalar(&self, key: &str) -> Option<(&ScalarMetric, Vec<String>)> {
        self.scalars
            .iter()
            .find_map(|metric| metric.match_key(key).map(|labels| (metric, labels)))
    }

    pub fn histogram_descriptor(&self) -> &Arc<MetricDescriptor> {
        &self.histogram
    }

    /// Upper bound text captured from a histogram bucket key.
    pub fn match_bucket<'k>(&self, key: &'k str) -> Option<&'k str> {
        self.histogram_pattern
            .captures(key)
            .and_then(|captures| captures.get(1))
            .map(|bound| bound.as_str())
    }

    pub fn is_average_key(&self, key: &str) -> bool {
        key == self.average_key
    }

    fn register(
        &mut self,
        name: &str,
        help: &str,
        kind: ScalarKind,
        variable_labels: &[&str],
        pattern: &str,
    ) -> Result<()> {
        let descriptor = MetricDescriptor::new(
            &self.namespace,
            name,
            help,
            kind.metric_type(),
            variable_labels,
        );
        let pattern = compile(&descriptor.name, pattern)?;

        let groups = pattern.captures_len() - 1;
        if groups != variable_labels.len() {
            return Err(UnboundError::InvalidArgument(format!(
                "metric {} declares {} labels but its pattern has {groups} capture groups",
                descriptor.name,
                variable_labels.len()
            )));
        }

        if !self.names.insert(descriptor.name.clone()) {
            return Err(UnboundError::InvalidArgument(format!(
                "metric already registered: {}",
                descriptor.name
            )));
        }

        self.scalars.push(ScalarMetric {
            descriptor: Arc::new(descriptor),
            kind,
            pattern,
        });
        Ok(())
    }
}

fn compile(metric: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|err| UnboundError::InvalidPattern {
        metric: metric.to_string(),
        reason: err.to_string(),
    })
}
