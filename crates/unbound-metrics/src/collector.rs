use std::{io::BufRead, sync::Arc};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, trace};
use unbound_common::error::Result;

use crate::{
    histogram::HistogramAccumulator,
    parser::{decode_line, parse_f64, parse_finite_f64, parse_line, parse_u64},
    registry::MetricsRegistry,
    sink::MetricSink,
    types::MetricSample,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub lines: usize,
    pub scalar_samples: usize,
    pub ignored_keys: usize,
    pub histogram_buckets: usize,
}

/// Turns Unbound stats dumps into metric samples.
///
/// Every pass owns its own accumulator, so one collector may serve
/// concurrent passes. A pass is atomic: the sink only sees samples once the
/// whole stream has been read and parsed without error.
#[derive(Debug, Clone)]
pub struct StatsCollector {
    registry: Arc<MetricsRegistry>,
}

impl StatsCollector {
    pub fn new(registry: Arc<MetricsRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<MetricsRegistry> {
        &self.registry
    }

    pub fn collect_from_reader<R, S>(&self, reader: R, sink: &mut S) -> Result<PassSummary>
    where
        R: BufRead,
        S: MetricSink + ?Sized,
    {
        let mut pass = CollectionPass::new(&self.registry);
        for line in reader.split(b'\n') {
            pass.feed_line(&line?)?;
        }
        Ok(pass.finish(sink))
    }

    pub async fn collect_from_async_reader<R, S>(
        &self,
        reader: R,
        sink: &mut S,
    ) -> Result<PassSummary>
    where
        R: AsyncBufRead + Unpin,
        S: MetricSink + ?Sized,
    {
        let mut pass = CollectionPass::new(&self.registry);
        let mut lines = reader.split(b'\n');
        while let Some(line) = lines.next_segment().await? {
            pass.feed_line(&line)?;
        }
        Ok(pass.finish(sink))
    }
}

struct CollectionPass<'r> {
    registry: &'r MetricsRegistry,
    histogram: HistogramAccumulator,
    pending: Vec<MetricSample>,
    summary: PassSummary,
}

impl<'r> CollectionPass<'r> {
    fn new(registry: &'r MetricsRegistry) -> Self {
        Self {
            registry,
            histogram: HistogramAccumulator::new(),
            pending: Vec::new(),
            summary: PassSummary::default(),
        }
    }

    fn feed_line(&mut self, raw: &[u8]) -> Result<()> {
        self.summary.lines += 1;
        let pair = parse_line(decode_line(raw)?)?;
        let mut matched = false;

        if let Some((metric, label_values)) = self.registry.match_scalar(pair.key) {
            let value = parse_f64(pair.key, pair.value)?;
            self.pending.push(MetricSample {
                descriptor: Arc::clone(metric.descriptor()),
                label_values,
                value: metric.value(value),
            });
            self.summary.scalar_samples += 1;
            matched = true;
        }

        if let Some(bound) = self.registry.match_bucket(pair.key) {
            let upper_bound = parse_f64(pair.key, bound)?;
            let count = parse_u64(pair.key, pair.value)?;
            self.histogram.record_bucket(upper_bound, count);
            matched = true;
        } else if self.registry.is_average_key(pair.key) {
            let average = parse_finite_f64(pair.key, pair.value)?;
            self.histogram.record_average(average);
            matched = true;
        }

        if !matched {
            trace!(key = pair.key, "ignoring unknown stats key");
            self.summary.ignored_keys += 1;
        }

        Ok(())
    }

    fn finish<S: MetricSink + ?Sized>(self, sink: &mut S) -> PassSummary {
        let mut summary = self.summary;
        summary.histogram_buckets = self.histogram.bucket_count();

        let histogram = MetricSample {
            descriptor: Arc::clone(self.registry.histogram_descriptor()),
            label_values: Vec::new(),
            value: self.histogram.reconstruct().into(),
        };

        for sample in self.pending {
            sink.emit(sample);
        }
        sink.emit(histogram);

        debug!(
            lines = summary.lines,
            scalar_samples = summary.scalar_samples,
            ignored_keys = summary.ignored_keys,
            histogram_buckets = summary.histogram_buckets,
            "stats collection pass complete"
        );
        summary
    }
}
