use crate::types::MetricSample;

/// Destination for the samples of a completed collection pass.
pub trait MetricSink {
    fn emit(&mut self, sample: MetricSample);
}

impl MetricSink for Vec<MetricSample> {
    fn emit(&mut self, sample: MetricSample) {
        self.push(sample);
    }
}
