use std::collections::BTreeMap;

use crate::types::{MetricDescriptor, MetricSample, MetricValue};

/// Renders one pass worth of samples in the Prometheus text exposition
/// format, one family per metric name in name order.
pub fn render_prometheus(samples: &[MetricSample]) -> String {
    let mut families: BTreeMap<&str, (&MetricDescriptor, Vec<&MetricSample>)> = BTreeMap::new();
    for sample in samples {
        families
            .entry(sample.descriptor.name.as_str())
            .or_insert_with(|| (sample.descriptor.as_ref(), Vec::new()))
            .1
            .push(sample);
    }

    let mut output = String::new();
    for (name, (descriptor, samples)) in families {
        output.push_str("# HELP ");
        output.push_str(name);
        output.push(' ');
        output.push_str(&escape_help(&descriptor.help));
        output.push('\n');

        output.push_str("# TYPE ");
        output.push_str(name);
        output.push(' ');
        output.push_str(descriptor.metric_type.as_prometheus_type());
        output.push('\n');

        for sample in samples {
            let labels = sample.labels();
            match &sample.value {
                MetricValue::Counter(value) | MetricValue::Gauge(value) => {
                    output.push_str(&render_sample_line(name, &labels, *value));
                }
                MetricValue::Histogram {
                    buckets,
                    count,
                    sum,
                } => {
                    let bucket_name = format!("{name}_bucket");
                    for (bound, cumulative) in buckets {
                        if bound.is_infinite() && bound.is_sign_positive() {
                            continue;
                        }
                        let mut bucket_labels = labels.clone();
                        bucket_labels.push(("le".to_string(), format_bucket_bound(*bound)));
                        output.push_str(&render_sample_line(
                            &bucket_name,
                            &bucket_labels,
                            *cumulative as f64,
                        ));
                    }

                    let mut inf_labels = labels.clone();
                    inf_labels.push(("le".to_string(), format_bucket_bound(f64::INFINITY)));
                    output.push_str(&render_sample_line(&bucket_name, &inf_labels, *count as f64));

                    output.push_str(&render_sample_line(&format!("{name}_sum"), &labels, *sum));
                    output.push_str(&render_sample_line(
                        &format!("{name}_count"),
                        &labels,
                        *count as f64,
                    ));
                }
            }
        }
    }

    output
}

fn render_sample_line(name: &str, labels: &[(String, String)], value: f64) -> String {
    let mut rendered = String::new();
    rendered.push_str(name);

    if !labels.is_empty() {
        rendered.push('{');
        for (index, (key, value)) in labels.iter().enumerate() {
            if index > 0 {
                rendered.push(',');
            }
            rendered.push_str(key);
            rendered.push_str("=\"");
            rendered.push_str(&escape_label_value(value));
            rendered.push('"');
        }
        rendered.push('}');
    }

    rendered.push(' ');
    rendered.push_str(&format_metric_value(value));
    rendered.push('\n');
    rendered
}

fn format_metric_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        format_bucket_bound(value)
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn format_bucket_bound(value: f64) -> String {
    if value.is_infinite() {
        if value.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        }
    } else {
        value.to_string()
    }
}

fn escape_help(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::render_prometheus;
    use crate::types::{MetricDescriptor, MetricSample, MetricType, MetricValue};

    fn sample(
        descriptor: &Arc<MetricDescriptor>,
        labels: &[&str],
        value: MetricValue,
    ) -> MetricSample {
        MetricSample {
            descriptor: Arc::clone(descriptor),
            label_values: labels.iter().map(|label| (*label).to_string()).collect(),
            value,
        }
    }

    #[test]
    fn renders_scalar_families_grouped_by_name() {
        let queries = Arc::new(MetricDescriptor::new(
            "unbound",
            "queries_total",
            "Total number of queries received.",
            MetricType::Counter,
            &["thread"],
        ));
        let now = Arc::new(MetricDescriptor::new(
            "unbound",
            "time_now_seconds",
            "Current time in seconds since 1970.",
            MetricType::Gauge,
            &[],
        ));

        let output = render_prometheus(&[
            sample(&queries, &["0"], MetricValue::Counter(10.0)),
            sample(&now, &[], MetricValue::Gauge(1700000000.25)),
            sample(&queries, &["1"], MetricValue::Counter(3.0)),
        ]);

        assert_eq!(
            output,
            "# HELP unbound_queries_total Total number of queries received.\n\
             # TYPE unbound_queries_total counter\n\
             unbound_queries_total{thread=\"0\"} 10\n\
             unbound_queries_total{thread=\"1\"} 3\n\
             # HELP unbound_time_now_seconds Current time in seconds since 1970.\n\
             # TYPE unbound_time_now_seconds gauge\n\
             unbound_time_now_seconds 1700000000.25\n"
        );
    }

    #[test]
    fn renders_histogram_with_inf_sum_and_count() {
        let descriptor = Arc::new(MetricDescriptor::new(
            "unbound",
            "response_time_seconds",
            "Query response time in seconds.",
            MetricType::Histogram,
            &[],
        ));

        let output = render_prometheus(&[sample(
            &descriptor,
            &[],
            MetricValue::Histogram {
                buckets: vec![(1.0, 2), (2.0, 5)],
                count: 5,
                sum: 2.5,
            },
        )]);

        assert_eq!(
            output,
            "# HELP unbound_response_time_seconds Query response time in seconds.\n\
             # TYPE unbound_response_time_seconds histogram\n\
             unbound_response_time_seconds_bucket{le=\"1\"} 2\n\
             unbound_response_time_seconds_bucket{le=\"2\"} 5\n\
             unbound_response_time_seconds_bucket{le=\"+Inf\"} 5\n\
             unbound_response_time_seconds_sum 2.5\n\
             unbound_response_time_seconds_count 5\n"
        );
    }

    #[test]
    fn escapes_label_values() {
        let descriptor = Arc::new(MetricDescriptor::new(
            "",
            "answers",
            "line one\nline two",
            MetricType::Counter,
            &["rcode"],
        ));

        let output = render_prometheus(&[sample(
            &descriptor,
            &["a\"b\\c"],
            MetricValue::Counter(1.0),
        )]);
        assert!(output.contains("# HELP answers line one\\nline two\n"));
        assert!(output.contains("answers{rcode=\"a\\\"b\\\\c\"} 1\n"));
    }
}
