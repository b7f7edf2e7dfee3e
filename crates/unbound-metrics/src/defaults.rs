use unbound_common::error::Result;

use crate::{config::ExporterConfig, registry::MetricsRegistry};

pub const HISTOGRAM_NAME: &str = "response_time_seconds";
pub const HISTOGRAM_HELP: &str = "Query response time in seconds.";

impl MetricsRegistry {
    /// Registry populated with the statistics `unbound-control stats` reports.
    pub fn with_unbound_defaults(config: &ExporterConfig) -> Result<Self> {
        let mut registry = Self::new(&config.namespace, HISTOGRAM_NAME, HISTOGRAM_HELP)?;
        register_unbound_metrics(&mut registry)?;
        Ok(registry)
    }
}

pub fn register_unbound_metrics(registry: &mut MetricsRegistry) -> Result<()> {
    registry.register_counter(
        "answer_rcodes_total",
        "Total number of answers to queries, from cache or from recursion, by response code.",
        &["rcode"],
        r"^num\.answer\.rcode\.(\w+)$",
    )?;
    registry.register_counter(
        "answers_bogus",
        "Total number of answers that were bogus.",
        &[],
        r"^num\.answer\.bogus$",
    )?;
    registry.register_counter(
        "answers_secure_total",
        "Total number of answers that were secure.",
        &[],
        r"^num\.answer\.secure$",
    )?;
    registry.register_counter(
        "cache_hits_total",
        "Total number of queries that were successfully answered using a cache lookup.",
        &["thread"],
        r"^thread(\d+)\.num\.cachehits$",
    )?;
    registry.register_counter(
        "cache_misses_total",
        "Total number of cache queries that needed recursive processing.",
        &["thread"],
        r"^thread(\d+)\.num\.cachemiss$",
    )?;
    registry.register_gauge(
        "memory_caches_bytes",
        "Memory in bytes in use by caches.",
        &["cache"],
        r"^mem\.cache\.(\w+)$",
    )?;
    registry.register_gauge(
        "memory_modules_bytes",
        "Memory in bytes in use by modules.",
        &["module"],
        r"^mem\.mod\.(\w+)$",
    )?;
    registry.register_gauge(
        "memory_sbrk_bytes",
        "Memory in bytes allocated through sbrk.",
        &[],
        r"^mem\.total\.sbrk$",
    )?;
    registry.register_counter(
        "prefetches_total",
        "Total number of cache prefetches performed.",
        &["thread"],
        r"^thread(\d+)\.num\.prefetch$",
    )?;
    registry.register_counter(
        "queries_total",
        "Total number of queries received.",
        &["thread"],
        r"^thread(\d+)\.num\.queries$",
    )?;
    registry.register_counter(
        "query_classes_total",
        "Total number of queries with a given query class.",
        &["class"],
        r"^num\.query\.class\.([\w]+)$",
    )?;
    registry.register_counter(
        "query_flags_total",
        "Total number of queries that had a given flag set in the header.",
        &["flag"],
        r"^num\.query\.flags\.([\w]+)$",
    )?;
    registry.register_counter(
        "query_ipv6_total",
        "Total number of queries that were made using IPv6 towards the Unbound server.",
        &[],
        r"^num\.query\.ipv6$",
    )?;
    registry.register_counter(
        "query_opcodes_total",
        "Total number of queries with a given query opcode.",
        &["opcode"],
        r"^num\.query\.opcode\.([\w]+)$",
    )?;
    registry.register_counter(
        "query_edns_DO_total",
        "Total number of queries that had an EDNS OPT record with the DO (DNSSEC OK) bit set present.",
        &[],
        r"^num\.query\.edns\.DO$",
    )?;
    registry.register_counter(
        "query_edns_present_total",
        "Total number of queries that had an EDNS OPT record present.",
        &[],
        r"^num\.query\.edns\.present$",
    )?;
    registry.register_counter(
        "query_tcp_total",
        "Total number of queries that were made using TCP towards the Unbound server.",
        &[],
        r"^num\.query\.tcp$",
    )?;
    registry.register_counter(
        "query_types_total",
        "Total number of queries with a given query type.",
        &["type"],
        r"^num\.query\.type\.([\w]+)$",
    )?;
    registry.register_gauge(
        "request_list_current_all",
        "Current size of the request list, including internally generated queries.",
        &["thread"],
        r"^thread(\d+)\.requestlist\.current\.all$",
    )?;
    registry.register_gauge(
        "request_list_current_user",
        "Current size of the request list, only counting the requests from client queries.",
        &["thread"],
        r"^thread(\d+)\.requestlist\.current\.user$",
    )?;
    registry.register_counter(
        "request_list_exceeded_total",
        "Number of queries that were dropped because the request list was full.",
        &["thread"],
        r"^thread(\d+)\.requestlist\.exceeded$",
    )?;
    registry.register_counter(
        "request_list_overwritten_total",
        "Total number of requests in the request list that were overwritten by newer entries.",
        &["thread"],
        r"^thread(\d+)\.requestlist\.overwritten$",
    )?;
    registry.register_counter(
        "recursive_replies_total",
        "Total number of replies sent to queries that needed recursive processing.",
        &["thread"],
        r"^thread(\d+)\.num\.recursivereplies$",
    )?;
    registry.register_gauge(
        "recursion_time_seconds_avg",
        "Average time it took to answer queries that needed recursive processing.",
        &[],
        r"^total\.recursion\.time\.avg$",
    )?;
    registry.register_gauge(
        "recursion_time_seconds_median",
        "The median of the time it took to answer queries that needed recursive processing.",
        &[],
        r"^total\.recursion\.time\.median$",
    )?;
    registry.register_counter(
        "rrset_bogus_total",
        "Total number of rrsets marked bogus by the validator.",
        &[],
        r"^num\.rrset\.bogus$",
    )?;
    registry.register_counter(
        "time_elapsed_seconds",
        "Time since last statistics printout in seconds.",
        &[],
        r"^time\.elapsed$",
    )?;
    registry.register_gauge(
        "time_now_seconds",
        "Current time in seconds since 1970.",
        &[],
        r"^time\.now$",
    )?;
    registry.register_counter(
        "time_up_seconds_total",
        "Uptime since server boot in seconds.",
        &[],
        r"^time\.up$",
    )?;
    registry.register_counter(
        "unwanted_queries_total",
        "Total number of queries that were refused or dropped because they failed the access control settings.",
        &[],
        r"^unwanted\.queries$",
    )?;
    registry.register_counter(
        "unwanted_replies_total",
        "Total number of replies that were unwanted or unsolicited.",
        &[],
        r"^unwanted\.replies$",
    )?;
    registry.register_counter(
        "zero_ttl_responses_total",
        "Total number of replies with ttl zero, because they served an expired cache entry.",
        &[],
        r"^num\.zero_ttl$",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{config::ExporterConfig, registry::MetricsRegistry, types::MetricType};

    #[test]
    fn default_registry_builds() {
        let registry = MetricsRegistry::with_unbound_defaults(&ExporterConfig::default()).unwrap();
        assert_eq!(registry.scalars().len(), 32);
        assert_eq!(
            registry.histogram_descriptor().name,
            "unbound_response_time_seconds"
        );
    }

    #[test]
    fn maps_common_unbound_keys() {
        let registry = MetricsRegistry::with_unbound_defaults(&ExporterConfig::default()).unwrap();

        let cases = [
            ("thread0.num.queries", "unbound_queries_total", vec!["0"]),
            ("thread12.num.cachehits", "unbound_cache_hits_total", vec!["12"]),
            ("num.answer.rcode.NXDOMAIN", "unbound_answer_rcodes_total", vec!["NXDOMAIN"]),
            ("num.query.type.AAAA", "unbound_query_types_total", vec!["AAAA"]),
            ("mem.cache.rrset", "unbound_memory_caches_bytes", vec!["rrset"]),
            ("total.recursion.time.avg", "unbound_recursion_time_seconds_avg", vec![]),
            ("time.up", "unbound_time_up_seconds_total", vec![]),
        ];

        for (key, name, labels) in cases {
            let (metric, values) = registry
                .match_scalar(key)
                .unwrap_or_else(|| panic!("{key} should match"));
            assert_eq!(metric.descriptor().name, name);
            assert_eq!(values, labels);
        }

        assert!(registry.match_scalar("total.num.queries").is_none());
    }

    #[test]
    fn memory_metrics_are_gauges() {
        let registry = MetricsRegistry::with_unbound_defaults(&ExporterConfig::default()).unwrap();
        let (metric, _) = registry.match_scalar("mem.mod.validator").unwrap();
        assert_eq!(metric.descriptor().metric_type, MetricType::Gauge);
    }

    #[test]
    fn honours_configured_namespace() {
        let config = ExporterConfig {
            namespace: "resolver".to_string(),
        };
        let registry = MetricsRegistry::with_unbound_defaults(&config).unwrap();
        let (metric, _) = registry.match_scalar("time.now").unwrap();
        assert_eq!(metric.descriptor().name, "resolver_time_now_seconds");
    }
}
