use std::sync::Arc;

use promkit::{Counter, CustomCollector, Error, Histogram, MetricFamily, Registry, Sample};
use promkit_exposition::{render, render_default, render_registry, CONTENT_TYPE};

fn setup_counters(registry: &Arc<Registry>) {
    let requests = Counter::builder("http_req_total", "metric desc")
        .with_required_labels(["p", "m"])
        .with_registry(registry.clone())
        .build()
        .unwrap();
    requests.labels(&[("p", "p1"), ("m", "m1")]).unwrap().inc_by(3.0).unwrap();
    requests.labels(&[("p", "p2"), ("m", "m2")]).unwrap().inc().unwrap();

    let cache_hits = Counter::builder("cache_hits_total", "cache desc")
        .with_required_labels(["name"])
        .with_registry(registry.clone())
        .build()
        .unwrap();
    cache_hits.labels(&[("name", "redis")]).unwrap().inc_by(5.0).unwrap();

    let exceptions = Counter::builder("exception_total", "exception desc")
        .with_registry(registry.clone())
        .build()
        .unwrap();
    exceptions.inc_by(4.0).unwrap();
}

fn histogram_lines(name: &str, labels: &str, buckets: &[(&str, u32)], sum: &str) -> String {
    let mut lines = String::new();
    for (le, count) in buckets {
        let sep = if labels.is_empty() { "" } else { "," };
        lines.push_str(&format!("{}_bucket{{{}{}le=\"{}\"}} {}\n", name, labels, sep, le, count));
    }
    let labels = if labels.is_empty() { String::new() } else { format!("{{{}}}", labels) };
    let count = buckets.last().map_or(0, |(_, count)| *count);
    lines.push_str(&format!("{}_sum{} {}\n", name, labels, sum));
    lines.push_str(&format!("{}_count{} {}\n", name, labels, count));
    lines
}

fn default_buckets(counts: [u32; 12]) -> Vec<(&'static str, u32)> {
    ["0.005", "0.01", "0.025", "0.05", "0.1", "0.25", "0.5", "1", "2.5", "5", "10", "+Inf"]
        .into_iter()
        .zip(counts)
        .collect()
}

#[test]
fn counters() {
    let registry = Arc::new(Registry::new());
    setup_counters(&registry);

    assert_eq!(
        render_registry(&registry).unwrap(),
        concat!(
            "# HELP http_req_total metric desc\n",
            "# TYPE http_req_total counter\n",
            "http_req_total{p=\"p1\",m=\"m1\"} 3\n",
            "http_req_total{p=\"p2\",m=\"m2\"} 1\n",
            "# HELP cache_hits_total cache desc\n",
            "# TYPE cache_hits_total counter\n",
            "cache_hits_total{name=\"redis\"} 5\n",
            "# HELP exception_total exception desc\n",
            "# TYPE exception_total counter\n",
            "exception_total 4\n",
        )
    );
}

#[test]
fn counters_with_prefix() {
    let registry = Arc::new(Registry::with_prefix("testing").unwrap());
    setup_counters(&registry);

    assert_eq!(
        render_registry(&registry).unwrap(),
        concat!(
            "# HELP testing_http_req_total metric desc\n",
            "# TYPE testing_http_req_total counter\n",
            "testing_http_req_total{p=\"p1\",m=\"m1\"} 3\n",
            "testing_http_req_total{p=\"p2\",m=\"m2\"} 1\n",
            "# HELP testing_cache_hits_total cache desc\n",
            "# TYPE testing_cache_hits_total counter\n",
            "testing_cache_hits_total{name=\"redis\"} 5\n",
            "# HELP testing_exception_total exception desc\n",
            "# TYPE testing_exception_total counter\n",
            "testing_exception_total 4\n",
        )
    );
}

#[test]
fn histogram() {
    let registry = Arc::new(Registry::new());
    let histogram =
        Histogram::builder("hello", "world").with_registry(registry.clone()).build().unwrap();
    histogram.observe(0.4).unwrap();

    let expected = format!(
        "# HELP hello world\n# TYPE hello histogram\n{}",
        histogram_lines("hello", "", &default_buckets([0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1]), "0.4")
    );
    assert_eq!(render_registry(&registry).unwrap(), expected);
}

#[test]
fn histogram_with_labels() {
    let registry = Arc::new(Registry::new());
    let histogram = Histogram::builder("hello", "world")
        .with_required_labels(["bob"])
        .with_registry(registry.clone())
        .build()
        .unwrap();
    histogram.labels(&[("bob", "a")]).unwrap().observe(0.4).unwrap();
    histogram.labels(&[("bob", "b")]).unwrap().observe(7.0).unwrap();

    let expected = format!(
        "# HELP hello world\n# TYPE hello histogram\n{}{}",
        histogram_lines(
            "hello",
            "bob=\"a\"",
            &default_buckets([0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1]),
            "0.4"
        ),
        histogram_lines(
            "hello",
            "bob=\"b\"",
            &default_buckets([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1]),
            "7"
        ),
    );
    assert_eq!(render_registry(&registry).unwrap(), expected);
}

#[test]
fn histogram_with_default_labels() {
    let registry = Arc::new(Registry::new());
    let histogram = Histogram::builder("hello", "world")
        .with_required_labels(["bob"])
        .with_default_labels([("bob", "default")])
        .with_registry(registry.clone())
        .build()
        .unwrap();
    histogram.labels(&[("bob", "a")]).unwrap().observe(0.4).unwrap();

    // The default binding exists from the start, so it comes first even though it is never
    // observed.
    let expected = format!(
        "# HELP hello world\n# TYPE hello histogram\n{}{}",
        histogram_lines("hello", "bob=\"default\"", &default_buckets([0; 12]), "0"),
        histogram_lines(
            "hello",
            "bob=\"a\"",
            &default_buckets([0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1]),
            "0.4"
        ),
    );
    assert_eq!(render_registry(&registry).unwrap(), expected);
}

#[test]
fn escaping() {
    let registry = Arc::new(Registry::new());
    let counter = Counter::builder("http_req_total", "slash\\quote\"newline\n")
        .with_required_labels(["bob"])
        .with_registry(registry.clone())
        .build()
        .unwrap();
    counter.labels(&[("bob", "slash\\quote\"newline\n")]).unwrap();

    assert_eq!(
        render_registry(&registry).unwrap(),
        concat!(
            "# HELP http_req_total slash\\\\quote\"newline\\n\n",
            "# TYPE http_req_total counter\n",
            "http_req_total{bob=\"slash\\\\quote\\\"newline\\n\"} 0\n",
        )
    );
}

#[test]
fn families_without_samples_still_get_headers() {
    let families = vec![MetricFamily::new("idle", promkit::MetricKind::Gauge, "", Vec::new())];
    assert_eq!(render(&families), "# HELP idle \n# TYPE idle gauge\n");
    assert_eq!(render(&[]), "");
}

struct FailingCollector;

impl CustomCollector for FailingCollector {
    fn name(&self) -> &str {
        "failing"
    }

    fn collect(&self) -> Result<Vec<MetricFamily>, Error> {
        Err(Error::InvalidArgument("collector is broken".to_string()))
    }
}

#[test]
fn collection_errors_are_returned() {
    let registry = Registry::new();
    registry.register_custom(Arc::new(FailingCollector)).unwrap();
    assert!(matches!(render_registry(&registry), Err(Error::InvalidArgument(_))));
}

#[test]
fn summary_and_custom_families() {
    struct Uptime;

    impl CustomCollector for Uptime {
        fn name(&self) -> &str {
            "uptime"
        }

        fn collect(&self) -> Result<Vec<MetricFamily>, Error> {
            Ok(vec![MetricFamily::new(
                "process_uptime_seconds",
                promkit::MetricKind::Gauge,
                "Uptime.",
                vec![Sample::new("", Vec::new(), 12.5)],
            )])
        }
    }

    let registry = Arc::new(Registry::new());
    let summary = promkit::Summary::builder("rpc_seconds", "RPC latency.")
        .with_registry(registry.clone())
        .build()
        .unwrap();
    summary.observe(0.5).unwrap();
    summary.observe(1.5).unwrap();
    registry.register_custom(Arc::new(Uptime)).unwrap();

    assert_eq!(
        render_registry(&registry).unwrap(),
        concat!(
            "# HELP rpc_seconds RPC latency.\n",
            "# TYPE rpc_seconds summary\n",
            "rpc_seconds_sum 2\n",
            "rpc_seconds_count 2\n",
            "# HELP process_uptime_seconds Uptime.\n",
            "# TYPE process_uptime_seconds gauge\n",
            "process_uptime_seconds 12.5\n",
        )
    );
}

#[test]
fn default_registry() {
    let counter = Counter::builder("default_total", "In the default registry.").build().unwrap();
    counter.inc().unwrap();

    let output = render_default().unwrap();
    assert!(output.contains("# TYPE default_total counter\ndefault_total 1\n"));
    assert_eq!(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8");
}
