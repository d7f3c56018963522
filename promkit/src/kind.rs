use std::fmt;

/// Metric kind.
///
/// Defines the kind, or type, of a metric, following the Prometheus data model:
/// - counters
/// - gauges
/// - histograms
/// - summaries
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum MetricKind {
    /// Counter type.
    Counter,
    /// Gauge type.
    Gauge,
    /// Histogram type.
    Histogram,
    /// Summary type.
    Summary,
}

impl MetricKind {
    /// Gets the name of this kind as used on `# TYPE` lines.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
            MetricKind::Summary => "summary",
        }
    }

    /// Label names this kind adds to its own samples, which users may not declare.
    pub(crate) const fn reserved_labels(&self) -> &'static [&'static str] {
        match self {
            MetricKind::Histogram => &["le"],
            MetricKind::Summary => &["quantile"],
            _ => &[],
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
