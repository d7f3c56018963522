use crate::MetricKind;

/// A single value ready for exposition.
///
/// The full sample name is the family name followed by `suffix`: empty for counters and gauges,
/// `_bucket`, `_sum` or `_count` for histograms and summaries.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Suffix appended to the family name.
    pub suffix: &'static str,
    /// Labels of the sample, as `(name, value)` pairs in declaration order.
    ///
    /// Histogram buckets carry an additional, trailing `le` label.
    pub labels: Vec<(String, String)>,
    /// The value.
    pub value: f64,
}

impl Sample {
    /// Creates a new `Sample`.
    pub fn new(suffix: &'static str, labels: Vec<(String, String)>, value: f64) -> Self {
        Self { suffix, labels, value }
    }
}

/// Every sample of one metric name, together with its kind and description.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricFamily {
    /// Name of the metric, including any registry prefix once collected through a registry.
    pub name: String,
    /// Kind of the metric.
    pub kind: MetricKind,
    /// Description of the metric.
    pub description: String,
    /// Samples of the metric.
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    /// Creates a new `MetricFamily`.
    pub fn new(
        name: impl Into<String>,
        kind: MetricKind,
        description: impl Into<String>,
        samples: Vec<Sample>,
    ) -> Self {
        Self { name: name.into(), kind, description: description.into(), samples }
    }
}
