//! Renders [`promkit`] registries in the Prometheus text exposition format.
//!
//! ```
//! use std::sync::Arc;
//!
//! use promkit::{Counter, Registry};
//!
//! # fn main() -> Result<(), promkit::Error> {
//! let registry = Arc::new(Registry::new());
//! let counter = Counter::builder("jobs_total", "Jobs run.")
//!     .with_registry(registry.clone())
//!     .build()?;
//! counter.inc_by(3.0)?;
//!
//! let output = promkit_exposition::render_registry(&registry)?;
//! assert_eq!(output, "# HELP jobs_total Jobs run.\n# TYPE jobs_total counter\njobs_total 3\n");
//! # Ok(())
//! # }
//! ```
#![deny(missing_docs)]

use promkit::{default_registry, Error, MetricFamily, Registry};
use tracing::debug;

pub mod formatting;
use self::formatting::{write_help_line, write_metric_line, write_type_line};

/// Content type of the rendered output, for the `Content-Type` header of a scrape response.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Renders `families`, in order.
///
/// Every family gets its `# HELP` and `# TYPE` lines followed by one line per sample, even when it
/// has no samples at all.
pub fn render(families: &[MetricFamily]) -> String {
    let mut output = String::new();
    for family in families {
        write_help_line(&mut output, &family.name, &family.description);
        write_type_line(&mut output, &family.name, family.kind);
        for sample in &family.samples {
            let name = &family.name;
            write_metric_line(&mut output, name, sample.suffix, &sample.labels, sample.value);
        }
    }
    output
}

/// Collects `registry` and renders the result.
///
/// # Errors
///
/// Fails if collecting the registry fails, in which case nothing is rendered.
pub fn render_registry(registry: &Registry) -> Result<String, Error> {
    let families = registry.collect()?;
    debug!(families = families.len(), "rendering metric families");
    Ok(render(&families))
}

/// Collects the [default registry](promkit::default_registry) and renders the result.
///
/// # Errors
///
/// See [`render_registry`].
pub fn render_default() -> Result<String, Error> {
    render_registry(&default_registry())
}
