//! Helpers for rendering metrics in the Prometheus exposition format.

use promkit::MetricKind;

/// Writes a help (description) line in the Prometheus [exposition format].
///
/// [exposition format]: https://github.com/prometheus/docs/blob/main/content/docs/instrumenting/exposition_formats.md#text-format-details
pub fn write_help_line(buffer: &mut String, name: &str, desc: &str) {
    buffer.push_str("# HELP ");
    buffer.push_str(name);
    buffer.push(' ');
    buffer.push_str(&escape_description(desc));
    buffer.push('\n');
}

/// Writes a metric type line in the Prometheus [exposition format].
///
/// [exposition format]: https://github.com/prometheus/docs/blob/main/content/docs/instrumenting/exposition_formats.md#text-format-details
pub fn write_type_line(buffer: &mut String, name: &str, kind: MetricKind) {
    buffer.push_str("# TYPE ");
    buffer.push_str(name);
    buffer.push(' ');
    buffer.push_str(kind.as_str());
    buffer.push('\n');
}

/// Writes a sample in the Prometheus [exposition format].
///
/// `suffix` is appended to `name` as-is, which is how histogram and summary samples get their
/// `_bucket`, `_sum` and `_count` names. The label set is omitted entirely when `labels` is empty.
///
/// [exposition format]: https://github.com/prometheus/docs/blob/main/content/docs/instrumenting/exposition_formats.md#text-format-details
pub fn write_metric_line(
    buffer: &mut String,
    name: &str,
    suffix: &str,
    labels: &[(String, String)],
    value: f64,
) {
    buffer.push_str(name);
    buffer.push_str(suffix);

    if !labels.is_empty() {
        buffer.push('{');

        let mut first = true;
        for (key, value) in labels {
            if first {
                first = false;
            } else {
                buffer.push(',');
            }
            buffer.push_str(key);
            buffer.push_str("=\"");
            buffer.push_str(&escape_label_value(value));
            buffer.push('"');
        }

        buffer.push('}');
    }

    buffer.push(' ');
    write_value(buffer, value);
    buffer.push('\n');
}

fn write_value(buffer: &mut String, value: f64) {
    if value.is_nan() {
        buffer.push_str("NaN");
    } else if value == f64::INFINITY {
        buffer.push_str("+Inf");
    } else if value == f64::NEG_INFINITY {
        buffer.push_str("-Inf");
    } else {
        buffer.push_str(&value.to_string());
    }
}

/// Escapes a label value for the Prometheus [exposition format].
///
/// Backslashes, double quotes and line feeds are escaped; everything else is kept as-is.
///
/// [exposition format]: https://github.com/prometheus/docs/blob/main/content/docs/instrumenting/exposition_formats.md#text-format-details
pub fn escape_label_value(value: &str) -> String {
    escape(value, true)
}

/// Escapes a metric description for the Prometheus [exposition format].
///
/// Backslashes and line feeds are escaped; double quotes are kept as-is.
///
/// [exposition format]: https://github.com/prometheus/docs/blob/main/content/docs/instrumenting/exposition_formats.md#text-format-details
pub fn escape_description(value: &str) -> String {
    escape(value, false)
}

fn escape(value: &str, escape_quotes: bool) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '"' if escape_quotes => escaped.push_str("\\\""),
            c => escaped.push(c),
        }
    }
    escaped
}
