use std::fmt::Write;

/// Type tag historically written for gauge-class series. The misspelling is
/// part of the wire format existing dashboards were built against.
pub const LEGACY_GAUGE_TAG: &str = "gauage";
pub const STANDARD_GAUGE_TAG: &str = "gauge";
pub const SUMMARY_TAG: &str = "summary";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Gauge,
    Summary,
}

/// How gauge-class series spell their `# TYPE` tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GaugeSpelling {
    #[default]
    Legacy,
    Standard,
}

impl MetricType {
    pub fn as_exposition_type(&self, spelling: GaugeSpelling) -> &'static str {
        match (self, spelling) {
            (Self::Gauge, GaugeSpelling::Legacy) => LEGACY_GAUGE_TAG,
            (Self::Gauge, GaugeSpelling::Standard) => STANDARD_GAUGE_TAG,
            (Self::Summary, _) => SUMMARY_TAG,
        }
    }
}

/// One exposition series: the sanitized name, its declared type and the
/// `# HELP`/`# TYPE` block rendered once at construction.
#[derive(Debug)]
pub struct MetricKey {
    key: String,
    metric_type: MetricType,
    type_tag: &'static str,
    header: String,
}

impl MetricKey {
    pub fn new(name: &str, metric_type: MetricType, spelling: GaugeSpelling) -> Self {
        let key = sanitize(name);
        let type_tag = metric_type.as_exposition_type(spelling);
        let header = format!("# HELP {key} metric\n# TYPE {key} {type_tag}\n");

        Self {
            key,
            metric_type,
            type_tag,
            header,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    pub fn type_tag(&self) -> &'static str {
        self.type_tag
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    /// Appends `<key>{mtype="<type>",aggr="<tag>"} <value>\n`.
    pub fn write_line(&self, out: &mut String, tag: &str, value: impl ExpositionValue) {
        out.push_str(&self.key);
        out.push_str("{mtype=\"");
        out.push_str(self.type_tag);
        out.push_str("\",aggr=\"");
        out.push_str(tag);
        out.push_str("\"} ");
        value.write_value(out);
        out.push('\n');
    }

    pub fn line(&self, tag: &str, value: impl ExpositionValue) -> String {
        let mut out = String::new();
        self.write_line(&mut out, tag, value);
        out
    }
}

/// Replaces every `/` with `_`. Nothing else is validated.
pub fn sanitize(name: &str) -> String {
    name.replace('/', "_")
}

/// Sample values accepted by [`MetricKey::write_line`].
pub trait ExpositionValue {
    fn write_value(&self, out: &mut String);
}

macro_rules! integer_value {
    ($($ty:ty),*) => {
        $(
            impl ExpositionValue for $ty {
                fn write_value(&self, out: &mut String) {
                    let _ = write!(out, "{self}");
                }
            }
        )*
    };
}

integer_value!(i64, u64, usize);

impl ExpositionValue for f64 {
    fn write_value(&self, out: &mut String) {
        if self.is_nan() {
            out.push_str("NaN");
        } else if self.is_infinite() {
            out.push_str(if *self > 0.0 { "+Inf" } else { "-Inf" });
        } else {
            let _ = write!(out, "{self}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GaugeSpelling, MetricKey, MetricType, sanitize};

    #[test]
    fn sanitize_replaces_every_slash_in_place() {
        for name in ["db/reads", "/a//b/", "p2p/dial/fail", "plain", ""] {
            let key = sanitize(name);
            assert!(!key.contains('/'));
            assert_eq!(key.len(), name.len());
            for (raw, sanitized) in name.chars().zip(key.chars()) {
                if raw == '/' {
                    assert_eq!(sanitized, '_');
                } else {
                    assert_eq!(sanitized, raw);
                }
            }
        }
    }

    #[test]
    fn header_block_uses_fixed_help_text() {
        let key = MetricKey::new("db/reads", MetricType::Gauge, GaugeSpelling::Legacy);

        assert_eq!(
            key.header(),
            "# HELP db_reads metric\n# TYPE db_reads gauage\n"
        );
    }

    #[test]
    fn standard_spelling_fixes_gauge_tag_only() {
        let gauge = MetricKey::new("x", MetricType::Gauge, GaugeSpelling::Standard);
        let summary = MetricKey::new("y", MetricType::Summary, GaugeSpelling::Standard);

        assert_eq!(gauge.header(), "# HELP x metric\n# TYPE x gauge\n");
        assert_eq!(summary.type_tag(), "summary");
    }

    #[test]
    fn line_formats_integers_and_floats() {
        let key = MetricKey::new("rpc/duration", MetricType::Summary, GaugeSpelling::Legacy);

        assert_eq!(
            key.line("count", 42_i64),
            "rpc_duration{mtype=\"summary\",aggr=\"count\"} 42\n"
        );
        assert_eq!(
            key.line("mean", 3.8_f64),
            "rpc_duration{mtype=\"summary\",aggr=\"mean\"} 3.8\n"
        );
        assert_eq!(
            key.line("max", 2.0_f64),
            "rpc_duration{mtype=\"summary\",aggr=\"max\"} 2\n"
        );
    }

    #[test]
    fn non_finite_floats_use_exposition_spelling() {
        let key = MetricKey::new("g", MetricType::Gauge, GaugeSpelling::Legacy);

        assert!(key.line("value", f64::INFINITY).ends_with(" +Inf\n"));
        assert!(key.line("value", f64::NEG_INFINITY).ends_with(" -Inf\n"));
        assert!(key.line("value", f64::NAN).ends_with(" NaN\n"));
    }
}
