//! OpenMetrics-style expansion of a metric family submission into the
//! individual `(series key, value)` samples the forward/reverse indices
//! and storage actually see.

use crate::family::MetricType;
use crate::key::{Label, LabelSet};
use crate::storage::{SampleValue, Time};

/// One observation submitted for a family, prior to type-specific
/// expansion.
#[derive(Debug, Clone)]
pub struct MetricInput {
    /// Labels identifying this particular series within the family
    /// (excludes the family name itself).
    pub labels: LabelSet,
    /// Sample timestamp.
    pub time: Time,
    /// Nominal sampling interval for this series.
    pub interval: Time,
    /// The type-tagged value.
    pub value: MetricValue,
}

/// The type-tagged payload of one observation, shaped per metric type.
#[derive(Debug, Clone)]
pub enum MetricValue {
    /// `unknown`/`gauge`, stored as-is.
    GaugeFloat64(f64),
    /// `unknown`/`gauge`, numerically cast on store.
    GaugeInt64(i64),
    /// `counter`, numerically cast on store.
    CounterUint64(u64),
    /// `counter`, stored as-is.
    CounterFloat64(f64),
    /// `state-set`: each entry is `(state name, is active)`.
    StateSet(Vec<(String, bool)>),
    /// `info`: extra labels merged into the `_info` series.
    Info(Vec<Label>),
    /// `summary`: sample count, sum, and `(quantile, value)` pairs.
    Summary {
        /// Number of observations.
        count: u64,
        /// Sum of observed values.
        sum: f64,
        /// `(quantile, value)` pairs, e.g. `(0.5, 12.3)`.
        quantiles: Vec<(f64, f64)>,
    },
    /// `histogram`/`gauge-histogram`: observation count, sum, and
    /// cumulative `(upper bound, count)` buckets.
    Histogram {
        /// Number of observations (gauge semantics if `is_gauge`).
        count: u64,
        /// Sum of observed values (gauge semantics if `is_gauge`).
        sum: f64,
        /// Cumulative `(le, count)` buckets; `le = f64::INFINITY` for the
        /// final bucket is rendered as `+Inf`.
        buckets: Vec<(f64, u64)>,
        /// Distinguishes `histogram` (monotonic) from `gauge_histogram`.
        is_gauge: bool,
    },
}

/// One fully expanded sample, ready for forward/reverse index insertion
/// and storage.
#[derive(Debug, Clone)]
pub struct ExpandedSample {
    /// Final series name, including any type-specific suffix.
    pub name: String,
    /// Series-identifying labels, including type-specific extra labels,
    /// already merged and re-sorted by [`LabelSet::merged_with`].
    pub labels: LabelSet,
    /// Sample timestamp.
    pub time: Time,
    /// Nominal sampling interval.
    pub interval: Time,
    /// Coercible sample value.
    pub value: SampleValue,
}

/// Formats a bucket upper bound the way OpenMetrics expects:
/// `f64::INFINITY` renders as `+Inf`, everything else via its default
/// float rendering.
#[must_use]
pub fn format_bound(v: f64) -> String {
    if v.is_infinite() && v > 0.0 {
        "+Inf".to_string()
    } else {
        format!("{v}")
    }
}

/// Expands one [`MetricInput`] of a family of the given `metric_type`
/// and `family_name` into the series-level samples it produces.
#[must_use]
pub fn expand(family_name: &str, metric_type: MetricType, input: &MetricInput) -> Vec<ExpandedSample> {
    let base = &input.labels;
    match metric_type {
        MetricType::Unknown | MetricType::Gauge => {
            let value = match input.value {
                MetricValue::GaugeFloat64(v) => SampleValue::GaugeFloat64(v),
                MetricValue::GaugeInt64(v) => SampleValue::GaugeInt64(v),
                _ => return Vec::new(),
            };
            vec![ExpandedSample {
                name: family_name.to_string(),
                labels: base.clone(),
                time: input.time,
                interval: input.interval,
                value,
            }]
        }
        MetricType::Counter => {
            let value = match input.value {
                MetricValue::CounterUint64(v) => SampleValue::CounterUint64(v),
                MetricValue::CounterFloat64(v) => SampleValue::CounterFloat64(v),
                _ => return Vec::new(),
            };
            vec![ExpandedSample {
                name: format!("{family_name}_total"),
                labels: base.clone(),
                time: input.time,
                interval: input.interval,
                value,
            }]
        }
        MetricType::StateSet => {
            let MetricValue::StateSet(states) = &input.value else {
                return Vec::new();
            };
            states
                .iter()
                .map(|(state, active)| ExpandedSample {
                    name: family_name.to_string(),
                    labels: base.merged_with(&[Label::new(family_name, state.clone())]),
                    time: input.time,
                    interval: input.interval,
                    value: SampleValue::Bool(*active),
                })
                .collect()
        }
        MetricType::Info => {
            let MetricValue::Info(extra) = &input.value else {
                return Vec::new();
            };
            vec![ExpandedSample {
                name: format!("{family_name}_info"),
                labels: base.merged_with(extra),
                time: input.time,
                interval: input.interval,
                value: SampleValue::Info,
            }]
        }
        MetricType::Summary => {
            let MetricValue::Summary {
                count,
                sum,
                quantiles,
            } = &input.value
            else {
                return Vec::new();
            };
            let mut out = Vec::with_capacity(quantiles.len() + 2);
            for (q, v) in quantiles.iter().rev() {
                out.push(ExpandedSample {
                    name: family_name.to_string(),
                    labels: base.merged_with(&[Label::new("quantile", format_bound(*q))]),
                    time: input.time,
                    interval: input.interval,
                    value: SampleValue::GaugeFloat64(*v),
                });
            }
            out.push(ExpandedSample {
                name: format!("{family_name}_count"),
                labels: base.clone(),
                time: input.time,
                interval: input.interval,
                value: SampleValue::CounterUint64(*count),
            });
            out.push(ExpandedSample {
                name: format!("{family_name}_sum"),
                labels: base.clone(),
                time: input.time,
                interval: input.interval,
                value: SampleValue::CounterFloat64(*sum),
            });
            out
        }
        MetricType::Histogram | MetricType::GaugeHistogram => {
            let MetricValue::Histogram {
                count,
                sum,
                buckets,
                is_gauge,
            } = &input.value
            else {
                return Vec::new();
            };
            let mut out = Vec::with_capacity(buckets.len() + 2);
            for (le, bucket_count) in buckets.iter().rev() {
                out.push(ExpandedSample {
                    name: format!("{family_name}_bucket"),
                    labels: base.merged_with(&[Label::new("le", format_bound(*le))]),
                    time: input.time,
                    interval: input.interval,
                    value: SampleValue::CounterUint64(*bucket_count),
                });
            }
            let (count_suffix, sum_suffix) = if *is_gauge {
                ("_gcount", "_gsum")
            } else {
                ("_count", "_sum")
            };
            out.push(ExpandedSample {
                name: format!("{family_name}{count_suffix}"),
                labels: base.clone(),
                time: input.time,
                interval: input.interval,
                value: SampleValue::CounterUint64(*count),
            });
            out.push(ExpandedSample {
                name: format!("{family_name}{sum_suffix}"),
                labels: base.clone(),
                time: input.time,
                interval: input.interval,
                value: SampleValue::CounterFloat64(*sum),
            });
            out
        }
    }
}
