//! End-to-end scenario tests (E1-E5): counter expansion, ring-buffer
//! overflow, regex filtering, state-set explosion, histogram expansion.

use mdb_core::config::MdbConfig;
use mdb_core::expand::{MetricInput, MetricValue};
use mdb_core::family::MetricType;
use mdb_core::key::{Label, LabelSet};
use mdb_core::matcher::{MetricMatch, Predicate};
use mdb_core::mdb::Mdb;
use mdb_core::storage::SampleValue;

fn labels(pairs: &[(&str, &str)]) -> LabelSet {
    LabelSet::from_pairs(pairs.iter().map(|(n, v)| Label::new(*n, *v)))
}

#[test]
fn e1_http_requests_counter_expansion() {
    let db = Mdb::new(&MdbConfig::default());
    db.insert_metric_family(
        "http_requests",
        Some("total HTTP requests".to_string()),
        None,
        MetricType::Counter,
        &[
            MetricInput {
                labels: labels(&[("method", "get"), ("code", "200")]),
                time: 0,
                interval: 10,
                value: MetricValue::CounterUint64(5),
            },
            MetricInput {
                labels: labels(&[("method", "get"), ("code", "500")]),
                time: 0,
                interval: 10,
                value: MetricValue::CounterUint64(1),
            },
        ],
    )
    .unwrap();

    let series = db.get_series();
    assert_eq!(series.len(), 2);
    assert!(series.iter().all(|s| s.name == "http_requests_total"));

    let mut values = db.get_metric_label_values("http_requests_total", "code");
    values.sort();
    assert_eq!(values, vec!["200", "500"]);

    let families = db.get_metric_families();
    assert_eq!(families.len(), 1);
    assert_eq!(families[0].help.as_deref(), Some("total HTTP requests"));
}

#[test]
fn e2_temperature_gauge_ring_buffer_overflow() {
    let db = Mdb::new(&MdbConfig::default());
    for t in 1..=7u64 {
        db.insert_metric(
            "temperature",
            &labels(&[("sensor", "a")]),
            t,
            1,
            SampleValue::GaugeFloat64(t as f64),
        )
        .unwrap();
    }

    let m = MetricMatch {
        name: vec![Predicate::eql("__name__", "temperature")],
        labels: vec![],
    };
    let ranges = db.fetch_range(&m, 0, 100, 0);
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].points.len(), 6);
    assert_eq!(ranges[0].points.first().unwrap().time, 2);
    assert_eq!(ranges[0].points.last().unwrap().time, 7);
}

#[test]
fn e3_regex_match_filters_by_label() {
    let db = Mdb::new(&MdbConfig::default());
    db.insert_metric_family(
        "http_requests",
        None,
        None,
        MetricType::Counter,
        &[
            MetricInput {
                labels: labels(&[("code", "200")]),
                time: 0,
                interval: 10,
                value: MetricValue::CounterUint64(1),
            },
            MetricInput {
                labels: labels(&[("code", "500")]),
                time: 0,
                interval: 10,
                value: MetricValue::CounterUint64(1),
            },
            MetricInput {
                labels: labels(&[("code", "503")]),
                time: 0,
                interval: 10,
                value: MetricValue::CounterUint64(1),
            },
        ],
    )
    .unwrap();

    let m = MetricMatch {
        name: vec![Predicate::eql("__name__", "http_requests_total")],
        labels: vec![Predicate::eql_regex("code", "^5..$").unwrap()],
    };
    let matched = db.fetch_range(&m, 0, 100, 0);
    assert_eq!(matched.len(), 2);
    let mut codes: Vec<&str> = matched
        .iter()
        .map(|s| s.labels.get("code").unwrap())
        .collect();
    codes.sort_unstable();
    assert_eq!(codes, vec!["500", "503"]);
}

#[test]
fn e4_process_state_set_explodes_to_booleans() {
    let db = Mdb::new(&MdbConfig::default());
    db.insert_metric_family(
        "process_state",
        None,
        None,
        MetricType::StateSet,
        &[MetricInput {
            labels: LabelSet::default(),
            time: 0,
            interval: 10,
            value: MetricValue::StateSet(vec![
                ("running".to_string(), true),
                ("zombie".to_string(), false),
            ]),
        }],
    )
    .unwrap();

    let series = db.get_series();
    assert_eq!(series.len(), 2);
    for s in &series {
        assert_eq!(s.name, "process_state");
        assert!(s.labels.get("process_state").is_some());
    }

    let m = MetricMatch {
        name: vec![Predicate::eql("__name__", "process_state")],
        labels: vec![Predicate::eql("process_state", "running")],
    };
    let results = db.fetch(&m, 0);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].1.unwrap().value, 1.0);
}

#[test]
fn e5_rtt_histogram_expands_buckets_count_sum() {
    let db = Mdb::new(&MdbConfig::default());
    db.insert_metric_family(
        "rtt",
        None,
        None,
        MetricType::Histogram,
        &[MetricInput {
            labels: LabelSet::default(),
            time: 0,
            interval: 10,
            value: MetricValue::Histogram {
                count: 10,
                sum: 1.234,
                buckets: vec![(0.1, 3), (1.0, 7), (f64::INFINITY, 10)],
                is_gauge: false,
            },
        }],
    )
    .unwrap();

    let names: std::collections::BTreeSet<String> =
        db.get_series().into_iter().map(|s| s.name).collect();
    assert!(names.contains("rtt_bucket"));
    assert!(names.contains("rtt_count"));
    assert!(names.contains("rtt_sum"));

    let m = MetricMatch {
        name: vec![Predicate::eql("__name__", "rtt_bucket")],
        labels: vec![Predicate::eql("le", "+Inf")],
    };
    let results = db.fetch(&m, 0);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].1.unwrap().value, 10.0);
}
