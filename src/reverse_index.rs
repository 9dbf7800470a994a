//! Reverse index (RI): a three-level tree (name -> label -> value) used to
//! answer label-predicate queries via set algebra over [`IdSet`]s.

use crate::config::IndexConfig;
use crate::htable::{fnv1a, HashTable};
use crate::idset::IdSet;
use crate::key::LabelSet;
use crate::matcher::{MetricMatch, Operator, Predicate};

struct ValueNode {
    value: String,
    ids: IdSet,
}

struct LabelNode {
    name: String,
    values: HashTable<ValueNode>,
    ids: IdSet,
}

struct NameNode {
    name: String,
    labels: HashTable<LabelNode>,
    ids: IdSet,
}

/// The reverse index.
pub struct ReverseIndex {
    names: HashTable<NameNode>,
    label_table_size: usize,
    value_table_size: usize,
    query_temp_capacity: usize,
}

impl ReverseIndex {
    /// Creates an empty reverse index sized per `config`.
    #[must_use]
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            names: HashTable::new(config.name_table_size),
            label_table_size: config.label_table_size,
            value_table_size: config.value_table_size,
            query_temp_capacity: config.query_temp_initial_capacity,
        }
    }

    /// Registers `id` under `name` and every label in `labels`.
    pub fn insert(&mut self, id: u32, name: &str, labels: &LabelSet) {
        let name_hash = fnv1a(name.as_bytes());
        if self.names.find(name_hash, |n| n.name == name).is_none() {
            self.names.insert(
                name_hash,
                NameNode {
                    name: name.to_string(),
                    labels: HashTable::new(self.label_table_size),
                    ids: IdSet::new(),
                },
                |a, b| a.name == b.name,
            );
        }
        let name_node = self
            .names
            .find_mut(name_hash, |n| n.name == name)
            .expect("just inserted");
        name_node.ids.insert(id);

        for pair in labels.as_slice() {
            let lhash = fnv1a(pair.name.as_bytes());
            if name_node
                .labels
                .find(lhash, |l| l.name == pair.name)
                .is_none()
            {
                name_node.labels.insert(
                    lhash,
                    LabelNode {
                        name: pair.name.clone(),
                        values: HashTable::new(self.value_table_size),
                        ids: IdSet::new(),
                    },
                    |a, b| a.name == b.name,
                );
            }
            let label_node = name_node
                .labels
                .find_mut(lhash, |l| l.name == pair.name)
                .expect("just inserted");
            label_node.ids.insert(id);

            let vhash = fnv1a(pair.value.as_bytes());
            if label_node
                .values
                .find(vhash, |v| v.value == pair.value)
                .is_none()
            {
                label_node.values.insert(
                    vhash,
                    ValueNode {
                        value: pair.value.clone(),
                        ids: IdSet::new(),
                    },
                    |a, b| a.value == b.value,
                );
            }
            let value_node = label_node
                .values
                .find_mut(vhash, |v| v.value == pair.value)
                .expect("just inserted");
            value_node.ids.insert(id);
        }
    }

    /// Snapshot of every distinct metric name.
    #[must_use]
    pub fn get_metrics(&self) -> Vec<String> {
        self.names.values().map(|n| n.name.clone()).collect()
    }

    /// Distinct label names used by any series of `metric`.
    #[must_use]
    pub fn get_metric_labels(&self, metric: &str) -> Vec<String> {
        let hash = fnv1a(metric.as_bytes());
        self.names
            .find(hash, |n| n.name == metric)
            .map(|n| n.labels.values().map(|l| l.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Distinct values observed for `label` under `metric`.
    #[must_use]
    pub fn get_metric_label_values(&self, metric: &str, label: &str) -> Vec<String> {
        let hash = fnv1a(metric.as_bytes());
        self.names
            .find(hash, |n| n.name == metric)
            .and_then(|n| {
                let lhash = fnv1a(label.as_bytes());
                n.labels.find(lhash, |l| l.name == label)
            })
            .map(|l| l.values.values().map(|v| v.value.clone()).collect())
            .unwrap_or_default()
    }

    /// Evaluates `m` against the index, returning the matching ids.
    #[must_use]
    pub fn search(&self, m: &MetricMatch) -> IdSet {
        if let Some(name) = m.is_name_eql_fast_path() {
            let hash = fnv1a(name.as_bytes());
            return self
                .names
                .find(hash, |n| n.name == name)
                .map(|n| n.ids.clone())
                .unwrap_or_default();
        }

        let candidates = self.resolve_name_group(&m.name);
        if candidates.is_empty() {
            return IdSet::new();
        }

        let mut result = candidates.iter().fold(
            IdSet::with_capacity(self.query_temp_capacity),
            |acc, n| IdSet::union(&acc, &n.ids),
        );

        for predicate in &m.labels {
            if result.is_empty() {
                break;
            }
            let p = self.evaluate_label_predicate(&candidates, predicate);
            result = IdSet::intersect(&result, &p);
        }

        result
    }

    /// Resolves the name-predicate group to the list of `NameNode`s that
    /// satisfy every predicate in it (AND semantics). An empty group
    /// matches every name.
    fn resolve_name_group(&self, name_predicates: &[Predicate]) -> Vec<&NameNode> {
        let mut candidates: Vec<&NameNode> = self.names.values().collect();
        for predicate in name_predicates {
            candidates.retain(|n| Self::name_predicate_matches(n, predicate));
        }
        candidates
    }

    fn name_predicate_matches(node: &NameNode, predicate: &Predicate) -> bool {
        match &predicate.op {
            Operator::Eql(v) => &node.name == v,
            Operator::Neq(v) => &node.name != v,
            Operator::EqlRegex(re) => re.is_match(&node.name),
            Operator::NeqRegex(re) => !re.is_match(&node.name),
            Operator::Exists => true,
            Operator::Nexists => false,
        }
    }

    /// Evaluates a single label predicate against a set of candidate
    /// name nodes, unioning the per-name contributions.
    fn evaluate_label_predicate(&self, candidates: &[&NameNode], predicate: &Predicate) -> IdSet {
        candidates.iter().fold(IdSet::new(), |acc, name_node| {
            let lhash = fnv1a(predicate.label.as_bytes());
            let label_node = name_node.labels.find(lhash, |l| l.name == predicate.label);

            let contribution = match (&predicate.op, label_node) {
                (Operator::Eql(v), Some(ln)) => {
                    let vhash = fnv1a(v.as_bytes());
                    ln.values
                        .find(vhash, |vn| &vn.value == v)
                        .map(|vn| vn.ids.clone())
                        .unwrap_or_default()
                }
                (Operator::Eql(_), None) => IdSet::new(),
                (Operator::Neq(v), Some(ln)) => {
                    let vhash = fnv1a(v.as_bytes());
                    let excluded = ln
                        .values
                        .find(vhash, |vn| &vn.value == v)
                        .map(|vn| vn.ids.clone())
                        .unwrap_or_default();
                    IdSet::difference(&ln.ids, &excluded)
                }
                (Operator::Neq(_), None) => IdSet::new(),
                (Operator::EqlRegex(re), Some(ln)) => ln
                    .values
                    .values()
                    .filter(|vn| re.is_match(&vn.value))
                    .fold(IdSet::new(), |acc, vn| IdSet::union(&acc, &vn.ids)),
                (Operator::EqlRegex(_), None) => IdSet::new(),
                (Operator::NeqRegex(re), Some(ln)) => {
                    let matching = ln
                        .values
                        .values()
                        .filter(|vn| re.is_match(&vn.value))
                        .fold(IdSet::new(), |acc, vn| IdSet::union(&acc, &vn.ids));
                    IdSet::difference(&ln.ids, &matching)
                }
                (Operator::NeqRegex(_), None) => IdSet::new(),
                (Operator::Exists, Some(ln)) => ln.ids.clone(),
                (Operator::Exists, None) => IdSet::new(),
                (Operator::Nexists, Some(ln)) => IdSet::difference(&name_node.ids, &ln.ids),
                (Operator::Nexists, None) => name_node.ids.clone(),
            };
            IdSet::union(&acc, &contribution)
        })
    }
}
