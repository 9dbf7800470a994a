//! Family registry (FR): schema-level metadata shared by a group of series.

use crate::config::IndexConfig;
use crate::htable::{fnv1a, HashTable};
use serde::{Deserialize, Serialize};

/// The kind of metric a family describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    /// No declared type.
    Unknown,
    /// A point-in-time value that can go up or down.
    Gauge,
    /// A monotonically non-decreasing accumulator.
    Counter,
    /// A set of mutually exclusive named states.
    StateSet,
    /// Informational, rarely-changing key/value metadata.
    Info,
    /// A summary of observations (count, sum, quantiles).
    Summary,
    /// A histogram of observations (count, sum, cumulative buckets).
    Histogram,
    /// A histogram over a value that can decrease (gauge semantics).
    GaugeHistogram,
}

/// A registered metric family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Family {
    /// Family name.
    pub name: String,
    /// Optional human-readable description.
    pub help: Option<String>,
    /// Optional unit string.
    pub unit: Option<String>,
    /// Declared metric type.
    pub metric_type: MetricType,
}

/// HT-backed registry keyed by family name.
pub struct FamilyRegistry {
    table: HashTable<Family>,
}

impl FamilyRegistry {
    /// Creates an empty registry sized per `config`.
    #[must_use]
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            table: HashTable::new(config.family_table_size),
        }
    }

    /// Registers `family` if no family of that name exists yet.
    ///
    /// Re-registration with an existing name is a silent no-op: help,
    /// unit, and type are **not** updated even if they differ from the
    /// stored record. This mirrors the reference daemon's behavior
    /// exactly (see DESIGN.md, Open Question 1) rather than treating a
    /// metadata mismatch as an error.
    pub fn getsert(&mut self, family: Family) {
        let hash = fnv1a(family.name.as_bytes());
        self.table.insert(hash, family, |a, b| a.name == b.name);
    }

    /// Looks up a family by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Family> {
        let hash = fnv1a(name.as_bytes());
        self.table.find(hash, |f| f.name == name)
    }

    /// Snapshot of all registered families.
    #[must_use]
    pub fn list(&self) -> Vec<Family> {
        self.table.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fam(name: &str, help: &str) -> Family {
        Family {
            name: name.to_string(),
            help: Some(help.to_string()),
            unit: None,
            metric_type: MetricType::Counter,
        }
    }

    #[test]
    fn reregistration_ignores_metadata_changes() {
        let mut fr = FamilyRegistry::new(&IndexConfig::default());
        fr.getsert(fam("http_requests", "first"));
        fr.getsert(fam("http_requests", "second"));
        assert_eq!(
            fr.get("http_requests").unwrap().help.as_deref(),
            Some("first")
        );
        assert_eq!(fr.list().len(), 1);
    }

    #[test]
    fn distinct_names_coexist() {
        let mut fr = FamilyRegistry::new(&IndexConfig::default());
        fr.getsert(fam("a", "a-help"));
        fr.getsert(fam("b", "b-help"));
        assert_eq!(fr.list().len(), 2);
    }

    #[test]
    fn family_list_serializes_to_json_for_external_tooling() {
        let mut fr = FamilyRegistry::new(&IndexConfig::default());
        fr.getsert(fam("http_requests", "total HTTP requests"));
        let json = serde_json::to_string(&fr.list()).unwrap();
        let round_tripped: Vec<Family> = serde_json::from_str(&json).unwrap();
        assert_eq!(round_tripped[0].name, "http_requests");
        assert_eq!(round_tripped[0].metric_type, MetricType::Counter);
    }
}
