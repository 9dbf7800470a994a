//! The MDB facade: owns the four subsystems and orders their locks.
//!
//! Lock ordering for any path that touches more than one subsystem:
//! family -> index (forward) -> rindex (reverse) -> storage. Readers
//! acquire only the lock(s) needed for the subsystem they consult.

use parking_lot::Mutex;
use tracing::debug;

use crate::config::MdbConfig;
use crate::error::{Error, Result};
use crate::expand::{expand, ExpandedSample, MetricInput};
use crate::family::{Family, FamilyRegistry, MetricType};
use crate::forward_index::{ForwardIndex, SeriesMetadata};
use crate::key::LabelSet;
use crate::matcher::MetricMatch;
use crate::reverse_index::ReverseIndex;
use crate::storage::{Point, SampleValue, Storage, Time};


#[cfg(test)]
use lock_trace::enter as trace_enter;

#[cfg(not(test))]
#[inline(always)]
fn trace_enter(_name: &'static str) {}

/// One resolved series returned by [`Mdb::get_series`].
#[derive(Debug, Clone)]
pub struct SeriesInfo {
    /// Dense series identifier.
    pub id: u32,
    /// Series name.
    pub name: String,
    /// Series labels.
    pub labels: LabelSet,
}

impl From<SeriesMetadata> for SeriesInfo {
    fn from(m: SeriesMetadata) -> Self {
        Self {
            id: m.id,
            name: m.name,
            labels: m.labels,
        }
    }
}

/// A series' samples as returned by a range query.
#[derive(Debug, Clone)]
pub struct SeriesSamples {
    /// Series name.
    pub name: String,
    /// Series labels.
    pub labels: LabelSet,
    /// Matching points.
    pub points: Vec<Point>,
}

/// The embedded metric database.
pub struct Mdb {
    family: Mutex<FamilyRegistry>,
    index: Mutex<ForwardIndex>,
    rindex: Mutex<ReverseIndex>,
    storage: Mutex<Storage>,
}

impl Mdb {
    /// Allocates and initializes all four subsystems.
    #[must_use]
    pub fn new(config: &MdbConfig) -> Self {
        Self {
            family: Mutex::new(FamilyRegistry::new(&config.index)),
            index: Mutex::new(ForwardIndex::new(&config.index)),
            rindex: Mutex::new(ReverseIndex::new(&config.index)),
            storage: Mutex::new(Storage::new(&config.storage)),
        }
    }

    /// Quiesces and releases all owned memory. All subsystems are
    /// destroyed by ordinary `Drop`; this method exists to give callers
    /// an explicit point to retire the instance.
    pub fn shutdown(self) {}

    /// Validates a label set against basic structural requirements.
    fn validate_labels(labels: &LabelSet) -> Result<()> {
        for pair in labels.as_slice() {
            if pair.name.is_empty() {
                return Err(Error::InvalidArgument("empty label name".to_string()));
            }
            if pair.value.is_empty() {
                return Err(Error::InvalidArgument("empty label value".to_string()));
            }
        }
        Ok(())
    }

    /// One-shot insert of a single, already-expanded series.
    ///
    /// Acquires `index`, then `rindex`, then `storage`, in that order,
    /// for the duration of the call: the forward-index entry is created
    /// (allocating storage if needed) and the reverse index is updated
    /// while the forward-index lock is still held, so any series visible
    /// in the reverse index is already present in the forward index. The
    /// storage append happens last, under its own lock.
    pub fn insert_metric(
        &self,
        name: &str,
        labels: &LabelSet,
        time: Time,
        interval: Time,
        value: SampleValue,
    ) -> Result<u32> {
        if name.is_empty() {
            return Err(Error::InvalidArgument("empty metric name".to_string()));
        }
        Self::validate_labels(labels)?;

        let mut index = self.index.lock();
        let _t_index = trace_enter("index");
        let mut rindex = self.rindex.lock();
        let _t_rindex = trace_enter("rindex");
        let mut storage = self.storage.lock();
        let _t_storage = trace_enter("storage");

        let metadata = index.getsert(name, labels, || storage.allocate(interval));
        rindex.insert(metadata.id, name, labels);
        storage.insert(metadata.storage, time, value);

        Ok(metadata.id)
    }

    /// Registers family metadata and expands every sample in `inputs`
    /// per the OpenMetrics rules, inserting each resulting series.
    ///
    /// The family lock is held only while registering metadata; it is
    /// released before any per-sample insert acquires `index`/`rindex`/
    /// `storage`, so the facade never holds more than the documented
    /// suffix of the lock order at once.
    pub fn insert_metric_family(
        &self,
        name: &str,
        help: Option<String>,
        unit: Option<String>,
        metric_type: MetricType,
        inputs: &[MetricInput],
    ) -> Result<Vec<u32>> {
        if name.is_empty() {
            return Err(Error::InvalidArgument("empty family name".to_string()));
        }

        {
            let mut family = self.family.lock();
            let _t_family = trace_enter("family");
            family.getsert(Family {
                name: name.to_string(),
                help,
                unit,
                metric_type,
            });
        }

        debug!(family = name, samples = inputs.len(), "insert_metric_family");

        let mut ids = Vec::new();
        for input in inputs {
            let expanded: Vec<ExpandedSample> = expand(name, metric_type, input);
            for sample in expanded {
                let id = self.insert_metric(
                    &sample.name,
                    &sample.labels,
                    sample.time,
                    sample.interval,
                    sample.value,
                )?;
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Declared, not implemented in this revision.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::Unsupported`].
    pub fn delete_metric(&self, _name: &str, _labels: &LabelSet) -> Result<()> {
        Err(Error::Unsupported("delete_metric".to_string()))
    }

    /// Declared, not implemented in this revision.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::Unsupported`].
    pub fn delete_match(&self, _match_expr: &MetricMatch) -> Result<()> {
        Err(Error::Unsupported("delete_match".to_string()))
    }

    /// Snapshot of all registered families.
    #[must_use]
    pub fn get_metric_families(&self) -> Vec<Family> {
        self.family.lock().list()
    }

    /// Snapshot of all distinct metric names.
    #[must_use]
    pub fn get_metrics(&self) -> Vec<String> {
        self.rindex.lock().get_metrics()
    }

    /// Snapshot of all `(name, labels)` pairs.
    #[must_use]
    pub fn get_series(&self) -> Vec<SeriesInfo> {
        self.index
            .lock()
            .list_series()
            .into_iter()
            .map(SeriesInfo::from)
            .collect()
    }

    /// Distinct label names used by any series of `metric`.
    #[must_use]
    pub fn get_metric_labels(&self, metric: &str) -> Vec<String> {
        self.rindex.lock().get_metric_labels(metric)
    }

    /// Distinct values observed for `label` under `metric`.
    #[must_use]
    pub fn get_metric_label_values(&self, metric: &str, label: &str) -> Vec<String> {
        self.rindex.lock().get_metric_label_values(metric, label)
    }

    /// Point query: for every series matched by `m`, the last sample with
    /// `time <= t`.
    pub fn fetch(&self, m: &MetricMatch, t: Time) -> Vec<(SeriesInfo, Option<Point>)> {
        let ids = {
            let rindex = self.rindex.lock();
            let _t_rindex = trace_enter("rindex");
            rindex.search(m)
        };
        let index = self.index.lock();
        let _t_index = trace_enter("index");
        let storage = self.storage.lock();
        let _t_storage = trace_enter("storage");

        ids.iter()
            .filter_map(|id| index.get_by_id(id))
            .map(|meta| {
                let point = storage.fetch(meta.storage, t);
                (SeriesInfo::from(meta.clone()), point)
            })
            .collect()
    }

    /// Range query: for every series matched by `m`, the downsampled
    /// points in `[start, end)`.
    pub fn fetch_range(
        &self,
        m: &MetricMatch,
        start: Time,
        end: Time,
        step: Time,
    ) -> Vec<SeriesSamples> {
        let ids = {
            let rindex = self.rindex.lock();
            let _t_rindex = trace_enter("rindex");
            rindex.search(m)
        };
        let index = self.index.lock();
        let _t_index = trace_enter("index");
        let storage = self.storage.lock();
        let _t_storage = trace_enter("storage");

        ids.iter()
            .filter_map(|id| index.get_by_id(id))
            .map(|meta| SeriesSamples {
                name: meta.name.clone(),
                labels: meta.labels.clone(),
                points: storage.fetch_range(meta.storage, start, end, step),
            })
            .collect()
    }
}
