//! Per-series sample storage: a fixed-capacity ring buffer of `(time,
//! value)` points plus typed value coercion.
//!
//! The memory backend is the only one implemented; a disk backend is
//! represented only as an enum variant (see [`StorageKind`]).

use crate::config::StorageConfig;

/// A fixed-point timestamp, 1/2^30 second since the Unix epoch, matching
/// the resolution used throughout the collector daemon.
pub type Time = u64;

/// Nominal storage backend. Only `Memory` is implemented; `Disk` is a
/// placeholder for a future revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// In-memory ring buffer (implemented).
    Memory,
    /// Persistent backend (not implemented).
    Disk,
}

/// The tagged value a caller submits for a single sample, prior to the
/// coercion rules applied on write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    /// Gauge stored as a 64-bit float: used as-is.
    GaugeFloat64(f64),
    /// Gauge stored as a 64-bit integer: cast to `f64`.
    GaugeInt64(i64),
    /// Counter stored as a 64-bit unsigned integer: cast to `f64`.
    CounterUint64(u64),
    /// Counter stored as a 64-bit float: used as-is.
    CounterFloat64(f64),
    /// Boolean: coerces to `1.0` / `0.0`.
    Bool(bool),
    /// Info sample: always coerces to `1.0`.
    Info,
}

impl SampleValue {
    /// Coerces to the `f64` representation stored in the ring buffer.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn coerce(self) -> f64 {
        match self {
            Self::GaugeFloat64(v) | Self::CounterFloat64(v) => v,
            Self::GaugeInt64(v) => v as f64,
            Self::CounterUint64(v) => v as f64,
            Self::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Info => 1.0,
        }
    }
}

/// A single stored `(time, value)` point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Sample timestamp.
    pub time: Time,
    /// Stored sample value, already coerced to `f64`.
    pub value: f64,
}

/// Downsampling policy applied by [`StorageEntry::fetch_range`]. Only
/// "last sample in each bucket" is specified; other policies are out of
/// scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownsamplePolicy {
    /// Keep the last sample observed in each `step`-sized bucket.
    LastInBucket,
}

/// A series' circular sample buffer.
#[derive(Debug, Clone)]
pub struct StorageEntry {
    points: Vec<Point>,
    head: usize,
    tail: usize,
    count: usize,
    capacity: usize,
    /// Declared nominal sampling interval.
    pub interval: Time,
    /// Time of the most recent successful write.
    pub last_update: Time,
}

impl StorageEntry {
    /// Allocates a new entry with `capacity` slots, all initialized to
    /// `(time=0, value=NaN)`.
    #[must_use]
    pub fn new(capacity: usize, interval: Time) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: vec![
                Point {
                    time: 0,
                    value: f64::NAN,
                };
                capacity
            ],
            head: 0,
            tail: 0,
            count: 0,
            capacity,
            interval,
            last_update: 0,
        }
    }

    /// Number of valid samples currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// True if no sample has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Appends a sample, coercing `value` per its tag, overwriting the
    /// oldest stored sample once the buffer is full.
    pub fn insert(&mut self, time: Time, value: SampleValue) {
        let coerced = value.coerce();
        self.points[self.tail] = Point {
            time,
            value: coerced,
        };
        self.last_update = time;
        self.tail = (self.tail + 1) % self.capacity;
        if self.count < self.capacity {
            self.count += 1;
        } else {
            self.head = (self.head + 1) % self.capacity;
        }
    }

    /// Returns the last sample with `time <= t`, or `None` if no such
    /// sample is stored.
    #[must_use]
    pub fn fetch(&self, t: Time) -> Option<Point> {
        let mut best: Option<Point> = None;
        for i in 0..self.count {
            let idx = (self.head + i) % self.capacity;
            let p = self.points[idx];
            if p.time <= t {
                best = Some(p);
            } else {
                break;
            }
        }
        best
    }

    /// Returns samples in `[start, end)`, downsampled to `step` by
    /// `policy`. `step == 0` disables downsampling (every matching raw
    /// sample is returned).
    #[must_use]
    pub fn fetch_range(
        &self,
        start: Time,
        end: Time,
        step: Time,
        policy: DownsamplePolicy,
    ) -> Vec<Point> {
        if self.count == 0 {
            return Vec::new();
        }
        let oldest = self.points[self.head].time;
        if end <= oldest || start > self.last_update {
            return Vec::new();
        }

        let mut raw = Vec::with_capacity(self.count);
        for i in 0..self.count {
            let idx = (self.head + i) % self.capacity;
            let p = self.points[idx];
            if p.time >= start && p.time < end {
                raw.push(p);
            }
        }

        if step == 0 || raw.is_empty() {
            return raw;
        }

        let DownsamplePolicy::LastInBucket = policy;
        let mut out: Vec<Point> = Vec::new();
        let mut bucket_start = start;
        let mut bucket_last: Option<Point> = None;
        for p in raw {
            while p.time >= bucket_start + step {
                if let Some(b) = bucket_last.take() {
                    out.push(b);
                }
                bucket_start += step;
            }
            bucket_last = Some(p);
        }
        if let Some(b) = bucket_last {
            out.push(b);
        }
        out
    }
}

/// Owns all storage entries and hands out opaque handles.
///
/// A `StorageHandle` is a stable, dense index into the backing `Vec`;
/// forward-index metadata stores the handle rather than any pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StorageHandle(usize);

/// The storage subsystem: owns every series' ring buffer.
#[derive(Debug)]
pub struct Storage {
    entries: Vec<StorageEntry>,
    capacity: usize,
}

impl Storage {
    /// Creates an empty storage subsystem using `config`'s ring capacity.
    #[must_use]
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            entries: Vec::new(),
            capacity: config.ring_capacity,
        }
    }

    /// Allocates a new ring buffer for a series with the given nominal
    /// interval, returning its handle.
    pub fn allocate(&mut self, interval: Time) -> StorageHandle {
        let idx = self.entries.len();
        self.entries.push(StorageEntry::new(self.capacity, interval));
        StorageHandle(idx)
    }

    /// Appends a sample to the series behind `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` was not obtained from this `Storage`'s
    /// `allocate` — this would indicate an internal invariant violation
    /// (a handle from a different subsystem instance) rather than a
    /// normal caller error.
    pub fn insert(&mut self, handle: StorageHandle, time: Time, value: SampleValue) {
        self.entries[handle.0].insert(time, value);
    }

    /// Point query: last sample with `time <= t`.
    #[must_use]
    pub fn fetch(&self, handle: StorageHandle, t: Time) -> Option<Point> {
        self.entries.get(handle.0).and_then(|e| e.fetch(t))
    }

    /// Range query with downsampling.
    #[must_use]
    pub fn fetch_range(
        &self,
        handle: StorageHandle,
        start: Time,
        end: Time,
        step: Time,
    ) -> Vec<Point> {
        self.entries
            .get(handle.0)
            .map(|e| e.fetch_range(start, end, step, DownsamplePolicy::LastInBucket))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_buffer_overflow_drops_oldest() {
        let mut e = StorageEntry::new(6, 10);
        for t in 1..=7u64 {
            e.insert(t, SampleValue::GaugeFloat64(t as f64));
        }
        assert_eq!(e.len(), 6);
        let range = e.fetch_range(0, 100, 0, DownsamplePolicy::LastInBucket);
        let times: Vec<Time> = range.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn value_coercion_rules() {
        assert_eq!(SampleValue::GaugeFloat64(1.5).coerce(), 1.5);
        assert_eq!(SampleValue::GaugeInt64(-3).coerce(), -3.0);
        assert_eq!(SampleValue::CounterUint64(7).coerce(), 7.0);
        assert_eq!(SampleValue::Bool(true).coerce(), 1.0);
        assert_eq!(SampleValue::Bool(false).coerce(), 0.0);
        assert_eq!(SampleValue::Info.coerce(), 1.0);
    }

    #[test]
    fn fetch_point_returns_last_at_or_before() {
        let mut e = StorageEntry::new(6, 10);
        for t in [10, 20, 30] {
            e.insert(t, SampleValue::GaugeFloat64(t as f64));
        }
        assert_eq!(e.fetch(25).unwrap().time, 20);
        assert_eq!(e.fetch(30).unwrap().time, 30);
        assert!(e.fetch(5).is_none());
    }

    #[test]
    fn fetch_range_empty_outside_data() {
        let mut e = StorageEntry::new(6, 10);
        for t in [100, 110, 120] {
            e.insert(t, SampleValue::GaugeFloat64(1.0));
        }
        assert!(e
            .fetch_range(0, 50, 0, DownsamplePolicy::LastInBucket)
            .is_empty());
        assert!(e
            .fetch_range(200, 300, 0, DownsamplePolicy::LastInBucket)
            .is_empty());
    }

    #[test]
    fn fetch_range_downsamples_last_in_bucket() {
        let mut e = StorageEntry::new(20, 1);
        for t in 0..10u64 {
            e.insert(t, SampleValue::GaugeFloat64(t as f64));
        }
        let out = e.fetch_range(0, 10, 3, DownsamplePolicy::LastInBucket);
        let times: Vec<Time> = out.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![2, 5, 8, 9]);
    }
}
