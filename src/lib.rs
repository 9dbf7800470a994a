//! # MDB
//!
//! An embedded, concurrent, in-memory time-series metric database.
//!
//! MDB is the storage core of a metric-collection daemon: collector
//! plugins call [`Mdb::insert_metric_family`] with OpenMetrics-shaped
//! samples; the control plane queries back through [`Mdb::fetch`] and
//! [`Mdb::fetch_range`] using label-predicate [`matcher::MetricMatch`]
//! expressions. Four independently locked subsystems back the facade:
//! a family registry, a forward index, a reverse (label) index, and
//! per-series ring-buffer storage.
//!
//! ## Quick start
//!
//! ```rust
//! use mdb_core::config::MdbConfig;
//! use mdb_core::expand::{MetricInput, MetricValue};
//! use mdb_core::family::MetricType;
//! use mdb_core::key::{Label, LabelSet};
//! use mdb_core::mdb::Mdb;
//!
//! let db = Mdb::new(&MdbConfig::default());
//! db.insert_metric_family(
//!     "http_requests",
//!     None,
//!     None,
//!     MetricType::Counter,
//!     &[MetricInput {
//!         labels: LabelSet::from_pairs([Label::new("method", "get")]),
//!         time: 0,
//!         interval: 10,
//!         value: MetricValue::CounterUint64(1),
//!     }],
//! ).unwrap();
//! assert_eq!(db.get_series().len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod expand;
pub mod family;
pub mod forward_index;
pub mod htable;
pub mod idset;
pub mod key;
pub mod matcher;
pub mod mdb;
pub mod reverse_index;
pub mod storage;

pub use error::{Error, Result};
pub use mdb::Mdb;
