//! weft-core
//!
//! Core types, contracts, and utilities shared across the weft workspace.
//!
//! - `record`: the data model (timestamps, sparse/dense/joined records).
//! - `clock`: normalization of heterogeneous timestamp representations into
//!   one monotonic epoch-seconds domain, with optional grid quantization.
//! - `matching`: the nearest-timestamp matching engine and its cursor.
//! - `source`: the contracts implemented by event/sample sources and by the
//!   joined-row sink.
//! - `config` / `report`: run configuration and the informational summary.
//!
//! Everything in this crate is pure and synchronous. I/O lives behind the
//! `source` contracts; the chunked pipeline driver that wires them together
//! lives in the `weft` crate.
#![warn(missing_docs)]

/// Timestamp normalization and quantization.
pub mod clock;
/// Run configuration.
pub mod config;
/// Unified error type for the weft workspace.
pub mod error;
/// Cursor-based nearest-timestamp matching.
pub mod matching;
/// The record data model.
pub mod record;
/// Run summary reporting.
pub mod report;
/// Source and sink contracts.
pub mod source;

pub use clock::{ClockSpec, DEFAULT_WALL_CLOCK_FORMAT, TimeNormalizer};
pub use config::JoinConfig;
pub use error::WeftError;
pub use matching::{Cursor, MatchMode, MatchingEngine};
pub use record::{DenseRecord, JoinedRecord, SparseRecord, TimePoint};
pub use report::JoinSummary;
pub use source::{EventSource, JoinSink, RawClock, RawRecord, SampleSource};
