//! weft-csv
//!
//! Columnar-text collaborators for the weft joiner: file-backed event and
//! sample sources, the joined-row sink, and the surrounding file utilities
//! (master-time reconstruction and output verification).
//!
//! All readers share the same layout handling: a configurable number of
//! leading garbage rows to skip, an optional header row whose names are
//! trimmed, lowercased, and optionally renamed, and fixed column positions
//! for the clock fields.
#![warn(missing_docs)]

/// Column layout shared by the CSV readers.
pub mod layout;
/// Master-time reconstruction for relative-offset captures.
pub mod reclock;
/// File-backed event and sample sources.
pub mod source;
/// The joined-row sink.
pub mod sink;
/// Joined-output verification.
pub mod verify;

pub use layout::{CsvLayout, TimeColumns};
pub use reclock::{reclock_csv, ReclockConfig, ReclockSummary};
pub use sink::{CsvJoinSink, DEFAULT_SENTINEL};
pub use source::{CsvEventSource, CsvSampleSource};
pub use verify::{verify_join, AnnotationParity, VerifyOptions, VerifyReport};
